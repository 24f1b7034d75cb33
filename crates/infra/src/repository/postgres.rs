//! Postgres-backed document repository.
//!
//! All collections share one `documents` table keyed by `(collection, id)`
//! with the serialized entity in a JSONB `body` column. Unique fields are
//! checked under a per-collection transaction-scoped advisory lock, so two
//! concurrent creates cannot both pass the check.
//!
//! ## Error Mapping
//!
//! | SQLx error | Result |
//! |------------|--------|
//! | Database `23505` (unique violation) | `DomainError::Conflict` |
//! | anything else | `StoreError::Backend` |

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use canteen_core::{DomainError, EntityId};

use super::{Document, Filter, Mutation, Repository, decode, encode, not_found, taken};
use crate::error::{ServiceError, ServiceResult, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id UUID NOT NULL,
    body JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, id)
)
"#;

/// Create the `documents` table if it does not exist.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| StoreError::backend("migrate", e.to_string()))?;
    Ok(())
}

/// One collection of the shared document table.
pub struct PostgresRepository<T> {
    pool: Arc<PgPool>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> PostgresRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            _doc: PhantomData,
        }
    }
}

impl<T> Clone for PostgresRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _doc: PhantomData,
        }
    }
}

fn map_sqlx_error<T: Document>(operation: &'static str, err: sqlx::Error) -> ServiceError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return DomainError::conflict(format!("duplicate {}", T::COLLECTION)).into();
        }
    }
    StoreError::backend(operation, err.to_string()).into()
}

fn body_of<T: Document>(row: &sqlx::postgres::PgRow) -> ServiceResult<T> {
    let Json(body): Json<Value> = row
        .try_get("body")
        .map_err(|e| map_sqlx_error::<T>("decode_row", e))?;
    Ok(decode(body)?)
}

impl<T: Document> PostgresRepository<T> {
    async fn begin(&self, operation: &'static str) -> ServiceResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error::<T>(operation, e))
    }

    /// Serialize unique checks for this collection until the transaction ends.
    async fn lock_collection(tx: &mut Transaction<'static, Postgres>) -> ServiceResult<()> {
        if T::UNIQUE_FIELDS.is_empty() {
            return Ok(());
        }
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(T::COLLECTION)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error::<T>("lock_collection", e))?;
        Ok(())
    }

    async fn check_unique(
        tx: &mut Transaction<'static, Postgres>,
        id: EntityId,
        body: &Value,
    ) -> ServiceResult<()> {
        for field in T::UNIQUE_FIELDS.iter().copied() {
            let Some(value) = body.get(field) else {
                continue;
            };
            let clash = sqlx::query(
                r#"
                SELECT 1 FROM documents
                WHERE collection = $1 AND id <> $2 AND body -> $3 = $4
                LIMIT 1
                "#,
            )
            .bind(T::COLLECTION)
            .bind(*id.as_uuid())
            .bind(field)
            .bind(Json(value))
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error::<T>("check_unique", e))?;

            if clash.is_some() {
                return Err(taken::<T>(field).into());
            }
        }
        Ok(())
    }

    async fn write_body(
        tx: &mut Transaction<'static, Postgres>,
        id: EntityId,
        body: &Value,
    ) -> ServiceResult<u64> {
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(*id.as_uuid())
            .bind(Json(body))
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error::<T>("update", e))?;
        Ok(result.rows_affected())
    }

    async fn commit(tx: Transaction<'static, Postgres>, operation: &'static str) -> ServiceResult<()> {
        tx.commit().await.map_err(|e| map_sqlx_error::<T>(operation, e))
    }
}

#[async_trait::async_trait]
impl<T: Document> Repository<T> for PostgresRepository<T> {
    #[instrument(skip(self, doc), fields(collection = T::COLLECTION), err)]
    async fn create(&self, doc: T) -> ServiceResult<T> {
        let body = encode(&doc)?;
        let mut tx = self.begin("create").await?;
        Self::lock_collection(&mut tx).await?;
        Self::check_unique(&mut tx, doc.id(), &body).await?;

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(T::COLLECTION)
            .bind(*doc.id().as_uuid())
            .bind(Json(&body))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error::<T>("create", e))?;

        Self::commit(tx, "create").await?;
        Ok(doc)
    }

    async fn list(&self) -> ServiceResult<Vec<T>> {
        let rows = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(T::COLLECTION)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error::<T>("list", e))?;

        rows.iter().map(body_of::<T>).collect()
    }

    async fn get(&self, id: EntityId) -> ServiceResult<T> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error::<T>("get", e))?;

        match row {
            Some(row) => body_of(&row),
            None => Err(not_found::<T>(id).into()),
        }
    }

    #[instrument(skip(self, doc), fields(collection = T::COLLECTION), err)]
    async fn update(&self, doc: T) -> ServiceResult<T> {
        let id = doc.id();
        let body = encode(&doc)?;
        let mut tx = self.begin("update").await?;
        Self::lock_collection(&mut tx).await?;
        Self::check_unique(&mut tx, id, &body).await?;

        if Self::write_body(&mut tx, id, &body).await? == 0 {
            return Err(not_found::<T>(id).into());
        }
        Self::commit(tx, "update").await?;
        Ok(doc)
    }

    async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error::<T>("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found::<T>(id).into());
        }
        Ok(())
    }

    #[instrument(skip(self, mutation), fields(collection = T::COLLECTION, id = %id), err)]
    async fn update_with(&self, id: EntityId, mutation: Mutation<T>) -> ServiceResult<T> {
        let mut tx = self.begin("update_with").await?;
        Self::lock_collection(&mut tx).await?;

        let row = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(T::COLLECTION)
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error::<T>("update_with", e))?;

        let Some(row) = row else {
            return Err(not_found::<T>(id).into());
        };
        let mut doc: T = body_of(&row)?;
        // Dropping the transaction on error rolls it back.
        mutation(&mut doc)?;

        let body = encode(&doc)?;
        Self::check_unique(&mut tx, id, &body).await?;
        Self::write_body(&mut tx, id, &body).await?;
        Self::commit(tx, "update_with").await?;
        Ok(doc)
    }

    async fn find_one(&self, filter: Filter) -> ServiceResult<Option<T>> {
        let row = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE collection = $1 AND body -> $2 = $3
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(T::COLLECTION)
        .bind(filter.field)
        .bind(Json(&filter.value))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error::<T>("find_one", e))?;

        row.as_ref().map(body_of::<T>).transpose()
    }

    async fn count(&self) -> ServiceResult<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM documents WHERE collection = $1")
            .bind(T::COLLECTION)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error::<T>("count", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error::<T>("count", e))?;
        Ok(usize::try_from(total).unwrap_or_default())
    }
}
