//! Service wiring: one repository per collection plus the services on top.

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use tracing::info;

use canteen_auth::{Hs256JwtIssuer, User};
use canteen_infra::{CredentialStore, InMemoryRepository, InventoryAdjuster, OrderProcessor, Repository, StoreError};
use canteen_parties::Supplier;
use canteen_products::{Discount, Product};
use canteen_sales::Order;

use crate::config::ApiConfig;

pub struct AppServices {
    pub credentials: CredentialStore,
    pub products: Arc<dyn Repository<Product>>,
    pub suppliers: Arc<dyn Repository<Supplier>>,
    pub discounts: Arc<dyn Repository<Discount>>,
    pub inventory: InventoryAdjuster,
    pub orders: OrderProcessor,
}

/// Repository handle per collection.
pub struct Repositories {
    pub users: Arc<dyn Repository<User>>,
    pub products: Arc<dyn Repository<Product>>,
    pub orders: Arc<dyn Repository<Order>>,
    pub suppliers: Arc<dyn Repository<Supplier>>,
    pub discounts: Arc<dyn Repository<Discount>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryRepository::<User>::new()),
            products: Arc::new(InMemoryRepository::<Product>::new()),
            orders: Arc::new(InMemoryRepository::<Order>::new()),
            suppliers: Arc::new(InMemoryRepository::<Supplier>::new()),
            discounts: Arc::new(InMemoryRepository::<Discount>::new()),
        }
    }

    #[cfg(feature = "postgres")]
    pub async fn postgres(database_url: &str) -> Result<Self, StoreError> {
        use canteen_infra::repository::{PostgresRepository, migrate};

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::backend("connect", e.to_string()))?;
        migrate(&pool).await?;

        Ok(Self {
            users: Arc::new(PostgresRepository::<User>::new(pool.clone())),
            products: Arc::new(PostgresRepository::<Product>::new(pool.clone())),
            orders: Arc::new(PostgresRepository::<Order>::new(pool.clone())),
            suppliers: Arc::new(PostgresRepository::<Supplier>::new(pool.clone())),
            discounts: Arc::new(PostgresRepository::<Discount>::new(pool)),
        })
    }
}

impl AppServices {
    pub fn new(config: &ApiConfig, repos: Repositories) -> Self {
        let ttl = ChronoDuration::from_std(config.token_ttl).unwrap_or_else(|_| ChronoDuration::days(1));
        let issuer = Hs256JwtIssuer::new(config.jwt_secret.as_bytes(), ttl);

        Self {
            credentials: CredentialStore::new(repos.users, issuer),
            inventory: InventoryAdjuster::new(repos.products.clone()),
            orders: OrderProcessor::new(repos.orders, repos.products.clone()),
            products: repos.products,
            suppliers: repos.suppliers,
            discounts: repos.discounts,
        }
    }
}

/// Pick the storage backend from configuration.
pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    let repos = match config.database_url.as_deref() {
        #[cfg(feature = "postgres")]
        Some(url) => {
            info!("using postgres document store");
            Repositories::postgres(url).await?
        }
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            tracing::warn!("DATABASE_URL set but built without the postgres feature; using in-memory store");
            Repositories::in_memory()
        }
        None => {
            info!("using in-memory document store");
            Repositories::in_memory()
        }
    };
    Ok(AppServices::new(config, repos))
}
