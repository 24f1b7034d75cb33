//! Typed HTTP interface to the back-office API.

use std::sync::RwLock;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use canteen_auth::{Page, Role, UserProfile, UserStatus};
use canteen_core::EntityId;
use canteen_parties::{Supplier, SupplierDraft, SupplierPatch};
use canteen_products::{Discount, DiscountDraft, DiscountPatch, Product, ProductDraft, ProductPatch};
use canteen_sales::{DashboardStats, Order, OrderItemRequest, OrderStatus, SalesPoint, TopProduct};

use crate::ClientError;

/// Token plus the profile it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub customer_name: String,
    pub items: Vec<OrderItemRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

/// User form as submitted from the Users page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageEntry {
    pub page: Page,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub user_id: EntityId,
    pub role: Role,
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
    message: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: RwLock<Option<AuthSession>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: RwLock::new(None),
        }
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.read().ok()?.as_ref().map(|s| s.user.clone())
    }

    pub fn logout(&self) {
        if let Ok(mut session) = self.session.write() {
            *session = None;
        }
    }

    // --- auth ---

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        let session: AuthSession = self.send(self.request(Method::POST, "/auth/signup").json(&body)).await?;
        Ok(self.remember(session))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let session: AuthSession = self.send(self.request(Method::POST, "/auth/login").json(&body)).await?;
        Ok(self.remember(session))
    }

    pub async fn whoami(&self) -> Result<WhoAmI, ClientError> {
        self.send(self.authed(Method::GET, "/whoami")?).await
    }

    // --- users ---

    pub async fn users(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.send(self.authed(Method::GET, "/users")?).await
    }

    pub async fn add_user(&self, form: &UserForm) -> Result<UserProfile, ClientError> {
        self.send(self.authed(Method::POST, "/users")?.json(form)).await
    }

    pub async fn update_user(&self, id: EntityId, form: &UserForm) -> Result<UserProfile, ClientError> {
        self.send(self.authed(Method::PUT, &format!("/users/{id}"))?.json(form)).await
    }

    pub async fn delete_user(&self, id: EntityId) -> Result<(), ClientError> {
        self.send_empty(self.authed(Method::DELETE, &format!("/users/{id}"))?).await
    }

    // --- products ---

    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        self.send(self.authed(Method::GET, "/products")?).await
    }

    pub async fn product(&self, id: EntityId) -> Result<Product, ClientError> {
        self.send(self.authed(Method::GET, &format!("/products/{id}"))?).await
    }

    pub async fn add_product(&self, draft: &ProductDraft) -> Result<Product, ClientError> {
        self.send(self.authed(Method::POST, "/products")?.json(draft)).await
    }

    pub async fn update_product(&self, id: EntityId, patch: &ProductPatch) -> Result<Product, ClientError> {
        self.send(self.authed(Method::PUT, &format!("/products/{id}"))?.json(patch)).await
    }

    pub async fn delete_product(&self, id: EntityId) -> Result<(), ClientError> {
        self.send_empty(self.authed(Method::DELETE, &format!("/products/{id}"))?).await
    }

    /// Apply a signed stock delta on the server.
    pub async fn update_product_stock(&self, id: EntityId, change: i64) -> Result<Product, ClientError> {
        let body = serde_json::json!({ "change": change });
        self.send(self.authed(Method::PATCH, &format!("/products/{id}/stock"))?.json(&body)).await
    }

    // --- orders ---

    pub async fn orders(&self) -> Result<Vec<Order>, ClientError> {
        self.send(self.authed(Method::GET, "/orders")?).await
    }

    pub async fn add_order(&self, order: &PlaceOrder) -> Result<Order, ClientError> {
        self.send(self.authed(Method::POST, "/orders")?.json(order)).await
    }

    pub async fn update_order_status(&self, id: EntityId, status: OrderStatus) -> Result<Order, ClientError> {
        let body = serde_json::json!({ "status": status });
        self.send(self.authed(Method::PUT, &format!("/orders/{id}"))?.json(&body)).await
    }

    pub async fn delete_order(&self, id: EntityId) -> Result<(), ClientError> {
        self.send_empty(self.authed(Method::DELETE, &format!("/orders/{id}"))?).await
    }

    // --- suppliers ---

    pub async fn suppliers(&self) -> Result<Vec<Supplier>, ClientError> {
        self.send(self.authed(Method::GET, "/suppliers")?).await
    }

    pub async fn add_supplier(&self, draft: &SupplierDraft) -> Result<Supplier, ClientError> {
        self.send(self.authed(Method::POST, "/suppliers")?.json(draft)).await
    }

    pub async fn update_supplier(&self, id: EntityId, patch: &SupplierPatch) -> Result<Supplier, ClientError> {
        self.send(self.authed(Method::PUT, &format!("/suppliers/{id}"))?.json(patch)).await
    }

    pub async fn delete_supplier(&self, id: EntityId) -> Result<(), ClientError> {
        self.send_empty(self.authed(Method::DELETE, &format!("/suppliers/{id}"))?).await
    }

    // --- discounts ---

    pub async fn discounts(&self) -> Result<Vec<Discount>, ClientError> {
        self.send(self.authed(Method::GET, "/discounts")?).await
    }

    pub async fn add_discount(&self, draft: &DiscountDraft) -> Result<Discount, ClientError> {
        self.send(self.authed(Method::POST, "/discounts")?.json(draft)).await
    }

    pub async fn update_discount(&self, id: EntityId, patch: &DiscountPatch) -> Result<Discount, ClientError> {
        self.send(self.authed(Method::PUT, &format!("/discounts/{id}"))?.json(patch)).await
    }

    pub async fn delete_discount(&self, id: EntityId) -> Result<(), ClientError> {
        self.send_empty(self.authed(Method::DELETE, &format!("/discounts/{id}"))?).await
    }

    // --- dashboard ---

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        self.send(self.authed(Method::GET, "/dashboard/stats")?).await
    }

    pub async fn sales_data(&self) -> Result<Vec<SalesPoint>, ClientError> {
        self.send(self.authed(Method::GET, "/dashboard/sales")?).await
    }

    pub async fn top_products(&self) -> Result<Vec<TopProduct>, ClientError> {
        self.send(self.authed(Method::GET, "/dashboard/top-products")?).await
    }

    // --- plumbing ---

    fn remember(&self, session: AuthSession) -> UserProfile {
        let user = session.user.clone();
        if let Ok(mut slot) = self.session.write() {
            *slot = Some(session);
        }
        user
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self
            .session
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.token.clone()))
            .ok_or(ClientError::NotLoggedIn)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let res = check(req.send().await?).await?;
        Ok(res.json().await?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), ClientError> {
        check(req.send().await?).await?;
        Ok(())
    }
}

async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    debug!(status = status.as_u16(), url = %res.url(), "api error");
    let text = res.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(env) => (env.error, env.message),
        Err(_) => ("http_error".to_string(), format!("request failed with status {status}")),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_without_session_fail_locally() {
        let client = ApiClient::new("http://localhost:3001/");
        assert!(matches!(client.authed(Method::GET, "/products"), Err(ClientError::NotLoggedIn)));
        assert_eq!(client.current_user(), None);
    }

    #[test]
    fn place_order_omits_absent_status() {
        let order = PlaceOrder {
            customer_name: "Walk-in".into(),
            items: vec![],
            status: None,
        };
        let json = serde_json::to_value(order).unwrap();
        assert_eq!(json, serde_json::json!({ "customerName": "Walk-in", "items": [] }));
    }
}
