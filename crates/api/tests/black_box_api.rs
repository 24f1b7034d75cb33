use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use canteen_api::app::services::{AppServices, Repositories};
use canteen_api::authz::RoutePolicy;
use canteen_api::config::ApiConfig;
use canteen_auth::{JwtClaims, Role};
use canteen_core::EntityId;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(ApiConfig::new(SECRET)).await
    }

    async fn spawn_with(config: ApiConfig) -> Self {
        // Same router as prod over a fresh in-memory store, on an ephemeral port.
        let services = Arc::new(AppServices::new(&config, Repositories::in_memory()));
        let app = canteen_api::app::build_router(&config, services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn signup(&self, name: &str, email: &str) -> (String, Value) {
        let res = self
            .client
            .post(self.url("/auth/signup"))
            .json(&json!({ "name": name, "email": email, "password": "pw-123" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        (body["token"].as_str().unwrap().to_string(), body["user"].clone())
    }

    async fn send(&self, method: reqwest::Method, path: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        let text = res.text().await.unwrap();
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        (status, value)
    }

    async fn create_product(&self, token: &str, name: &str, price: f64, stock: i64) -> Value {
        let (status, body) = self
            .send(
                reqwest::Method::POST,
                "/products",
                token,
                Some(json!({
                    "name": name,
                    "category": "Meals",
                    "price": price,
                    "stock": stock,
                    "allergens": ["Gluten"],
                    "supplier": "Local Bakery",
                    "expiryDate": "2099-01-01"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, role: Role, expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: EntityId::new(),
        role,
        issued_at: now - ChronoDuration::minutes(1),
        expires_at: now + expires_in,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    for path in ["/whoami", "/products", "/orders", "/users", "/suppliers", "/discounts", "/dashboard/stats"] {
        let res = srv.client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthenticated");
    }
}

#[tokio::test]
async fn expired_and_foreign_tokens_are_rejected() {
    let srv = TestServer::spawn().await;

    let expired = mint_jwt(SECRET, Role::Admin, ChronoDuration::seconds(-30));
    let foreign = mint_jwt("other-secret", Role::Admin, ChronoDuration::minutes(10));

    for token in [expired, foreign, "garbage".to_string()] {
        let (status, _) = srv.send(reqwest::Method::GET, "/whoami", &token, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn first_signup_is_admin_and_later_ones_are_cashiers() {
    let srv = TestServer::spawn().await;

    let (_, first) = srv.signup("Ann", "ann@canteen.io").await;
    let (_, second) = srv.signup("Bob", "bob@canteen.io").await;
    assert_eq!(first["role"], "Admin");
    assert_eq!(second["role"], "Cashier");
    assert!(first.get("passwordHash").is_none());

    let res = srv
        .client
        .post(srv.url("/auth/signup"))
        .json(&json!({ "name": "Ann again", "email": "ann@canteen.io", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = srv
        .client
        .post(srv.url("/auth/signup"))
        .json(&json!({ "name": "", "email": "c@canteen.io", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let srv = TestServer::spawn().await;
    srv.signup("Ann", "ann@canteen.io").await;

    let mut bodies = Vec::new();
    for (email, password) in [("ann@canteen.io", "wrong"), ("ghost@canteen.io", "pw-123")] {
        let res = srv
            .client
            .post(srv.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        bodies.push(res.json::<Value>().await.unwrap());
    }
    assert_eq!(bodies[0], bodies[1]);

    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": "ANN@canteen.io", "password": "pw-123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], "ann@canteen.io");
}

#[tokio::test]
async fn whoami_reports_role_and_pages() {
    let srv = TestServer::spawn().await;
    srv.signup("Ann", "ann@canteen.io").await;
    let (cashier, user) = srv.signup("Bob", "bob@canteen.io").await;

    let (status, body) = srv.send(reqwest::Method::GET, "/whoami", &cashier, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], user["id"]);
    assert_eq!(body["role"], "Cashier");
    let pages: Vec<&str> = body["pages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["page"].as_str().unwrap())
        .collect();
    assert_eq!(pages, vec!["NewOrder", "Orders", "Settings"]);
}

#[tokio::test]
async fn order_snapshots_price_and_stock_is_adjusted_separately() {
    let srv = TestServer::spawn().await;
    let (token, admin) = srv.signup("Ann", "ann@canteen.io").await;

    let product = srv.create_product(&token, "Veg Thali", 2.5, 50).await;
    let pid = product["id"].as_str().unwrap().to_string();
    assert_eq!(product["stockStatus"], "InStock");

    let (status, order) = srv
        .send(
            reqwest::Method::POST,
            "/orders",
            &token,
            Some(json!({ "customerName": "Walk-in", "items": [{ "productId": pid, "quantity": 10 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["total"], 25.0);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["cashier"], admin["name"]);

    // Placing the order does not move stock.
    let (_, fetched) = srv.send(reqwest::Method::GET, &format!("/products/{pid}"), &token, None).await;
    assert_eq!(fetched["stock"], 50);

    let (status, adjusted) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/products/{pid}/stock"),
            &token,
            Some(json!({ "change": -10 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(adjusted["stock"], 40);

    let (status, _) = srv
        .send(
            reqwest::Method::PUT,
            &format!("/products/{pid}"),
            &token,
            Some(json!({ "price": 9.99 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, orders) = srv.send(reqwest::Method::GET, "/orders", &token, None).await;
    assert_eq!(orders[0]["total"], 25.0);
    assert_eq!(orders[0]["items"][0]["price"], 2.5);
    assert_eq!(orders[0]["items"][0]["name"], "Veg Thali");
}

#[tokio::test]
async fn overdrawing_stock_is_rejected_without_effect() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.signup("Ann", "ann@canteen.io").await;
    let product = srv.create_product(&token, "Samosa", 1.0, 5).await;
    let pid = product["id"].as_str().unwrap();

    let (status, body) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/products/{pid}/stock"),
            &token,
            Some(json!({ "change": -6 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_state");

    let (_, fetched) = srv.send(reqwest::Method::GET, &format!("/products/{pid}"), &token, None).await;
    assert_eq!(fetched["stock"], 5);
    assert_eq!(fetched["stockStatus"], "LowStock");
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.signup("Ann", "ann@canteen.io").await;

    let (status, body) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/products/{}/stock", EntityId::new()),
            &token,
            Some(json!({ "change": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = srv.send(reqwest::Method::DELETE, "/suppliers/not-an-id", &token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, _) = srv
        .send(
            reqwest::Method::POST,
            "/orders",
            &token,
            Some(json!({ "customerName": "X", "items": [{ "productId": EntityId::new(), "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_are_invalid_input() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.signup("Ann", "ann@canteen.io").await;

    let (status, body) = srv
        .send(reqwest::Method::POST, "/products", &token, Some(json!({ "name": "No price" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, _) = srv
        .send(
            reqwest::Method::POST,
            "/orders",
            &token,
            Some(json!({ "customerName": "X", "items": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn supplier_crud_round_trip() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.signup("Ann", "ann@canteen.io").await;

    let (status, created) = srv
        .send(
            reqwest::Method::POST,
            "/suppliers",
            &token,
            Some(json!({ "name": "Fresh Farms", "contactPerson": "Raj", "phone": "555-0101", "email": "raj@farms.io" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = srv
        .send(
            reqwest::Method::PUT,
            &format!("/suppliers/{id}"),
            &token,
            Some(json!({ "phone": "555-0199" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "555-0199");
    assert_eq!(updated["name"], "Fresh Farms");

    let (_, list) = srv.send(reqwest::Method::GET, "/suppliers", &token, None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = srv.send(reqwest::Method::DELETE, &format!("/suppliers/{id}"), &token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = srv.send(reqwest::Method::DELETE, &format!("/suppliers/{id}"), &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn discount_codes_are_unique() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.signup("Ann", "ann@canteen.io").await;
    let discount = json!({ "code": "LUNCH10", "description": "Lunch deal", "type": "percentage", "value": 10 });

    let (status, created) = srv
        .send(reqwest::Method::POST, "/discounts", &token, Some(discount.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["isActive"], true);

    let (status, body) = srv.send(reqwest::Method::POST, "/discounts", &token, Some(discount)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, _) = srv
        .send(
            reqwest::Method::POST,
            "/discounts",
            &token,
            Some(json!({ "code": "BIG", "type": "percentage", "value": 150 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_manages_users() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.signup("Ann", "ann@canteen.io").await;

    let (status, staff) = srv
        .send(
            reqwest::Method::POST,
            "/users",
            &token,
            Some(json!({ "name": "Sam", "email": "sam@canteen.io", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(staff["role"], "Staff");
    assert_eq!(staff["status"], "Active");
    let id = staff["id"].as_str().unwrap().to_string();

    let (status, promoted) = srv
        .send(
            reqwest::Method::PUT,
            &format!("/users/{id}"),
            &token,
            Some(json!({ "role": "Manager" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], "Manager");

    let (_, users) = srv.send(reqwest::Method::GET, "/users", &token, None).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert!(users[0].get("passwordHash").is_none());

    let (status, _) = srv.send(reqwest::Method::DELETE, &format!("/users/{id}"), &token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn dashboard_tracks_completed_orders() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.signup("Ann", "ann@canteen.io").await;
    let tea = srv.create_product(&token, "Masala Chai", 1.5, 100).await;
    let bun = srv.create_product(&token, "Bun Maska", 2.0, 100).await;

    let mut order_ids = Vec::new();
    for (customer, items) in [
        ("Asha", json!([{ "productId": tea["id"], "quantity": 4 }])),
        ("Ravi", json!([{ "productId": bun["id"], "quantity": 1 }, { "productId": tea["id"], "quantity": 1 }])),
    ] {
        let (status, order) = srv
            .send(
                reqwest::Method::POST,
                "/orders",
                &token,
                Some(json!({ "customerName": customer, "items": items })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        order_ids.push(order["id"].as_str().unwrap().to_string());
    }

    let (_, stats) = srv.send(reqwest::Method::GET, "/dashboard/stats", &token, None).await;
    assert_eq!(stats["totalRevenue"], 0.0);
    assert_eq!(stats["totalOrders"], 2);
    assert_eq!(stats["pendingOrders"], 2);
    assert_eq!(stats["newCustomers"], 2);

    for id in &order_ids {
        let (status, updated) = srv
            .send(
                reqwest::Method::PUT,
                &format!("/orders/{id}"),
                &token,
                Some(json!({ "status": "Completed" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "Completed");
    }

    let (_, stats) = srv.send(reqwest::Method::GET, "/dashboard/stats", &token, None).await;
    assert_eq!(stats["totalRevenue"], 9.5);
    assert_eq!(stats["pendingOrders"], 0);

    let (_, top) = srv.send(reqwest::Method::GET, "/dashboard/top-products", &token, None).await;
    assert_eq!(top, json!([{ "name": "Masala Chai", "sales": 5 }, { "name": "Bun Maska", "sales": 1 }]));

    let (_, sales) = srv.send(reqwest::Method::GET, "/dashboard/sales", &token, None).await;
    assert_eq!(sales.as_array().unwrap().len(), 7);
    assert_eq!(sales[0]["name"], "Mon");

    let (status, _) = srv.send(reqwest::Method::DELETE, &format!("/orders/{}", order_ids[0]), &token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, stats) = srv.send(reqwest::Method::GET, "/dashboard/stats", &token, None).await;
    assert_eq!(stats["totalRevenue"], 3.5);
}

#[tokio::test]
async fn out_of_range_prices_and_quantities_are_invalid_input() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.signup("Ann", "ann@canteen.io").await;

    let (status, body) = srv
        .send(
            reqwest::Method::POST,
            "/products",
            &token,
            Some(json!({ "name": "Gold Bar", "category": "Luxury", "price": 1e28, "stock": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let water = srv.create_product(&token, "Water", 0.0, 10).await;
    let huge = i64::MAX / 2 + 1;
    for _ in 0..2 {
        let (status, body) = srv
            .send(
                reqwest::Method::POST,
                "/orders",
                &token,
                Some(json!({
                    "customerName": "Asha",
                    "status": "Completed",
                    "items": [{ "productId": water["id"], "quantity": huge }]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }

    let (status, top) = srv.send(reqwest::Method::GET, "/dashboard/top-products", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(top, json!([]));
    let (status, stats) = srv.send(reqwest::Method::GET, "/dashboard/stats", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalOrders"], 0);
}

#[tokio::test]
async fn expiry_date_can_be_cleared() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.signup("Ann", "ann@canteen.io").await;
    let product = srv.create_product(&token, "Paneer Roll", 3.0, 30).await;
    let pid = product["id"].as_str().unwrap();
    assert_eq!(product["expiryDate"], "2099-01-01");

    let (status, renamed) = srv
        .send(reqwest::Method::PUT, &format!("/products/{pid}"), &token, Some(json!({ "name": "Paneer Wrap" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["expiryDate"], "2099-01-01");

    let (status, cleared) = srv
        .send(reqwest::Method::PUT, &format!("/products/{pid}"), &token, Some(json!({ "expiryDate": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["expiryDate"].is_null());
}

#[tokio::test]
async fn permissive_policy_lets_any_role_through() {
    let srv = TestServer::spawn().await;
    srv.signup("Ann", "ann@canteen.io").await;
    let (cashier, _) = srv.signup("Bob", "bob@canteen.io").await;

    let (status, _) = srv.send(reqwest::Method::GET, "/users", &cashier, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn navigation_policy_enforces_page_roles() {
    let mut config = ApiConfig::new(SECRET);
    config.role_policy = RoutePolicy::Navigation;
    let srv = TestServer::spawn_with(config).await;

    let (admin, _) = srv.signup("Ann", "ann@canteen.io").await;
    let (cashier, _) = srv.signup("Bob", "bob@canteen.io").await;

    let (status, body) = srv.send(reqwest::Method::GET, "/dashboard/stats", &cashier, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = srv.send(reqwest::Method::GET, "/users", &cashier, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Cashiers can still browse the catalog and take orders.
    let product = srv.create_product(&admin, "Idli", 1.0, 10).await;
    let (status, _) = srv.send(reqwest::Method::GET, "/products", &cashier, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = srv
        .send(
            reqwest::Method::POST,
            "/orders",
            &cashier,
            Some(json!({ "customerName": "Meena", "items": [{ "productId": product["id"], "quantity": 2 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = srv.send(reqwest::Method::GET, "/dashboard/stats", &admin, None).await;
    assert_eq!(status, StatusCode::OK);

    let staff = mint_jwt(SECRET, Role::Staff, ChronoDuration::minutes(5));
    let (status, _) = srv.send(reqwest::Method::GET, "/orders", &staff, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = srv.send(reqwest::Method::GET, "/whoami", &staff, None).await;
    assert_eq!(status, StatusCode::OK);
}
