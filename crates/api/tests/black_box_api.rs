use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use marketplace_api::config::ApiConfig;
use marketplace_auth::{JwtClaims, Role};
use marketplace_commission::CommissionTier;
use marketplace_core::UserId;
use reqwest::StatusCode;
use serde_json::{Value, json};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(config: ApiConfig) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = marketplace_api::app::build_app(&config).expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn with_ten_percent() -> Self {
        let tiers: Vec<CommissionTier> = serde_json::from_value(json!([
            { "id": "standard", "min": 0, "max": null, "type": "percent", "value": 10 }
        ]))
        .unwrap();
        Self::spawn(ApiConfig::new(JWT_SECRET).with_commission_tiers(tiers)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct User {
    id: UserId,
    token: String,
}

fn user(roles: Vec<Role>) -> User {
    let id = UserId::new();
    let now = Utc::now();
    let claims = JwtClaims {
        sub: id,
        roles,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt");

    User { id, token }
}

async fn place_order(client: &reqwest::Client, srv: &TestServer, buyer: &User, seller: &User, amount: u32) -> String {
    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(&buyer.token)
        .json(&json!({ "sellerId": seller.id.to_string(), "amount": amount }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    body["order"]["id"].as_str().unwrap().to_string()
}

async fn patch_status(
    client: &reqwest::Client,
    srv: &TestServer,
    actor: &User,
    order_id: &str,
    body: Value,
) -> (StatusCode, Value) {
    let res = client
        .patch(srv.url(&format!("/orders/{order_id}/status")))
        .bearer_auth(&actor.token)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_public_and_whoami_requires_auth() {
    let srv = TestServer::with_ten_percent().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn identity_is_derived_from_token() {
    let srv = TestServer::with_ten_percent().await;
    let seller = user(vec![Role::SELLER]);

    let res = reqwest::Client::new()
        .get(srv.url("/whoami"))
        .bearer_auth(&seller.token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["userId"].as_str().unwrap(), seller.id.to_string());
    assert_eq!(body["marketRoles"], json!(["seller"]));
}

#[tokio::test]
async fn order_lifecycle_releases_payout_to_seller() {
    let srv = TestServer::with_ten_percent().await;
    let client = reqwest::Client::new();
    let buyer = user(vec![Role::BUYER]);
    let seller = user(vec![Role::SELLER]);
    let admin = user(vec![Role::ADMIN]);

    let id = place_order(&client, &srv, &buyer, &seller, 250).await;

    let (status, body) = patch_status(&client, &srv, &seller, &id, json!({ "updates": { "shipping": "shipped" } })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["order"]["status"]["shipping"], "shipped");

    let (status, body) =
        patch_status(&client, &srv, &buyer, &id, json!({ "updates": { "buyerAction": "received" } })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["order"]["status"]["shipping"], "received");

    let res = client
        .get(srv.url(&format!("/orders/{id}/actions")))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap();
    let actions: Value = res.json().await.unwrap();
    assert_eq!(actions["actions"]["canReleasePayment"], true);
    assert_eq!(actions["actions"]["canBuyerAct"], false);

    let (status, body) = patch_status(&client, &srv, &admin, &id, json!({ "updates": { "payment": "paid" } })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["order"]["status"]["payment"], "paid");

    let res = client
        .get(srv.url(&format!("/sellers/{}/payouts", seller.id)))
        .bearer_auth(&seller.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["account"]["balance"], "225");
    assert_eq!(body["account"]["payouts"][0]["commissionAmount"], "25");
}

#[tokio::test]
async fn rejected_transitions_carry_their_message() {
    let srv = TestServer::with_ten_percent().await;
    let client = reqwest::Client::new();
    let buyer = user(vec![Role::BUYER]);
    let seller = user(vec![Role::SELLER]);

    let id = place_order(&client, &srv, &buyer, &seller, 40).await;

    let (status, body) = patch_status(&client, &srv, &buyer, &id, json!({ "updates": { "shipping": "shipped" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Buyers cannot update shipping status directly");

    let (status, body) = patch_status(&client, &srv, &seller, &id, json!({ "updates": { "payment": "paid" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Sellers cannot update payment");

    let (status, _) = patch_status(&client, &srv, &seller, &id, json!({ "updates": { "shipping": "shipped" } })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = patch_status(&client, &srv, &seller, &id, json!({ "updates": { "shipping": "received" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Can only mark pending orders as shipped");
}

#[tokio::test]
async fn strangers_cannot_touch_an_order() {
    let srv = TestServer::with_ten_percent().await;
    let client = reqwest::Client::new();
    let buyer = user(vec![Role::BUYER]);
    let seller = user(vec![Role::SELLER]);
    let other_buyer = user(vec![Role::BUYER]);

    let id = place_order(&client, &srv, &buyer, &seller, 10).await;

    let res = client
        .get(srv.url(&format!("/orders/{id}")))
        .bearer_auth(&other_buyer.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let (status, body) =
        patch_status(&client, &srv, &other_buyer, &id, json!({ "updates": { "buyerAction": "damaged" } })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn missing_commission_configuration_blocks_payment() {
    let srv = TestServer::spawn(ApiConfig::new(JWT_SECRET)).await;
    let client = reqwest::Client::new();
    let buyer = user(vec![Role::BUYER]);
    let seller = user(vec![Role::SELLER]);
    let admin = user(vec![Role::ADMIN]);

    let id = place_order(&client, &srv, &buyer, &seller, 100).await;
    patch_status(&client, &srv, &seller, &id, json!({ "updates": { "shipping": "shipped" } })).await;
    patch_status(&client, &srv, &buyer, &id, json!({ "updates": { "buyerAction": "received" } })).await;

    let (status, body) = patch_status(&client, &srv, &admin, &id, json!({ "updates": { "payment": "paid" } })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "configuration_missing");

    let res = client
        .get(srv.url(&format!("/orders/{id}")))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["order"]["status"]["payment"], "pending");
}

#[tokio::test]
async fn admin_manages_tiers_with_version_check() {
    let srv = TestServer::spawn(ApiConfig::new(JWT_SECRET)).await;
    let client = reqwest::Client::new();
    let admin = user(vec![Role::ADMIN]);
    let seller = user(vec![Role::SELLER]);

    let tiers = json!([
        { "id": "small", "min": 0, "max": 100, "type": "percent", "value": 10 },
        { "id": "large", "min": 100, "max": null, "type": "flat", "value": 15 }
    ]);

    let res = client
        .put(srv.url("/commission/tiers"))
        .bearer_auth(&seller.token)
        .json(&json!({ "tiers": tiers }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url("/commission/tiers"))
        .bearer_auth(&admin.token)
        .json(&json!({ "tiers": tiers, "expectedVersion": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["config"]["version"], 1);

    let res = client
        .put(srv.url("/commission/tiers"))
        .bearer_auth(&admin.token)
        .json(&json!({ "tiers": [], "expectedVersion": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(srv.url("/commission/calculate"))
        .bearer_auth(&seller.token)
        .json(&json!({ "amount": 50 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["calculation"]["tier"]["id"], "small");
    assert_eq!(body["calculation"]["commissionAmount"], "5");
    assert_eq!(body["calculation"]["settlementAmount"], "45");

    let res = client
        .post(srv.url("/commission/calculate"))
        .bearer_auth(&seller.token)
        .json(&json!({ "amount": 500 }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["calculation"]["tier"]["id"], "large");
    assert_eq!(body["calculation"]["commissionAmount"], "15");
}

#[tokio::test]
async fn amounts_above_the_cap_are_rejected() {
    let srv = TestServer::with_ten_percent().await;
    let client = reqwest::Client::new();
    let buyer = user(vec![Role::BUYER]);
    let seller = user(vec![Role::SELLER]);

    let res = client
        .post(srv.url("/commission/calculate"))
        .bearer_auth(&seller.token)
        .json(&json!({ "amount": "10000000000000000000000000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(&buyer.token)
        .json(&json!({ "sellerId": seller.id.to_string(), "amount": 1_000_000_000_000_001u64 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn invalid_tiers_are_rejected() {
    let srv = TestServer::spawn(ApiConfig::new(JWT_SECRET)).await;
    let admin = user(vec![Role::ADMIN]);

    let res = reqwest::Client::new()
        .put(srv.url("/commission/tiers"))
        .bearer_auth(&admin.token)
        .json(&json!({ "tiers": [
            { "id": "bad", "min": 10, "max": 5, "type": "percent", "value": 1 }
        ] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn payouts_are_private_to_the_seller() {
    let srv = TestServer::with_ten_percent().await;
    let seller = user(vec![Role::SELLER]);
    let other_seller = user(vec![Role::SELLER]);

    let res = reqwest::Client::new()
        .get(srv.url(&format!("/sellers/{}/payouts", seller.id)))
        .bearer_auth(&other_seller.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
