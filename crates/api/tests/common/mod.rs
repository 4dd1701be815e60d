#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::broadcast;
use tower::ServiceExt;

use clientdesk_api::auth::jwt::{generate_access_token, JwtConfig};
use clientdesk_api::auth::password::hash_password;
use clientdesk_api::config::{PaymentConfig, ServerConfig};
use clientdesk_api::router::build_app_router;
use clientdesk_api::state::AppState;
use clientdesk_core::signing::sign_payload;
use clientdesk_db::models::operator::{NewOperator, Operator};
use clientdesk_db::store::{MemoryStore, OperatorStore};
use clientdesk_events::{EventBus, WorkflowEvent};

pub const WEBHOOK_SECRET: &str = "whsec-test-secret";
pub const PAYMENT_BASE_URL: &str = "https://pay.example.com/checkout";
pub const OPERATOR_PASSWORD: &str = "operator-password-123";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
        payment: PaymentConfig {
            base_url: PAYMENT_BASE_URL.to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
        },
        overdue_sweep_interval_secs: 3600,
        invoice_net_days: 14,
    }
}

/// Router plus handles on its store and event stream.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub events: broadcast::Receiver<WorkflowEvent>,
    pub config: ServerConfig,
}

impl TestApp {
    /// A fresh router clone for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Event types published so far, in order.
    pub fn drain_events(&mut self) -> Vec<WorkflowEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    /// Create an operator with [`OPERATOR_PASSWORD`] and return a bearer token.
    pub async fn operator_token(&self, email: &str, role: &str) -> String {
        let operator = seed_operator(&self.store, email, role).await;
        generate_access_token(operator.id, &operator.role, &self.config.jwt)
            .expect("token generation should succeed")
    }

    pub async fn admin_token(&self) -> String {
        self.operator_token("admin@agency.test", "admin").await
    }
}

/// Build the full application router over an in-memory store, using the same
/// middleware stack as production.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = MemoryStore::new();
    let event_bus = Arc::new(EventBus::default());
    let events = event_bus.subscribe();

    let state = AppState {
        store: Arc::new(store.clone()),
        config: Arc::new(config.clone()),
        event_bus,
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        events,
        config,
    }
}

pub async fn seed_operator(store: &MemoryStore, email: &str, role: &str) -> Operator {
    store
        .create_operator(NewOperator {
            email: email.to_string(),
            display_name: "Test Operator".to_string(),
            password_hash: hash_password(OPERATOR_PASSWORD).expect("hashing should succeed"),
            role: role.to_string(),
        })
        .await
        .expect("operator creation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(
    method: &str,
    uri: &str,
    body: &serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request("POST", uri, &body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("POST", uri, &body, Some(token))).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request("PUT", uri, &body, None)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("PUT", uri, &body, Some(token))).await
}

/// POST with no body, optionally authenticated.
pub async fn post_empty(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::post(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

/// POST a payment confirmation signed with `secret`.
pub async fn post_signed(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    secret: &str,
) -> Response<Body> {
    let bytes = serde_json::to_vec(&body).unwrap();
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .header("x-payment-signature", sign_payload(secret, &bytes))
        .body(Body::from(bytes))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn expect_status(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    let actual = response.status();
    let body = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {body}");
    body
}

// ---------------------------------------------------------------------------
// Onboarding fixtures
// ---------------------------------------------------------------------------

/// A form that passes every step's checks.
pub fn complete_form(campaign_code: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "identity": {
            "first_name": "Pedro",
            "last_name": "Alvarez",
            "practice_name": "Alvarez Family Dental",
            "specialty": "Dentistry"
        },
        "contact": {
            "email": "pedro@example.com",
            "phone": "+15550123",
            "preferred_contact": "email"
        },
        "digital_presence": {
            "website": "https://alvarez.example.com",
            "social_handles": ["@alvarezdental"]
        },
        "campaign": { "campaign_code": campaign_code },
        "goals": { "primary_goal": "More new patients" }
    })
}

/// Create a draft and return its id.
pub async fn create_draft(app: &TestApp, variant: &str) -> String {
    let response = post_json(
        app.app(),
        "/api/v1/onboarding/drafts",
        serde_json::json!({ "variant": variant }),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Save `form` and advance until the draft sits on its review step.
pub async fn fill_to_review(app: &TestApp, draft_id: &str, form: serde_json::Value) {
    let response = put_json(
        app.app(),
        &format!("/api/v1/onboarding/drafts/{draft_id}/form-data"),
        form,
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    loop {
        let response = post_empty(
            app.app(),
            &format!("/api/v1/onboarding/drafts/{draft_id}/next"),
            None,
        )
        .await;
        let body = expect_status(response, StatusCode::OK).await;
        match body["data"]["outcome"].as_str().unwrap() {
            "moved" => continue,
            "at_last_step" => break,
            other => panic!("unexpected outcome {other}: {body}"),
        }
    }
}

/// Issue an access code as admin.
pub async fn issue_access_code(app: &TestApp, token: &str, code: &str, max_uses: i32) {
    let response = post_json_auth(
        app.app(),
        "/api/v1/access-codes",
        serde_json::json!({
            "code": code,
            "client_name": "Dr. Pedro Alvarez",
            "client_email": "pedro@example.com",
            "package_name": "Growth",
            "price": 9950,
            "features": ["Local SEO", "Review management"],
            "max_uses": max_uses
        }),
        token,
    )
    .await;
    expect_status(response, StatusCode::CREATED).await;
}

/// Run an access-code onboarding end to end and return the submit response body.
pub async fn submit_access_code_onboarding(
    app: &TestApp,
    token: &str,
    code: &str,
) -> serde_json::Value {
    issue_access_code(app, token, code, 1).await;
    let draft_id = create_draft(app, "access_code").await;
    fill_to_review(app, &draft_id, complete_form(None)).await;

    let response = post_json(
        app.app(),
        &format!("/api/v1/onboarding/drafts/{draft_id}/redeem"),
        serde_json::json!({ "access_code": code }),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["redemption"]["success"], true);

    let response = post_empty(
        app.app(),
        &format!("/api/v1/onboarding/drafts/{draft_id}/submit"),
        None,
    )
    .await;
    expect_status(response, StatusCode::CREATED).await
}
