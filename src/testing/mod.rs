use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

use crate::app::AppState;
use crate::config::{
    ApiConfig, AppConfig, DatabaseConfig, Environment, IdentityConfig, LogLevel, PaymentsConfig, StoreKind,
};
use crate::database::UserStore;

/// Fully valid configuration without touching the process environment
pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Test,
        port: 0,
        log_level: LogLevel::Debug,
        security: crate::auth::tests::security_config(),
        identity: IdentityConfig {
            publishable_key: "pk_test_template".to_string(),
            secret_key: "sk_test_template".to_string(),
            aurora_api_url: None,
            aurora_api_key: None,
        },
        database: DatabaseConfig {
            url: Url::parse("postgres://localhost:5432/template_test").unwrap(),
            store: StoreKind::Memory,
        },
        payments: PaymentsConfig::default(),
        api: ApiConfig {
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max_requests: 1000,
            max_request_size_bytes: 1024 * 1024,
        },
    }
}

pub fn test_state(store: Arc<dyn UserStore>) -> AppState {
    AppState::new(test_config(), store)
}

/// `Authorization` header value carrying a fresh access token for `user_id`
pub fn bearer_for(state: &AppState, user_id: &str) -> String {
    let pair = state.tokens.issue_pair(user_id).unwrap();
    format!("Bearer {}", pair.access_token)
}

/// Drive one request through the router and decode the JSON body
pub async fn send(
    router: Router,
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = authorization {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
