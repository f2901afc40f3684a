//! Router harness for API integration tests.
//!
//! Builds the real router over an in-memory store and issues session
//! tokens directly, so tests can act as any role.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use helperbase_api::{
    generate_jwt_token, hash_password, ApiConfig, AppState, AuthConfig, JwtSecret,
};
use helperbase_core::{Role, User};
use helperbase_storage::{InMemoryRecordStore, RecordStore};
use helperbase_test_utils::fixtures;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "integration-password";

pub fn auth_config() -> Result<AuthConfig, String> {
    Ok(AuthConfig {
        jwt_secret: JwtSecret::new("integration_test_secret_0123456789abcdef".to_string())
            .map_err(|e| e.to_string())?,
        ..AuthConfig::default()
    })
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryRecordStore>,
    pub auth_config: AuthConfig,
}

/// A response with its body parsed as JSON (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// App with rate limiting off.
    pub fn new() -> Result<Self, String> {
        Self::with_config(ApiConfig {
            rate_limit_enabled: false,
            ..ApiConfig::default()
        })
    }

    pub fn with_config(api_config: ApiConfig) -> Result<Self, String> {
        let store = Arc::new(InMemoryRecordStore::new());
        let auth_config = auth_config()?;
        let state = AppState::new(store.clone(), api_config, auth_config.clone());
        let router = helperbase_api::ApiRouterBuilder::new(state)
            .map_err(|e| e.message)?
            .build();
        Ok(Self {
            router,
            store,
            auth_config,
        })
    }

    /// Insert a user with [`TEST_PASSWORD`] and return it with a session token.
    pub async fn user(&self, email: &str, role: Role) -> Result<(User, String), String> {
        let hash = hash_password(TEST_PASSWORD).map_err(|e| e.message)?;
        let user = fixtures::user(email, role, &hash);
        self.store.user_insert(&user).await.map_err(|e| e.to_string())?;
        let token = generate_jwt_token(&self.auth_config, &user).map_err(|e| e.message)?;
        Ok((user, token))
    }

    pub async fn token_for(&self, role: Role) -> Result<String, String> {
        let email = format!("{}@example.org", role);
        Ok(self.user(&email, role).await?.1)
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse, String> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| e.to_string())?
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    /// Send `body` as JSON with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse, String> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .map_err(|e| e.to_string())?;
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse, String> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse, String> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse, String> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<TestResponse, String> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }
}

pub fn helper_body(full_name: &str) -> Value {
    serde_json::json!({
        "full_name": full_name,
        "nationality": "Indonesia",
        "passport_number": "B1234567",
        "employer_name": "Chan Household",
        "employment_start": "2024-01-15",
    })
}

pub fn incident_body(helper_id: &str) -> Value {
    serde_json::json!({
        "helper_id": helper_id,
        "title": "Rest day denied",
        "description": "Required to work on three consecutive rest days",
        "incident_date": "2024-05-04",
        "severity": "high",
    })
}

/// The `helper_id` of a helper created through the API.
pub async fn create_helper(app: &TestApp, token: &str, full_name: &str) -> Result<String, String> {
    let response = app.post("/api/v1/helpers", token, helper_body(full_name)).await?;
    if response.status != StatusCode::CREATED {
        return Err(format!("create helper failed: {} {}", response.status, response.body));
    }
    response.body["helper_id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| "helper_id missing".to_string())
}
