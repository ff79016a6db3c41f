#![allow(dead_code)]

use alumni_connect::{
    AppState,
    config::Config,
    database::Store,
    models::Role,
    router::create_router,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub fn test_state() -> AppState {
    let mut config = Config::with_secret("integration-secret");
    config.cookie_secure = false;
    config.bcrypt_cost = 4;
    AppState::new(Store::memory(), config)
}

pub fn test_app() -> (AppState, Router) {
    let state = test_state();
    let app = create_router(state.clone());
    (state, app)
}

pub struct Response {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl Response {
    pub fn data(&self) -> &Value {
        &self.body["resp_data"]
    }

    pub fn msg(&self) -> &str {
        self.body["msg"].as_str().unwrap_or_default()
    }
}

pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Response {
        status,
        headers,
        body,
    }
}

/// 注册并返回 (令牌, 用户ID)
pub async fn signup(app: &Router, name: &str, email: &str) -> (String, Uuid) {
    let res = call(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "full_name": name,
            "email": email,
            "password": "secret1",
            "role": "alumni",
            "batch": 2020
        })),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "signup failed: {}", res.body);
    let token = res.data()["token"].as_str().unwrap().to_string();
    let id = res.data()["user"]["id"].as_str().unwrap().parse().unwrap();
    (token, id)
}

pub async fn signup_admin(state: &AppState, app: &Router) -> (String, Uuid) {
    let (token, id) = signup(app, "admin", "admin@example.com").await;
    state.store.users.set_role(id, Role::Admin).await.unwrap();
    (token, id)
}
