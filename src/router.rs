use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    AppState,
    config::Config,
    middleware::{RateLimiter, auth_middleware, log_errors, rate_limit},
    realtime::socket_handler,
    routes,
};

/// 组装完整的应用路由，所有接口挂在 `api_base_uri` 之下
pub fn create_router(state: AppState) -> Router {
    // 公开路由
    let public_routes = Router::new()
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/clubs", get(routes::club::list_clubs))
        .route("/clubs/{id}", get(routes::club::get_club))
        .route(
            "/events",
            get(routes::event::list_events).post(routes::event::create_event),
        )
        .route(
            "/events/{id}",
            get(routes::event::get_event)
                .put(routes::event::update_event)
                .delete(routes::event::delete_event),
        )
        .route("/opportunities", get(routes::opportunity::list_opportunities))
        // 仅发布需要会话，修改和删除与活动一样开放
        .route(
            "/opportunities/{id}",
            get(routes::opportunity::get_opportunity)
                .put(routes::opportunity::update_opportunity)
                .delete(routes::opportunity::delete_opportunity),
        )
        // 实时连接在升级前自行认证
        .route("/socket", get(socket_handler));

    let protected_routes = Router::new()
        .route("/auth/check", get(routes::auth::check_auth))
        .route("/auth/update-profile", put(routes::auth::update_profile))
        // 用户目录
        .route("/users", get(routes::user::list_users))
        .route("/users/{id}", get(routes::user::get_user))
        // 消息路由，静态路径不会落到 {id} 上
        .route("/messages/contacts", get(routes::message::get_contacts))
        .route("/messages/chats", get(routes::message::get_chat_partners))
        .route(
            "/messages/unread/counts",
            get(routes::message::get_unread_counts),
        )
        .route("/messages/{id}", get(routes::message::get_messages))
        .route("/messages/send/{id}", post(routes::message::send_message))
        .route(
            "/messages/mark-read/{id}",
            put(routes::message::mark_messages_as_read),
        )
        // 社团写操作还需要管理员身份
        .route("/clubs", post(routes::club::create_club))
        .route(
            "/clubs/{id}",
            put(routes::club::update_club).delete(routes::club::delete_club),
        )
        .route("/opportunities", post(routes::opportunity::create_opportunity))
        // 应用认证中间件
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new().merge(public_routes).merge(protected_routes);
    let router = match state.config.api_base_uri.trim_end_matches('/') {
        "" => api,
        base => Router::new().nest(base, api),
    };

    // 添加错误日志中间件
    let router = router.layer(from_fn(log_errors));

    // 未配置 Redis 时不限流
    let router = match &state.redis {
        Some(redis) => {
            let limiter = Arc::new(RateLimiter::new(redis.clone(), state.config.clone()));
            router.layer(from_fn_with_state(limiter, rate_limit))
        }
        None => router,
    };

    let router = match cors_layer(&state.config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

/// 配置了来源时允许携带 cookie；开发模式下未配置则全部放行
fn cors_layer(config: &Config) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        return Some(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_credentials(true)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        );
    }

    if cfg!(debug_assertions) {
        tracing::debug!("Adding permissive CORS layer for development mode");
        Some(CorsLayer::permissive())
    } else {
        None
    }
}
