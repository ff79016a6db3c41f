use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::utils::verify_token;
use crate::AppState;

pub const TOKEN_COOKIE: &str = "token";

/// 认证中间件写入请求扩展的当前用户
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// 优先读取 cookie，其次是 `Authorization: Bearer` 头
pub fn credential_from(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
        })
}

/// 校验令牌并加载用户；令牌无效或用户已不存在都视为未认证
pub async fn authenticate(state: &AppState, token: &str) -> AppResult<User> {
    let claims = verify_token(token, &state.config).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::Unauthorized
    })?;

    state
        .store
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = credential_from(&jar, request.headers()).ok_or(AppError::Unauthorized)?;
    let user = authenticate(&state, &token).await?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

pub fn require_admin(user: &User) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Access denied. Admin only.".to_string()))
    }
}
