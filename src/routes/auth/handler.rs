use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    AppState,
    config::Config,
    error::{AppError, AppResult},
    middleware::{CurrentUser, TOKEN_COOKIE},
    models::{NewUser, Role, User, normalize_email, normalize_full_name},
    utils::{generate_token, hash_password, success_to_api_response, verify_password},
};

use super::model::{
    AuthResponse, LoginRequest, LogoutResponse, SignupRequest, UpdateProfileRequest, non_empty,
};

const MIN_PASSWORD_LEN: usize = 6;

fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    // 跨站部署需要 SameSite=None，而它要求 Secure
    let same_site = if config.cookie_secure {
        SameSite::None
    } else {
        SameSite::Lax
    };
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(same_site)
        .max_age(time::Duration::seconds(config.jwt_expiration_secs as i64))
        .build()
}

fn issue_session(user: User, jar: CookieJar, config: &Config) -> AppResult<(CookieJar, AuthResponse)> {
    let (token, expires_at) = generate_token(user.id, config)?;
    let jar = jar.add(session_cookie(token.clone(), config));
    Ok((
        jar,
        AuthResponse {
            user,
            token,
            expires_at,
        },
    ))
}

fn signup_role(role: Option<&str>) -> AppResult<Role> {
    match role.map(str::parse::<Role>) {
        None => Ok(Role::Student),
        Some(Ok(role @ (Role::Student | Role::Alumni))) => Ok(role),
        // 管理员只能由 seed 工具授予
        Some(_) => Err(AppError::validation("Role must be student or alumni")),
    }
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let (Some(full_name), Some(email), Some(password)) = (
        non_empty(req.full_name),
        non_empty(req.email),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation(
            "Name, email and password are required",
        ));
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "Password must be at least 6 characters",
        ));
    }
    let role = signup_role(non_empty(req.role).as_deref())?;

    let email = normalize_email(&email);
    if state.store.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::UserExists);
    }

    let password_hash = hash_password(&password, state.config.bcrypt_cost)?;
    // 并发注册时由唯一索引兜底，冲突同样映射为 UserExists
    let user = state
        .store
        .users
        .create(NewUser {
            full_name: normalize_full_name(&full_name),
            email,
            password_hash,
            role,
            batch: req.batch,
            cur_role: non_empty(req.cur_role),
            company: non_empty(req.company),
            location: non_empty(req.location),
        })
        .await?;
    tracing::info!("User signed up: {}", user.email);

    let (jar, body) = issue_session(user, jar, &state.config)?;
    Ok((StatusCode::CREATED, jar, success_to_api_response(body)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (non_empty(req.email), req.password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::validation("All fields are required"));
    };

    let user = state
        .store
        .users
        .find_by_email(&normalize_email(&email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    state.store.users.record_login(user.id).await?;
    tracing::info!("User logged in: {}", user.email);

    let (jar, body) = issue_session(user, jar, &state.config)?;
    Ok((StatusCode::OK, jar, success_to_api_response(body)))
}

#[axum::debug_handler]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (StatusCode::OK, jar, success_to_api_response(LogoutResponse {}))
}

/// 认证中间件已加载用户，直接返回
#[axum::debug_handler]
pub async fn check_auth(Extension(CurrentUser(user)): Extension<CurrentUser>) -> impl IntoResponse {
    (StatusCode::OK, success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(mut req): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    if let Some(full_name) = req.full_name.take() {
        let full_name = normalize_full_name(&full_name);
        if full_name.is_empty() {
            return Err(AppError::validation("Name cannot be empty"));
        }
        req.full_name = Some(full_name);
    }
    // 只保存图片地址，上传由图床完成
    if req
        .profile_pic
        .as_deref()
        .is_some_and(|pic| !(pic.starts_with("http://") || pic.starts_with("https://")))
    {
        return Err(AppError::validation("profile_pic must be an image URL"));
    }

    let updated = state
        .store
        .users
        .update_profile(user.id, req)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok((StatusCode::OK, success_to_api_response(updated)))
}
