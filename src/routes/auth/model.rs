use serde::{Deserialize, Serialize};

use crate::models::{ProfileUpdate, User};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub batch: Option<i32>,
    #[serde(alias = "curRole")]
    pub cur_role: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {}

pub type UpdateProfileRequest = ProfileUpdate;

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
