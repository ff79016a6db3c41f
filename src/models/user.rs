use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Alumni,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Alumni => "alumni",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "alumni" => Ok(Role::Alumni),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub batch: Option<i32>,
    pub cur_role: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub profile_pic: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            full_name: self.full_name.clone(),
            profile_pic: self.profile_pic.clone(),
            batch: self.batch,
        }
    }
}

/// 列表中展示的发布者信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub profile_pic: Option<String>,
    pub batch: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub batch: Option<i32>,
    pub cur_role: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    // 兼容前端的驼峰字段名
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    pub batch: Option<i32>,
    #[serde(alias = "curRole")]
    pub cur_role: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "profilePic")]
    pub profile_pic: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if self.batch.is_some() {
            user.batch = self.batch;
        }
        if self.cur_role.is_some() {
            user.cur_role = self.cur_role;
        }
        if self.company.is_some() {
            user.company = self.company;
        }
        if self.location.is_some() {
            user.location = self.location;
        }
        if self.profile_pic.is_some() {
            user.profile_pic = self.profile_pic;
        }
    }
}

/// 邮箱统一小写并去除首尾空白后作为唯一键
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 去除首尾空白并将首字母大写
pub fn normalize_full_name(name: &str) -> String {
    let name = name.trim();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
