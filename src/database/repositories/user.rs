use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::is_unique_violation;
use crate::database::{DbError, DbResult, UserRepository};
use crate::models::{NewUser, ProfileUpdate, Role, User};

const USER_COLUMNS: &str = "id, full_name, email, password_hash, role, batch, cur_role, \
     company, location, profile_pic, last_login, created_at, updated_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    full_name: String,
    email: String,
    password_hash: String,
    role: String,
    batch: Option<i32>,
    cur_role: Option<String>,
    company: Option<String>,
    location: Option<String>,
    profile_pic: Option<String>,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(DbError::Corrupt)?;
        Ok(User {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            batch: row.batch,
            cur_role: row.cur_role,
            company: row.company,
            location: row.location,
            profile_pic: row.profile_pic,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> DbResult<Vec<User>> {
    rows.into_iter().map(User::try_from).collect()
}

/// 用户存储库实现
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> DbResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, role, batch, cur_role, company, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.batch)
            .bind(&user.cur_role)
            .bind(&user.company)
            .bind(&user.location)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => {
                tracing::info!("Created user: {}", row.email);
                row.try_into()
            }
            Err(e) if is_unique_violation(&e) => Err(DbError::Duplicate("email")),
            Err(e) => {
                tracing::error!("Failed to create user: {:?}", e);
                Err(e.into())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        into_users(rows)
    }

    async fn list_except(&self, id: Uuid) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id <> $1 ORDER BY full_name");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        into_users(rows)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> DbResult<Option<User>> {
        // COALESCE 保留未提供的字段
        let sql = format!(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                batch = COALESCE($3, batch),
                cur_role = COALESCE($4, cur_role),
                company = COALESCE($5, company),
                location = COALESCE($6, location),
                profile_pic = COALESCE($7, profile_pic),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(update.full_name)
            .bind(update.batch)
            .bind(update.cur_role)
            .bind(update.company)
            .bind(update.location)
            .bind(update.profile_pic)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn record_login(&self, id: Uuid) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> DbResult<()> {
        sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> DbResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
