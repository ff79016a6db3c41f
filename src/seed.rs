//! 初始数据：管理员账号和默认社团

use crate::database::{DbError, Store};
use crate::models::{Club, NewUser, Resource, Role, User, normalize_email};
use crate::utils::hash_password;

const DEFAULT_CLUBS: &str = include_str!("../seeds/clubs.json");

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("invalid seed data: {0}")]
    Data(#[from] serde_json::Error),
    #[error("invalid club {0}: {1}")]
    InvalidClub(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    Created,
    Promoted,
}

/// 创建管理员；账号已存在时提升为管理员并重置密码
pub async fn seed_admin(
    store: &Store,
    email: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<(User, AdminOutcome), SeedError> {
    let email = normalize_email(email);
    let password_hash = hash_password(password, bcrypt_cost)?;

    if let Some(existing) = store.users.find_by_email(&email).await? {
        store.users.set_role(existing.id, Role::Admin).await?;
        store.users.set_password(existing.id, &password_hash).await?;
        let user = store
            .users
            .find_by_id(existing.id)
            .await?
            .unwrap_or(existing);
        return Ok((user, AdminOutcome::Promoted));
    }

    let user = store
        .users
        .create(NewUser {
            full_name: "Admin User".to_string(),
            email,
            password_hash,
            role: Role::Admin,
            batch: None,
            cur_role: Some("Administrator".to_string()),
            company: Some("Alumni Connect".to_string()),
            location: Some("Campus".to_string()),
        })
        .await?;
    Ok((user, AdminOutcome::Created))
}

pub fn default_clubs() -> Result<Vec<Club>, SeedError> {
    Ok(serde_json::from_str(DEFAULT_CLUBS)?)
}

/// 按名称补齐缺少的社团，返回新建的社团名
pub async fn seed_clubs(store: &Store, clubs: Vec<Club>) -> Result<Vec<String>, SeedError> {
    let existing: Vec<String> = store
        .clubs
        .list()
        .await?
        .into_iter()
        .map(|doc| doc.body.name)
        .collect();

    let mut created = Vec::new();
    for club in clubs {
        if existing.contains(&club.name) {
            tracing::info!("Club already exists: {}", club.name);
            continue;
        }
        club.validate()
            .map_err(|e| SeedError::InvalidClub(club.name.clone(), e))?;
        let doc = store.clubs.insert(club).await?;
        tracing::info!("Created club: {}", doc.body.name);
        created.push(doc.body.name);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clubs_are_valid() {
        let clubs = default_clubs().unwrap();
        assert_eq!(clubs.len(), 7);
        assert!(clubs.iter().all(|club| club.validate().is_ok()));
        assert!(clubs.iter().all(|club| !club.achievements.is_empty()));
    }

    #[tokio::test]
    async fn seeding_clubs_twice_skips_existing() {
        let store = Store::memory();
        let created = seed_clubs(&store, default_clubs().unwrap()).await.unwrap();
        assert_eq!(created.len(), 7);

        let created = seed_clubs(&store, default_clubs().unwrap()).await.unwrap();
        assert!(created.is_empty());
        assert_eq!(store.clubs.list().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn existing_user_is_promoted() {
        let store = Store::memory();
        let user = store
            .users
            .create(NewUser {
                full_name: "Ada".into(),
                email: "ada@example.com".into(),
                password_hash: hash_password("old-pass", 4).unwrap(),
                role: Role::Alumni,
                batch: Some(2019),
                cur_role: None,
                company: None,
                location: None,
            })
            .await
            .unwrap();

        let (admin, outcome) = seed_admin(&store, " Ada@Example.com ", "new-pass", 4)
            .await
            .unwrap();
        assert_eq!(outcome, AdminOutcome::Promoted);
        assert_eq!(admin.id, user.id);
        assert!(admin.is_admin());
        assert!(crate::utils::verify_password("new-pass", &admin.password_hash).unwrap());
    }

    #[tokio::test]
    async fn missing_admin_is_created() {
        let store = Store::memory();
        let (admin, outcome) = seed_admin(&store, "root@example.com", "secret1", 4)
            .await
            .unwrap();
        assert_eq!(outcome, AdminOutcome::Created);
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.full_name, "Admin User");
    }
}
