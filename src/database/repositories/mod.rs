mod collection;
mod message;
mod user;

pub use collection::PgCollection;
pub use message::PgMessageRepository;
pub use user::PgUserRepository;

/// PostgreSQL 唯一约束冲突错误码
const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}
