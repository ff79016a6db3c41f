mod handler;

pub use handler::{get_user, list_users};
