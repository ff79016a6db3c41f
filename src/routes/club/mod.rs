mod handler;

pub use handler::{create_club, delete_club, get_club, list_clubs, update_club};
