pub mod auth;
pub mod club;
pub(crate) mod document;
pub mod event;
pub mod message;
pub mod opportunity;
pub mod user;
