mod handler;
mod model;

pub use handler::{check_auth, login, logout, signup, update_profile};
pub use model::{AuthResponse, LoginRequest, SignupRequest, UpdateProfileRequest};
