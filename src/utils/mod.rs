// Utility modules for the users API

pub mod api_error;
pub mod password;

pub use api_error::ApiError;
pub use password::{hash_password, verify_password, PasswordConfig, PasswordError};
