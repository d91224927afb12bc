// Services module for the users API
// Business logic layer for the application

pub mod jwt;
pub mod user;

// Re-export commonly used services
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use user::UserService;
