pub mod auth_service;
pub mod config;
pub mod keys;
pub mod rate_limiter;
pub mod token_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service::{AuthService, LoginResponse};
pub use config::TokenConfig;
pub use rate_limiter::{RateLimitDecision, RateLimiter};
pub use token_service::TokenService;
pub use user_service::UserService;
