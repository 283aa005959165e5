pub mod auth_service;
pub mod order_service;
pub mod user_service;

pub use auth_service::{AuthConfig, AuthService};
pub use order_service::{OrderService, Resolution};
pub use user_service::UserService;
