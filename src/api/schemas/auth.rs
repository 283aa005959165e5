use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 2, max = 50, message = "login must be between 2 and 50 characters"))]
    pub login: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionMessage {
    pub message: &'static str,
}
