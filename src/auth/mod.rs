pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::Deserialize;
use validator::Validate;

pub use extractors::AuthenticatedUser;
pub use middleware::{AuthMiddleware, AUTH_COOKIE};
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Fields posted by the login form.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            username: "staffer".to_string(),
            password: "staffer".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let missing_username = LoginRequest {
            username: String::new(),
            password: "staffer".to_string(),
        };
        assert!(missing_username.validate().is_err());

        let missing_password = LoginRequest {
            username: "user1".to_string(),
            password: String::new(),
        };
        assert!(missing_password.validate().is_err());
    }
}
