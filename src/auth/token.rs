use crate::error::AppError;
use crate::models::{Role, User};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i64,
    /// Username shown in the page footer.
    pub username: String,
    pub role: Role,
    /// Identifies the login this token was issued for.
    pub sid: Uuid,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

/// Issues a signed session token for `user`, valid for `ttl`.
///
/// # Returns
/// The encoded JWT, or `AppError::InternalServerError` if the expiry overflows or
/// encoding fails.
pub fn generate_token(user: &User, secret: &str, ttl: chrono::Duration) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role,
        sid: Uuid::new_v4(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a session token and decodes its claims.
///
/// Returns `AppError::Unauthorized` if the token is malformed, its signature does not match
/// `secret`, or it has expired.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn staffer() -> User {
        User {
            id: 1,
            username: "staffer".into(),
            email: "staffer@example.com".into(),
            password_hash: String::new(),
            role: Role::Administrator,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        let token = generate_token(&staffer(), "test_secret", chrono::Duration::hours(24)).unwrap();
        let claims = verify_token(&token, "test_secret").unwrap();
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.username, "staffer");
        assert_eq!(claims.role, Role::Administrator);
    }

    #[test]
    fn test_each_login_gets_its_own_session_id() {
        let first = generate_token(&staffer(), "test_secret", chrono::Duration::hours(1)).unwrap();
        let second = generate_token(&staffer(), "test_secret", chrono::Duration::hours(1)).unwrap();
        let first = verify_token(&first, "test_secret").unwrap();
        let second = verify_token(&second, "test_secret").unwrap();
        assert_eq!(first.sub, second.sub);
        assert_ne!(first.sid, second.sid);
    }

    #[test]
    fn test_token_expiration() {
        let expired = Claims {
            sub: 2,
            username: "user1".into(),
            role: Role::Member,
            sid: Uuid::nil(),
            exp: (Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        let expired_token = encode(
            &Header::default(),
            &expired,
            &EncodingKey::from_secret("test_secret".as_bytes()),
        )
        .unwrap();

        match verify_token(&expired_token, "test_secret") {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("ExpiredSignature")),
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = generate_token(&staffer(), "one_secret", chrono::Duration::hours(1)).unwrap();
        match verify_token(&token, "a_completely_different_secret") {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("InvalidSignature")),
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }
}
