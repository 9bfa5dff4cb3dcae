use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's email, which is their identity key.
    pub sub: String,
    pub role: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::hours(ttl_hours),
        }
    }

    /// Generates a token for `email`.
    ///
    /// # Returns
    /// The encoded JWT, or `AppError::InternalServerError` if the expiry overflows or
    /// encoding fails.
    pub fn issue(&self, email: &str, role: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("token expiry overflow".into()))?;

        let claims = Claims {
            sub: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a JWT string and decodes its claims.
    ///
    /// Default validation checks are applied (signature, expiration).
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature is
    /// invalid, or it has expired.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation_and_verification() {
        let issuer = TokenIssuer::new("test_secret_for_gen_verify", 24);
        let token = issuer.issue("user@example.com", "user").unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expiration() {
        let issuer = TokenIssuer::new("test_secret_for_expiration", -2);
        let expired_token = issuer.issue("user@example.com", "user").unwrap();

        match issuer.verify(&expired_token) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("ExpiredSignature"), "{}", msg);
            }
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let signer = TokenIssuer::new("one_secret", 24);
        let verifier = TokenIssuer::new("a_completely_different_secret", 24);
        let token = signer.issue("user@example.com", "user").unwrap();

        match verifier.verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("InvalidSignature"), "{}", msg),
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token() {
        let issuer = TokenIssuer::new("secret", 24);
        assert!(matches!(
            issuer.verify("not-a-jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
