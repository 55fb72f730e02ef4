//! Session tokens and input validation primitives
//!
//! Tokens are HS256 JWTs signed with the configured secret. The subject is
//! the user id; the phone travels alongside so the auth middleware can
//! re-resolve the user on every request.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::error::{AppError, Result};

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub phone: String,
    pub iat: i64,
    pub exp: i64,
}

/// Why an incoming token was rejected
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

/// Mint a session token for a verified user
pub fn create_session_token(user_id: i64, phone: &str) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::days(CONFIG.auth.token_validity_days);

    let claims = Claims {
        sub: user_id.to_string(),
        phone: phone.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    let key = EncodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Decode and validate a session token
pub fn decode_session_token(token: &str) -> std::result::Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes());

    decode::<Claims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}

/// Generate a uniformly-random 6-digit OTP code
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// Validate an Indian mobile number: "+91" then 10 digits, first of them 6-9
pub fn validate_phone_number(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix("+91") else {
        return false;
    };
    if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    matches!(digits.as_bytes()[0], b'6'..=b'9')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            let value: u32 = otp.parse().unwrap();
            assert!((100_000..1_000_000).contains(&value));
        }
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("+919876543210"));
        assert!(validate_phone_number("+916000000000"));
        assert!(!validate_phone_number("9876543210"));
        assert!(!validate_phone_number("+915876543210"));
        assert!(!validate_phone_number("+91987654321"));
        assert!(!validate_phone_number("+9198765432100"));
        assert!(!validate_phone_number("+9198765A3210"));
        assert!(!validate_phone_number("+1-9876543210"));
    }

    #[test]
    fn test_token_round_trip() {
        let token = create_session_token(42, "+919876543210").unwrap();
        let claims = decode_session_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.phone, "+919876543210");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        assert_eq!(
            decode_session_token("not-a-token").unwrap_err(),
            TokenError::Invalid
        );
    }
}
