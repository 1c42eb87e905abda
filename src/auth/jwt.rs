use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::Claims;

pub fn validate_jwt(token: &str, secret: &str, expected_issuer: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[expected_issuer]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| format!("JWT validation failed: {}", e))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err("Missing subject in JWT".to_string());
    }

    Ok(token_data.claims)
}

/// Sign a token for `uid`. Sign-in itself lives outside this service; this
/// is for local tooling and tests.
pub fn issue_jwt(uid: &str, secret: &str, issuer: &str, ttl: Duration) -> Result<String, String> {
    let now = Utc::now();
    let claims = Claims {
        sub: uid.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        iss: issuer.to_string(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| format!("Failed to sign JWT: {}", e))
}
