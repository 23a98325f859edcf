use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Decodes and validates an access token. Refresh tokens are rejected.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("not an access token".to_string());
    }
    Ok(claims)
}

#[cfg(test)]
pub fn issue_token(
    user_id: u64,
    role: u8,
    employee_id: Option<u64>,
    token_type: TokenType,
    secret: &str,
) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        user_id,
        sub: format!("user-{user_id}"),
        role,
        exp: now + 900,
        jti: format!("test-{user_id}-{now}"),
        token_type,
        employee_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
