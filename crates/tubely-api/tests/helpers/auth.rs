use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tubely_api::auth::JwtClaims;
use uuid::Uuid;

/// Test JWT secret (must match the config built in setup_test_app).
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters";

pub const TEST_ISSUER: &str = "tubely-access";

/// Signed bearer token for `user_id`, valid for an hour.
pub fn make_token(user_id: Uuid) -> String {
    make_token_with(user_id, TEST_JWT_SECRET, TEST_ISSUER)
}

pub fn make_token_with(user_id: Uuid, secret: &str, issuer: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id.to_string(),
        iss: issuer.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
