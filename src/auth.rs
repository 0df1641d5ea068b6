use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

// Salted password digest, stored as "salt$hexdigest"
pub fn hash_password(password: &str) -> String {
    let salt = format!("{:032x}", rand::random::<u128>());
    format!("{}${}", salt, digest(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, hash)) => digest(salt, password) == hash,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

// Opaque session token, 64 hex chars
pub fn generate_token() -> String {
    format!(
        "{:032x}{:032x}",
        rand::random::<u128>(),
        rand::random::<u128>()
    )
}

// Client address for rate limit keys, taken from proxy headers
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized("Authentication required"))
}

// Resolve the bearer token to its user
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = bearer_token(headers)?;

    let user_id = state
        .store
        .sessions
        .get(token)
        .map(|id| *id)
        .ok_or(ApiError::Unauthorized("Invalid or expired token"))?;

    state
        .store
        .users
        .get(&user_id)
        .map(|u| u.value().clone())
        .ok_or(ApiError::Unauthorized("Invalid or expired token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let stored = hash_password("correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &stored));
        assert!(!verify_password("wrong password", &stored));
    }

    #[test]
    fn same_password_hashes_differently() {
        // fresh salt per hash
        assert_ne!(hash_password("secret123"), hash_password("secret123"));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("anything", "no-dollar-separator"));
    }

    #[test]
    fn tokens_are_unique_and_fixed_length() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
