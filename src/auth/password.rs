//! bcrypt password hashes.

use bcrypt::DEFAULT_COST;

use super::AuthError;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.is_empty() {
        return Err(AuthError::Hash("empty password".to_string()));
    }
    bcrypt::hash(password, DEFAULT_COST).map_err(|e| AuthError::Hash(e.to_string()))
}

/// `Ok(false)` on mismatch; an unreadable stored hash is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, stored).map_err(|e| AuthError::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_and_are_salted() {
        let first = hash_password("123456").unwrap();
        let second = hash_password("123456").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$2b$"));
        assert!(verify_password("123456", &first).unwrap());
        assert!(verify_password("123456", &second).unwrap());
        assert!(!verify_password("1234567", &first).unwrap());
    }

    #[test]
    fn unreadable_hashes_are_errors() {
        assert!(matches!(verify_password("123456", ""), Err(AuthError::Hash(_))));
        assert!(matches!(verify_password("123456", "sha256$1$00$00"), Err(AuthError::Hash(_))));
        assert!(hash_password("").is_err());
    }
}
