//! Password policy and bcrypt hashing.

use thiserror::Error;

use pharmastock_core::{DomainError, DomainResult};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 4;

/// bcrypt work factor used when none is configured.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// A bcrypt hash as persisted in the `password_hash` column.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash read back from storage.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Check a new password and its confirmation.
pub fn validate_new_password(password: &str, confirmation: &str) -> DomainResult<()> {
    let password = password.trim();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must have at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirmation.trim() {
        return Err(DomainError::validation("passwords do not match"));
    }
    Ok(())
}

pub fn hash_password(password: &str, cost: u32) -> Result<PasswordHash, PasswordError> {
    let hash = bcrypt::hash(password.trim(), cost)?;
    Ok(PasswordHash(hash))
}

/// Verify a password against a stored hash.
///
/// A stored value that is not a bcrypt hash never verifies.
pub fn verify_password(password: &str, hash: &PasswordHash) -> bool {
    match bcrypt::verify(password.trim(), hash.as_str()) {
        Ok(ok) => ok,
        Err(err) => {
            tracing::warn!("stored password hash is not valid bcrypt: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn policy_requires_length_and_matching_confirmation() {
        assert!(validate_new_password("abcd", "abcd").is_ok());
        assert!(validate_new_password("abc", "abc").is_err());
        let err = validate_new_password("abcd", "abce").unwrap_err();
        assert_eq!(err, DomainError::validation("passwords do not match"));
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("s3creto", TEST_COST).unwrap();
        assert!(hash.as_str().starts_with("$2"));
        assert!(verify_password("s3creto", &hash));
        assert!(!verify_password("otro", &hash));
    }

    #[test]
    fn non_bcrypt_values_never_verify() {
        let legacy = PasswordHash::from_stored("restaurada123");
        assert!(!verify_password("restaurada123", &legacy));
    }

    #[test]
    fn debug_output_hides_the_hash() {
        let hash = hash_password("s3creto", TEST_COST).unwrap();
        assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
    }
}
