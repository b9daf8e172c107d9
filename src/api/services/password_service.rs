//! Password hashing with bcrypt.

use super::jwt_service::AuthError;

/// Hashes and verifies user passwords.
///
/// bcrypt is deliberately slow; async callers should run these methods on the
/// blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific work factor (4..=31).
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Verify plain password against hashed password. A malformed hash never
    /// verifies.
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        bcrypt::verify(password, hashed_password).unwrap_or(false)
    }

    /// Stand-in for [`verify`](Self::verify) when the account does not exist.
    /// Does the same bcrypt work so the response time does not reveal whether
    /// a username is registered. Always `false`.
    pub fn verify_missing_user(&self, password: &str) -> bool {
        if let Err(e) = bcrypt::hash(password, self.cost) {
            tracing::debug!("Decoy hash failed: {}", e);
        }
        false
    }
}
