use crate::{ServiceError, ServiceResult};

/// bcrypt only looks at the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashConfig {
    pub cost: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Hashes and verifies player passwords.
///
/// Both paths truncate the password to [`MAX_PASSWORD_BYTES`] before handing it
/// to bcrypt, so a password longer than the limit verifies against its own hash
/// no matter how the underlying library treats oversized input.
#[derive(Debug, Clone, Copy)]
pub struct CredentialManager {
    config: HashConfig,
}

impl CredentialManager {
    pub fn new(config: HashConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> HashConfig {
        self.config
    }

    pub fn hash(&self, password: &str) -> ServiceResult<String> {
        bcrypt::hash(truncate_password(password), self.config.cost)
            .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))
    }

    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(truncate_password(password), hash) {
            Ok(valid) => valid,
            Err(e) => {
                log::error!("Stored password hash is unreadable: {}", e);
                false
            }
        }
    }
}

fn truncate_password(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}
