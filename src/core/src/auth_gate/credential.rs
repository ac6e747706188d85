use std::fmt;

use subtle::ConstantTimeEq;

use crate::error_handling::types::ConfigError;

/// Decides whether a presented credential grants access.
pub trait CredentialVerifier: Send + Sync {
    /// Returns `true` when `presented` is an acceptable credential.
    fn verify(&self, presented: &str) -> bool;
}

/// A single static secret fixed at process start.
pub struct StaticSecret {
    secret: String,
}

impl StaticSecret {
    /// Wraps `secret`. An empty secret would let an empty credential through,
    /// so it is refused.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "secret key must not be empty".to_string(),
            ));
        }
        Ok(Self { secret })
    }
}

impl CredentialVerifier for StaticSecret {
    fn verify(&self, presented: &str) -> bool {
        // ct_eq on slices of different length returns false without
        // comparing contents; only the length leaks.
        self.secret.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl fmt::Debug for StaticSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecret")
            .field("secret", &"<redacted>")
            .finish()
    }
}
