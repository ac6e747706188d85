use std::sync::Arc;

use log::warn;

use super::credential::{CredentialVerifier, StaticSecret};
use crate::error_handling::types::{ConfigError, HandoffError};

/// Stateless gate consulted by every handler before it touches shared state.
///
/// Two failure causes are kept apart: nothing presented
/// ([`HandoffError::AuthMissing`]) and a wrong value
/// ([`HandoffError::AuthInvalid`]). Both deny access the same way.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Builds a gate around a single static secret.
    pub fn with_secret(secret: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(StaticSecret::new(secret)?)))
    }

    /// Checks `presented`, reporting missing and wrong credentials separately.
    pub fn authenticate(&self, presented: Option<&str>) -> Result<(), HandoffError> {
        match presented {
            None | Some("") => {
                warn!("Rejected request without a key");
                Err(HandoffError::AuthMissing)
            }
            Some(key) if self.verifier.verify(key) => Ok(()),
            Some(_) => {
                warn!("Rejected request with an invalid key");
                Err(HandoffError::AuthInvalid)
            }
        }
    }

    /// Same check as [`AuthGate::authenticate`] but a missing credential is
    /// reported as invalid.
    pub fn authenticate_opaque(&self, presented: Option<&str>) -> Result<(), HandoffError> {
        self.authenticate(presented).map_err(|e| match e {
            HandoffError::AuthMissing => HandoffError::AuthInvalid,
            other => other,
        })
    }

    pub fn is_authorized(&self, presented: Option<&str>) -> bool {
        self.authenticate(presented).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AcceptAll;

    impl CredentialVerifier for AcceptAll {
        fn verify(&self, _presented: &str) -> bool {
            true
        }
    }

    fn gate() -> AuthGate {
        AuthGate::with_secret("letmein").unwrap()
    }

    #[test]
    fn test_authenticate_valid_key() {
        assert_eq!(gate().authenticate(Some("letmein")), Ok(()));
        assert!(gate().is_authorized(Some("letmein")));
    }

    #[test]
    fn test_authenticate_missing_key() {
        assert_eq!(gate().authenticate(None), Err(HandoffError::AuthMissing));
        assert_eq!(gate().authenticate(Some("")), Err(HandoffError::AuthMissing));
        assert!(!gate().is_authorized(None));
    }

    #[test]
    fn test_authenticate_invalid_key() {
        assert_eq!(
            gate().authenticate(Some("nope")),
            Err(HandoffError::AuthInvalid)
        );
    }

    #[test]
    fn test_opaque_collapses_missing_into_invalid() {
        assert_eq!(
            gate().authenticate_opaque(None),
            Err(HandoffError::AuthInvalid)
        );
        assert_eq!(gate().authenticate_opaque(Some("letmein")), Ok(()));
    }

    #[test]
    fn test_custom_verifier_is_used() {
        let gate = AuthGate::new(Arc::new(AcceptAll));
        assert!(gate.is_authorized(Some("anything")));
        // Absence is decided by the gate, not the verifier.
        assert_eq!(gate.authenticate(None), Err(HandoffError::AuthMissing));
    }
}
