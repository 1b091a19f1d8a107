//! Deferred client identity
//!
//! A secured posture never holds a bare client certificate. It holds a
//! [`ClientIdentityProvider`] which the transport asks at handshake time, and
//! only when the peer actually requests a client certificate. Missing mTLS
//! material therefore only fails connections to peers that demand it.

use std::fmt;
use std::sync::Arc;

use super::cert::ClientIdentity;
use super::config::TlsError;

/// Supplies the client identity when a peer requests one
pub trait ClientIdentityProvider: fmt::Debug + Send + Sync {
    /// Return the identity to present, or fail with
    /// [`TlsError::IdentityNotProvided`]
    fn provide(&self) -> Result<Arc<ClientIdentity>, TlsError>;

    /// Whether an identity was configured at all
    fn is_configured(&self) -> bool;
}

/// Provider over an identity captured during posture resolution
#[derive(Debug, Clone, Default)]
pub struct CapturedIdentity {
    identity: Option<Arc<ClientIdentity>>,
}

impl CapturedIdentity {
    pub fn new(identity: ClientIdentity) -> Self {
        CapturedIdentity {
            identity: Some(Arc::new(identity)),
        }
    }

    /// Provider with no identity; every request fails
    pub fn none() -> Self {
        Self::default()
    }
}

impl ClientIdentityProvider for CapturedIdentity {
    fn provide(&self) -> Result<Arc<ClientIdentity>, TlsError> {
        match &self.identity {
            Some(identity) => Ok(Arc::clone(identity)),
            None => {
                tracing::warn!(
                    target: "connopts::tls",
                    "peer requested a client certificate but none is configured"
                );
                Err(TlsError::IdentityNotProvided)
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.identity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_provider_fails() {
        let provider = CapturedIdentity::none();
        assert!(!provider.is_configured());
        assert!(matches!(provider.provide(), Err(TlsError::IdentityNotProvided)));
    }

    #[test]
    fn test_empty_provider_fails_every_time() {
        let provider = CapturedIdentity::none();
        assert!(provider.provide().is_err());
        assert!(provider.provide().is_err());
    }

    #[test]
    fn test_error_message() {
        let err = CapturedIdentity::none().provide().unwrap_err();
        assert_eq!(
            err.to_string(),
            "mTLS client certificate requested, but not provided (set tls-client-cert-file and tls-client-key-file)"
        );
    }
}
