//! TLS transport security
//!
//! This module resolves the transport-security posture for an outbound
//! connection and contributes the single security-governing option to the
//! pipeline.
//!
//! # Architecture
//!
//! 1. `TlsSettings` reads the TLS keys from a [`ConfigView`]
//! 2. `resolve` picks plaintext or TLS and loads certificate material
//! 3. `TransportCredentials` wraps the secured posture for the channel
//! 4. The transport asks the `ClientIdentityProvider` for a client
//!    certificate only when the peer requests one
//!
//! # Examples
//!
//! ```no_run
//! use connopts::config::{keys, ConfigView};
//! use connopts::options::{ConnectionOption, OptionRegistry};
//!
//! let mut registry = OptionRegistry::new();
//! connopts::tls::register(&mut registry);
//!
//! let config = ConfigView::new()
//!     .with(keys::SERVER, "tls://relay.example.com:4245")
//!     .with(keys::TLS_CA_CERT_FILES, vec!["/etc/relay/ca.pem"]);
//!
//! let options = registry.run(&config).unwrap();
//! if let ConnectionOption::TransportCredentials(creds) = &options[0] {
//!     let connector = creds.connector().unwrap();
//!     let sni = creds.server_name("tls://relay.example.com:4245");
//!     let _ = (connector, sni);
//! }
//! ```

pub mod cert;
pub mod config;
pub mod credentials;
pub mod identity;

pub use cert::{load_cert_pool, load_key_pair, CertInfo, CertificateLoadError, ClientIdentity, TrustPool};
pub use config::{
    resolve, resolve_posture, SecuredPosture, TlsError, TlsPosture, TlsSettings, TLS_TARGET_PREFIX,
};
pub use credentials::TransportCredentials;
pub use identity::{CapturedIdentity, ClientIdentityProvider};

use crate::config::ConfigView;
use crate::options::{self, ConnectionOption, OptionRegistry};

/// Result type for TLS operations
pub type Result<T> = std::result::Result<T, TlsError>;

/// Builder contributing the transport-security option
///
/// Always contributes exactly one option: `Insecure` for plaintext,
/// `TransportCredentials` otherwise.
pub fn tls_option(config: &ConfigView) -> options::Result<Option<ConnectionOption>> {
    let option = match resolve_posture(config)? {
        TlsPosture::Plaintext => ConnectionOption::Insecure,
        TlsPosture::Secured(posture) => {
            ConnectionOption::TransportCredentials(TransportCredentials::new(posture))
        }
    };
    Ok(Some(option))
}

/// Register the TLS builder
pub fn register(registry: &mut OptionRegistry) {
    registry.register_fn("tls", tls_option);
}

// Same certificate minting the integration tests and benches use
#[cfg(test)]
#[path = "../../tests/common/mod.rs"]
pub(crate) mod fixtures;
