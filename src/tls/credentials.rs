//! Transport credentials
//!
//! [`TransportCredentials`] is what the TLS builder hands to the channel
//! constructor. It owns the resolved posture and can turn it into an OpenSSL
//! connector for transports built on the `openssl` crate.

use std::fmt;
use std::sync::Arc;

use openssl::ssl::{SslConnector, SslConnectorBuilder, SslMethod, SslVerifyMode};
use openssl::x509::store::X509StoreBuilder;

use super::cert::ClientIdentity;
use super::config::{SecuredPosture, TlsError, TLS_TARGET_PREFIX};

/// TLS credentials for one channel
#[derive(Debug, Clone)]
pub struct TransportCredentials {
    posture: SecuredPosture,
}

impl TransportCredentials {
    pub fn new(posture: SecuredPosture) -> Self {
        TransportCredentials { posture }
    }

    pub fn posture(&self) -> &SecuredPosture {
        &self.posture
    }

    /// Name to send as SNI and verify the peer certificate against
    ///
    /// The configured override wins; otherwise the host part of the target
    /// (without the `tls://` prefix and port).
    pub fn server_name<'a>(&'a self, target: &'a str) -> &'a str {
        if let Some(name) = self.posture.server_name_override() {
            return name;
        }
        let target = target.strip_prefix(TLS_TARGET_PREFIX).unwrap_or(target);
        host_of(target)
    }

    /// Identity to present when the peer sends a certificate request
    ///
    /// Fails with [`TlsError::IdentityNotProvided`] when no client key pair
    /// was configured.
    pub fn client_identity(&self) -> Result<Arc<ClientIdentity>, TlsError> {
        self.posture.client_identity().provide()
    }

    /// Build an OpenSSL connector with the posture's trust and verification
    /// settings
    ///
    /// A configured client identity is loaded into the context. OpenSSL only
    /// sends it when the server asks for a certificate, so the same connector
    /// serves one-way and mutual TLS peers.
    pub fn connector(&self) -> Result<SslConnector, TlsError> {
        let mut builder = self.connector_builder()?;
        let provider = self.posture.client_identity();
        if provider.is_configured() {
            provider.provide()?.install(&mut builder)?;
        }
        Ok(builder.build())
    }

    /// Build an OpenSSL connector that always presents the client identity
    ///
    /// Fails with [`TlsError::IdentityNotProvided`] when no key pair was
    /// configured, before any connection is attempted.
    pub fn mutual_connector(&self) -> Result<SslConnector, TlsError> {
        let identity = self.client_identity()?;
        let mut builder = self.connector_builder()?;
        identity.install(&mut builder)?;
        Ok(builder.build())
    }

    fn connector_builder(&self) -> Result<SslConnectorBuilder, TlsError> {
        let mut builder = SslConnector::builder(SslMethod::tls_client())?;

        let roots = self.posture.trust_roots();
        if !roots.is_system_default() {
            let mut store = X509StoreBuilder::new()?;
            for cert in roots.certificates() {
                store.add_cert(cert.clone())?;
            }
            builder.set_cert_store(store.build());
        }

        if self.posture.allow_insecure_verify() {
            builder.set_verify(SslVerifyMode::NONE);
        } else {
            builder.set_verify(SslVerifyMode::PEER);
        }

        Ok(builder)
    }
}

impl fmt::Display for TransportCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.posture, f)
    }
}

fn host_of(target: &str) -> &str {
    // [v6]:port
    if let Some(rest) = target.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return &rest[..end];
        }
    }
    match target.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            host
        }
        _ => target,
    }
}
