//! TLS posture resolution
//!
//! This module decides whether a connection is plaintext or TLS protected and
//! assembles the trust roots and client identity provider for the secured
//! case.
//!
//! TLS is required when either the `tls` flag is set or the target address
//! starts with [`TLS_TARGET_PREFIX`]. The prefix wins over an explicit
//! `tls = false`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::cert::{self, CertificateLoadError, TrustPool};
use super::identity::{CapturedIdentity, ClientIdentityProvider};
use crate::config::{keys, ConfigError, ConfigView};

/// Address prefix that implies TLS
pub const TLS_TARGET_PREFIX: &str = "tls://";

/// TLS errors
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    CertificateLoad(#[from] CertificateLoadError),

    #[error("mTLS client certificate requested, but not provided (set {} and {})",
        keys::TLS_CLIENT_CERT_FILE, keys::TLS_CLIENT_KEY_FILE)]
    IdentityNotProvided,

    #[error("OpenSSL error: {0}")]
    OpenSsl(#[from] openssl::error::ErrorStack),
}

/// TLS inputs read from a configuration view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSettings {
    pub server: String,
    pub tls: bool,
    pub allow_insecure: bool,
    pub server_name: Option<String>,
    pub ca_cert_files: Vec<PathBuf>,
    pub client_cert_file: Option<PathBuf>,
    pub client_key_file: Option<PathBuf>,
}

impl TlsSettings {
    /// Read the TLS keys, applying defaults for absent ones
    pub fn from_config(config: &ConfigView) -> Result<Self, ConfigError> {
        Ok(TlsSettings {
            server: config.get_string(keys::SERVER)?,
            tls: config.get_bool(keys::TLS)?,
            allow_insecure: config.get_bool(keys::TLS_ALLOW_INSECURE)?,
            server_name: config.get_opt_string(keys::TLS_SERVER_NAME)?,
            ca_cert_files: config
                .get_string_list(keys::TLS_CA_CERT_FILES)?
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            client_cert_file: config.get_opt_string(keys::TLS_CLIENT_CERT_FILE)?.map(PathBuf::from),
            client_key_file: config.get_opt_string(keys::TLS_CLIENT_KEY_FILE)?.map(PathBuf::from),
        })
    }

    /// Whether these settings call for TLS
    pub fn requires_tls(&self) -> bool {
        self.tls || self.server.starts_with(TLS_TARGET_PREFIX)
    }
}

/// Parameters of a TLS-protected connection
#[derive(Debug, Clone)]
pub struct SecuredPosture {
    trust_roots: TrustPool,
    server_name_override: Option<String>,
    allow_insecure_verify: bool,
    client_identity: Arc<dyn ClientIdentityProvider>,
}

impl SecuredPosture {
    /// Trust anchors; empty means the platform default store
    pub fn trust_roots(&self) -> &TrustPool {
        &self.trust_roots
    }

    pub fn server_name_override(&self) -> Option<&str> {
        self.server_name_override.as_deref()
    }

    /// Peer certificate verification is disabled
    pub fn allow_insecure_verify(&self) -> bool {
        self.allow_insecure_verify
    }

    /// Provider the transport asks when the peer requests a client certificate
    pub fn client_identity(&self) -> &Arc<dyn ClientIdentityProvider> {
        &self.client_identity
    }
}

impl fmt::Display for SecuredPosture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tls roots=")?;
        if self.trust_roots.is_system_default() {
            write!(f, "system")?;
        } else {
            write!(f, "custom({})", self.trust_roots.len())?;
        }
        if self.allow_insecure_verify {
            write!(f, " verify=INSECURE-SKIPPED")?;
        } else {
            write!(f, " verify=on")?;
        }
        match &self.server_name_override {
            Some(name) => write!(f, " server-name=OVERRIDE({})", name)?,
            None => write!(f, " server-name=target")?,
        }
        if self.client_identity.is_configured() {
            write!(f, " client-identity=configured")
        } else {
            write!(f, " client-identity=none")
        }
    }
}

/// Resolved transport-security mode
#[derive(Debug, Clone)]
pub enum TlsPosture {
    Plaintext,
    Secured(SecuredPosture),
}

impl TlsPosture {
    pub fn is_secured(&self) -> bool {
        matches!(self, TlsPosture::Secured(_))
    }
}

impl fmt::Display for TlsPosture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsPosture::Plaintext => f.write_str("plaintext"),
            TlsPosture::Secured(secured) => fmt::Display::fmt(secured, f),
        }
    }
}

/// Resolve the posture for a configuration view
pub fn resolve_posture(config: &ConfigView) -> Result<TlsPosture, TlsError> {
    resolve(&TlsSettings::from_config(config)?)
}

/// Resolve the posture for already-read settings
///
/// Plaintext resolution never touches the filesystem.
pub fn resolve(settings: &TlsSettings) -> Result<TlsPosture, TlsError> {
    if !settings.requires_tls() {
        tracing::info!(target: "connopts::tls", server = %settings.server, "using plaintext transport");
        return Ok(TlsPosture::Plaintext);
    }

    let trust_roots = cert::load_cert_pool(settings.ca_cert_files.as_slice())?;

    let client_identity = match (&settings.client_cert_file, &settings.client_key_file) {
        (Some(cert_file), Some(key_file)) => {
            CapturedIdentity::new(cert::load_key_pair(cert_file, key_file)?)
        }
        (cert_file, key_file) => {
            if cert_file.is_some() || key_file.is_some() {
                tracing::warn!(
                    target: "connopts::tls",
                    "only one of {} and {} is set; no client certificate will be offered",
                    keys::TLS_CLIENT_CERT_FILE,
                    keys::TLS_CLIENT_KEY_FILE
                );
            }
            CapturedIdentity::none()
        }
    };

    let posture = SecuredPosture {
        trust_roots,
        server_name_override: settings.server_name.clone(),
        allow_insecure_verify: settings.allow_insecure,
        client_identity: Arc::new(client_identity),
    };

    if posture.allow_insecure_verify {
        tracing::warn!(
            target: "connopts::tls",
            key = keys::TLS_ALLOW_INSECURE,
            "peer certificate verification is DISABLED"
        );
    }
    if let Some(name) = &posture.server_name_override {
        tracing::warn!(
            target: "connopts::tls",
            key = keys::TLS_SERVER_NAME,
            server_name = %name,
            "server name overridden for verification"
        );
    }
    tracing::info!(target: "connopts::tls", server = %settings.server, posture = %posture, "using TLS transport");

    Ok(TlsPosture::Secured(posture))
}
