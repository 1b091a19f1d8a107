//! Certificate material loading
//!
//! This module reads PEM trust anchors and client key pairs from disk. It
//! makes no decisions; failures always carry the offending path and tell
//! apart an unreadable file from an unparsable one.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::ssl::SslContextBuilder;
use openssl::x509::{X509, X509NameRef, X509Ref};

/// Failure to load a CA or client certificate file
#[derive(Debug, thiserror::Error)]
pub enum CertificateLoadError {
    /// File missing or unreadable
    #[error("cannot load cert '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File readable but not valid PEM material
    #[error("cannot process cert '{}': {reason}", path.display())]
    Format { path: PathBuf, reason: String },
}

impl CertificateLoadError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        CertificateLoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn format(path: &Path, reason: impl Into<String>) -> Self {
        CertificateLoadError::Format {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// The file that could not be loaded
    pub fn path(&self) -> &Path {
        match self {
            CertificateLoadError::Io { path, .. } | CertificateLoadError::Format { path, .. } => path,
        }
    }

    /// True when the file could not be read at all
    pub fn is_io(&self) -> bool {
        matches!(self, CertificateLoadError::Io { .. })
    }
}

/// Set of trusted certificate authorities
///
/// An empty pool means "use the platform default trust store".
#[derive(Clone, Default)]
pub struct TrustPool {
    certs: Vec<X509>,
}

impl TrustPool {
    /// The platform-default marker
    pub fn system_default() -> Self {
        Self::default()
    }

    pub fn is_system_default(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn certificates(&self) -> &[X509] {
        &self.certs
    }

    /// Subject/issuer summary of every anchor, for audit output
    pub fn describe(&self) -> Vec<CertInfo> {
        self.certs.iter().map(|c| CertInfo::from_x509_ref(c)).collect()
    }
}

impl fmt::Debug for TrustPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.certs.is_empty() {
            return f.write_str("TrustPool(system)");
        }
        f.debug_list().entries(self.describe()).finish()
    }
}

/// Load every certificate from the given PEM files into one pool
///
/// Each file must hold at least one certificate. The first failure aborts the
/// whole load; no partial pool is ever returned.
pub fn load_cert_pool<P: AsRef<Path>>(paths: &[P]) -> Result<TrustPool, CertificateLoadError> {
    let mut certs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let loaded = read_certificates(path)?;
        tracing::debug!(
            target: "connopts::tls",
            path = %path.display(),
            count = loaded.len(),
            "loaded CA certificates"
        );
        certs.extend(loaded);
    }
    Ok(TrustPool { certs })
}

fn read_certificates(path: &Path) -> Result<Vec<X509>, CertificateLoadError> {
    let pem = fs::read(path).map_err(|e| CertificateLoadError::io(path, e))?;
    let certs = X509::stack_from_pem(&pem).map_err(|e| {
        CertificateLoadError::format(path, format!("must be a PEM encoded certificate ({})", e))
    })?;
    if certs.is_empty() {
        return Err(CertificateLoadError::format(
            path,
            "must be a PEM encoded certificate",
        ));
    }
    Ok(certs)
}

/// Client certificate chain and matching private key
pub struct ClientIdentity {
    chain: Vec<X509>,
    key: PKey<Private>,
}

impl ClientIdentity {
    /// Leaf certificate presented to the peer
    pub fn certificate(&self) -> &X509Ref {
        // load_key_pair guarantees a non-empty chain
        &self.chain[0]
    }

    /// Intermediates following the leaf
    pub fn intermediates(&self) -> &[X509] {
        &self.chain[1..]
    }

    pub fn private_key(&self) -> &PKey<Private> {
        &self.key
    }

    /// Install this identity into an OpenSSL context
    ///
    /// The context only sends it in reply to a certificate request.
    pub fn install(&self, ctx: &mut SslContextBuilder) -> Result<(), openssl::error::ErrorStack> {
        ctx.set_certificate(self.certificate())?;
        for cert in self.intermediates() {
            ctx.add_extra_chain_cert(cert.clone())?;
        }
        ctx.set_private_key(&self.key)?;
        ctx.check_private_key()
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("certificate", &CertInfo::from_x509_ref(self.certificate()))
            .field("intermediates", &self.intermediates().len())
            .finish_non_exhaustive()
    }
}

/// Load a client certificate chain and its private key
///
/// The key must match the leaf certificate's public key.
pub fn load_key_pair<C, K>(cert_path: C, key_path: K) -> Result<ClientIdentity, CertificateLoadError>
where
    C: AsRef<Path>,
    K: AsRef<Path>,
{
    let cert_path = cert_path.as_ref();
    let key_path = key_path.as_ref();

    let chain = read_certificates(cert_path)?;

    let key_pem = fs::read(key_path).map_err(|e| CertificateLoadError::io(key_path, e))?;
    let key = PKey::private_key_from_pem(&key_pem).map_err(|e| {
        CertificateLoadError::format(key_path, format!("must be a PEM encoded private key ({})", e))
    })?;

    let public = chain[0].public_key().map_err(|e| {
        CertificateLoadError::format(cert_path, format!("unreadable public key ({})", e))
    })?;
    if !public.public_eq(&key) {
        return Err(CertificateLoadError::format(
            key_path,
            format!(
                "private key does not match certificate '{}'",
                cert_path.display()
            ),
        ));
    }

    tracing::debug!(
        target: "connopts::tls",
        cert = %cert_path.display(),
        key = %key_path.display(),
        "loaded client key pair"
    );
    Ok(ClientIdentity { chain, key })
}

/// Certificate information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertInfo {
    /// Certificate subject (Common Name)
    pub subject: String,
    /// Certificate issuer (Common Name)
    pub issuer: String,
}

impl CertInfo {
    pub fn from_x509_ref(cert: &X509Ref) -> Self {
        CertInfo {
            subject: common_name(cert.subject_name()),
            issuer: common_name(cert.issuer_name()),
        }
    }
}

fn common_name(name: &X509NameRef) -> String {
    name.entries_by_nid(Nid::COMMONNAME)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "<undef>".to_string())
}
