//! Connection option pipeline
//!
//! This module assembles the options an RPC channel is dialed with. Each
//! feature contributes through an [`OptionBuilder`] registered once at
//! startup; [`OptionRegistry::run`] runs them all against one
//! [`ConfigView`](crate::config::ConfigView) per connection attempt.
//!
//! # Architecture
//!
//! - `OptionBuilder` inspects the configuration and yields zero or one option
//! - `OptionRegistry` keeps builders in registration order
//! - `run` returns every option in that order, or the first error and nothing
//!   else
//!
//! Exactly one option in a successful run governs transport security
//! ([`ConnectionOption::Insecure`] or
//! [`ConnectionOption::TransportCredentials`]); the rest are orthogonal.

pub mod defaults;
pub mod registry;

pub use registry::{FnBuilder, OptionBuilder, OptionRegistry};

use std::fmt;

use crate::config::{keys, ConfigError, ConfigView};
use crate::tls::{TlsError, TransportCredentials, TLS_TARGET_PREFIX};

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("option builder '{name}' failed: {reason}")]
    Builder { name: String, reason: String },
}

/// One unit of channel configuration
#[derive(Debug, Clone)]
pub enum ConnectionOption {
    /// Dial without transport security
    Insecure,
    /// Dial with TLS using these credentials
    TransportCredentials(TransportCredentials),
    /// Block until the connection is up
    Block,
    /// Give up on non-temporary dial errors instead of retrying
    FailOnNonTempDialError(bool),
    /// User agent announced to the server
    UserAgent(String),
}

impl ConnectionOption {
    /// Whether this option decides transport security
    pub fn is_transport_security(&self) -> bool {
        matches!(
            self,
            ConnectionOption::Insecure | ConnectionOption::TransportCredentials(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConnectionOption::Insecure => "insecure",
            ConnectionOption::TransportCredentials(_) => "transport-credentials",
            ConnectionOption::Block => "block",
            ConnectionOption::FailOnNonTempDialError(_) => "fail-on-non-temp-dial-error",
            ConnectionOption::UserAgent(_) => "user-agent",
        }
    }
}

impl fmt::Display for ConnectionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionOption::TransportCredentials(creds) => write!(f, "{} [{}]", self.name(), creds),
            ConnectionOption::FailOnNonTempDialError(on) => write!(f, "{}={}", self.name(), on),
            ConnectionOption::UserAgent(agent) => write!(f, "{}={}", self.name(), agent),
            _ => f.write_str(self.name()),
        }
    }
}

/// Address to hand the channel constructor
///
/// The `tls://` prefix only selects the posture; it is not part of the
/// address that gets dialed.
pub fn dial_target(config: &ConfigView) -> Result<String> {
    let server = config.get_string(keys::SERVER)?;
    Ok(server
        .strip_prefix(TLS_TARGET_PREFIX)
        .map(str::to_string)
        .unwrap_or(server))
}
