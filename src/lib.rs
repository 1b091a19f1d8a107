//! connopts - connection option resolution for outbound RPC channels
//!
//! This crate turns a resolved configuration snapshot into the ordered list
//! of options an RPC channel is dialed with, deciding along the way whether
//! the connection is plaintext, TLS, or mutual TLS.
//!
//! ```no_run
//! use connopts::config::{keys, ConfigView};
//! use connopts::options::{self, OptionRegistry};
//!
//! // Once, at startup
//! let registry = OptionRegistry::with_defaults();
//!
//! // Per connection attempt
//! let config = ConfigView::new()
//!     .with(keys::SERVER, "tls://relay.example.com:4245")
//!     .with(keys::TLS_CLIENT_CERT_FILE, "/etc/relay/client.pem")
//!     .with(keys::TLS_CLIENT_KEY_FILE, "/etc/relay/client.key");
//! let target = options::dial_target(&config).unwrap();
//! let dial_options = registry.run(&config).unwrap();
//! # let _ = (target, dial_options);
//! ```

pub mod config;
pub mod options;
pub mod tls;

pub use config::{ConfigError, ConfigValue, ConfigView};
pub use options::{ConnectionOption, OptionBuilder, OptionRegistry};
pub use tls::{TlsError, TlsPosture};
