//! Connection defaults
//!
//! Builders for the orthogonal dial options every channel gets. None of them
//! touch transport security.

use super::{ConnectionOption, OptionRegistry, Result};
use crate::config::{keys, ConfigView};

/// Always block until the connection is established
pub fn block_option(_config: &ConfigView) -> Result<Option<ConnectionOption>> {
    Ok(Some(ConnectionOption::Block))
}

/// Always fail fast on non-temporary dial errors
pub fn fail_on_non_temp_dial_error_option(_config: &ConfigView) -> Result<Option<ConnectionOption>> {
    Ok(Some(ConnectionOption::FailOnNonTempDialError(true)))
}

/// User agent, only when `user-agent` is set
pub fn user_agent_option(config: &ConfigView) -> Result<Option<ConnectionOption>> {
    Ok(config
        .get_opt_string(keys::USER_AGENT)?
        .map(ConnectionOption::UserAgent))
}

/// Register the connection defaults
pub fn register(registry: &mut OptionRegistry) {
    registry
        .register_fn("block", block_option)
        .register_fn("fail-on-non-temp-dial-error", fail_on_non_temp_dial_error_option)
        .register_fn("user-agent", user_agent_option);
}
