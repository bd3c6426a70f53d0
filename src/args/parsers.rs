use std::time::Duration;

use crate::config::parse_duration_value;
use crate::error::ConfigError;

pub(super) fn parse_positive_usize(s: &str) -> Result<usize, ConfigError> {
    let value: usize = s
        .trim()
        .parse()
        .map_err(|err| ConfigError::InvalidNumber { source: err })?;
    if value == 0 {
        return Err(ConfigError::ValueTooSmall { min: 1 });
    }
    Ok(value)
}

pub(super) fn parse_duration_arg(s: &str) -> Result<Duration, ConfigError> {
    parse_duration_value(s)
}
