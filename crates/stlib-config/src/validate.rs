//! Coercion of raw environment strings into settings values.

use toml::Value;

use crate::defaults::{EnvBinding, ValueKind};
use crate::error::{ConfigError, ConfigResult};

/// Coerce the raw value of an allow-listed variable into a TOML value.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvValue`] when a numeric binding does not
/// hold a positive integer in range.
pub fn coerce_env_value(binding: &EnvBinding, raw: &str) -> ConfigResult<Value> {
    match binding.kind {
        ValueKind::Text => Ok(Value::String(raw.to_string())),
        ValueKind::Port => parse_port(binding.var, raw).map(|port| Value::Integer(i64::from(port))),
        ValueKind::Count => {
            parse_count(binding.var, raw).map(|count| Value::Integer(i64::from(count)))
        }
    }
}

pub(crate) fn parse_port(var: &'static str, raw: &str) -> ConfigResult<u16> {
    let port = raw
        .trim()
        .parse::<u16>()
        .map_err(|_| invalid(var, raw, "not_a_port"))?;
    if port == 0 {
        return Err(invalid(var, raw, "zero"));
    }
    Ok(port)
}

pub(crate) fn parse_count(var: &'static str, raw: &str) -> ConfigResult<u32> {
    let count = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid(var, raw, "not_an_integer"))?;
    if count == 0 {
        return Err(invalid(var, raw, "zero"));
    }
    Ok(count)
}

fn invalid(var: &'static str, raw: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidEnvValue {
        var,
        value: raw.to_string(),
        reason,
    }
}
