use dvp_core::{CodecError, WireFormat};

pub const WIRE_FORMAT_VAR: &str = "DVP_WIRE_FORMAT";
pub const LOG_VAR: &str = "DVP_LOG";
pub const LOG_JSON_VAR: &str = "DVP_LOG_JSON";

/// Errors reading a [`HostConfig`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {source}")]
    WireFormat {
        var: &'static str,
        #[source]
        source: CodecError,
    },
    #[error("invalid {var}: expected a boolean, found {value:?}")]
    Bool { var: &'static str, value: String },
}

/// Host-level configuration for the plugin entry point.
///
/// Controls the envelope encoding and the tracing subscriber installed by
/// [`init_tracing`](crate::telemetry::init_tracing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Encoding of request and response envelopes.
    pub wire_format: WireFormat,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            wire_format: WireFormat::Json,
            log_filter: "info".to_string(),
            log_json: false,
        }
    }
}

impl HostConfig {
    /// Read `DVP_WIRE_FORMAT`, `DVP_LOG` and `DVP_LOG_JSON`, falling back to
    /// the defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(WIRE_FORMAT_VAR) {
            config.wire_format = value.parse().map_err(|source| ConfigError::WireFormat {
                var: WIRE_FORMAT_VAR,
                source,
            })?;
        }
        if let Some(filter) = lookup(LOG_VAR).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }
        if let Some(value) = lookup(LOG_JSON_VAR) {
            config.log_json = parse_bool(LOG_JSON_VAR, &value)?;
        }

        Ok(config)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Bool {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = HostConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.wire_format, WireFormat::Json);
        assert_eq!(config.log_filter, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn reads_every_variable() {
        let config = HostConfig::from_lookup(lookup(&[
            (WIRE_FORMAT_VAR, "MsgPack"),
            (LOG_VAR, "dvp_platform=debug"),
            (LOG_JSON_VAR, "true"),
        ]))
        .unwrap();
        assert_eq!(config.wire_format, WireFormat::MsgPack);
        assert_eq!(config.log_filter, "dvp_platform=debug");
        assert!(config.log_json);
    }

    #[test]
    fn rejects_unknown_wire_format() {
        let err = HostConfig::from_lookup(lookup(&[(WIRE_FORMAT_VAR, "protobuf")])).unwrap_err();
        assert!(matches!(err, ConfigError::WireFormat { var: WIRE_FORMAT_VAR, .. }));
    }

    #[test]
    fn rejects_unparseable_bool() {
        let err = HostConfig::from_lookup(lookup(&[(LOG_JSON_VAR, "maybe")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid DVP_LOG_JSON: expected a boolean, found \"maybe\""
        );
    }

    #[test]
    fn blank_log_filter_keeps_default() {
        let config = HostConfig::from_lookup(lookup(&[(LOG_VAR, "  ")])).unwrap();
        assert_eq!(config.log_filter, "info");
    }
}
