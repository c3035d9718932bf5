use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use stockline_core::types::RecordId;
use stockline_rpc::config::DEFAULT_MAX_SESSION_RETRIES;
use stockline_rpc::ClientConfig;

/// Picking the workflows act on when no id is given on the command line.
pub const DEFAULT_PICKING_ID: RecordId = 108080;

/// A configuration variable that is set but does not parse.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be a valid {expected}, got {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Application configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local development server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Connection settings handed to the RPC client.
    pub client: ClientConfig,
    /// Default picking for the single-record workflows.
    pub picking_id: RecordId,
    /// Directory snapshot files are written into.
    pub output_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `ODOO_URL`             | `http://localhost:8018` |
    /// | `ODOO_DB`              | `18_odoo`               |
    /// | `ODOO_USERNAME`        | `admin`                 |
    /// | `ODOO_PASSWORD`        | `admin`                 |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `SESSION_RETRY_LIMIT`  | `1`                     |
    /// | `PICKING_ID`           | `108080`                |
    /// | `OUTPUT_DIR`           | `.`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let url = text("ODOO_URL", "http://localhost:8018")
            .trim_end_matches('/')
            .to_string();

        let mut client = ClientConfig::new(
            url,
            text("ODOO_DB", "18_odoo"),
            text("ODOO_USERNAME", "admin"),
            text("ODOO_PASSWORD", "admin"),
        );

        let timeout_secs: u64 = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30, "u64")?;
        client.request_timeout = Duration::from_secs(timeout_secs);
        client.max_session_retries = parse_var(
            &lookup,
            "SESSION_RETRY_LIMIT",
            DEFAULT_MAX_SESSION_RETRIES,
            "u32",
        )?;

        let picking_id = parse_var(&lookup, "PICKING_ID", DEFAULT_PICKING_ID, "record id")?;
        let output_dir = PathBuf::from(text("OUTPUT_DIR", "."));

        Ok(Self {
            client,
            picking_id,
            output_dir,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError {
            var,
            value,
            expected,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_target_local_server() {
        let config = load(&[]).unwrap();

        assert_eq!(config.client.url, "http://localhost:8018");
        assert_eq!(config.client.db, "18_odoo");
        assert_eq!(config.client.username, "admin");
        assert_eq!(config.client.request_timeout, Duration::from_secs(30));
        assert_eq!(config.client.max_session_retries, 1);
        assert_eq!(config.picking_id, 108080);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("ODOO_URL", "https://erp.example.com/"),
            ("ODOO_DB", "prod"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("SESSION_RETRY_LIMIT", "3"),
            ("PICKING_ID", "42"),
            ("OUTPUT_DIR", "/tmp/out"),
        ])
        .unwrap();

        assert_eq!(config.client.url, "https://erp.example.com");
        assert_eq!(config.client.db, "prod");
        assert_eq!(config.client.request_timeout, Duration::from_secs(5));
        assert_eq!(config.client.max_session_retries, 3);
        assert_eq!(config.picking_id, 42);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn invalid_number_is_an_error() {
        let err = load(&[("PICKING_ID", "abc")]).unwrap_err();

        assert_eq!(err.var, "PICKING_ID");
        assert_eq!(err.to_string(), "PICKING_ID must be a valid record id, got \"abc\"");
    }
}
