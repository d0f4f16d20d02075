//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the application works out of the box
//! against a local service instance.

use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Challenge service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event-loop tick interval in milliseconds. Drives polling schedules
    /// and transient feedback, not the network.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// strftime format for the verification timestamp.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_tick_rate() -> u64 {
    50
}

fn default_timestamp_format() -> String {
    "%H:%M:%S".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

/// Equation typesetting. When disabled, derivation steps and previews show
/// the raw markup the service sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_true")]
    pub typeset: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { typeset: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Session activity log (task lifecycle lines, daily files).
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Filter for the diagnostic trace file, e.g. "info" or "odechal=debug".
    #[serde(default = "default_trace_filter")]
    pub trace_filter: String,
}

fn default_log_dir() -> String {
    "~/.local/share/odechal/logs".to_string()
}

fn default_trace_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            trace_filter: default_trace_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.ui.tick_rate_ms, 50);
        assert!(config.render.typeset);
        assert!(!config.logging.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            base_url = "https://solver.example.org"

            [render]
            typeset = false
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://solver.example.org");
        assert!(!config.render.typeset);
        assert_eq!(config.ui.timestamp_format, "%H:%M:%S");
    }
}
