use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use url::Url;
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
const DEFAULT_COMPANY_NAME: &str = "Raw Material Inventory";
const CONFIG_DIR: &str = "config";

/// Business details printed in the invoice header and footer
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InvoiceBranding {
    /// Trading name shown at the top of every invoice
    #[validate(length(min = 1))]
    #[serde(default = "default_company_name")]
    pub company_name: String,

    /// Postal address, one entry per printed line
    #[serde(default)]
    pub address_lines: Vec<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,

    /// GSTIN printed under the address
    #[serde(default)]
    pub gstin: Option<String>,

    /// Closing line printed in the footer, at most three printed lines
    #[serde(default)]
    #[validate(length(max = 160))]
    pub footer_note: Option<String>,
}

impl Default for InvoiceBranding {
    fn default() -> Self {
        Self {
            company_name: default_company_name(),
            address_lines: Vec::new(),
            phone: None,
            email: None,
            gstin: None,
            footer_note: None,
        }
    }
}

/// Console configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ConsoleConfig {
    /// Base URL of the inventory REST API, e.g. `https://erp.example.com/api`
    #[validate(custom = "validate_base_url")]
    pub api_base_url: String,

    /// Bearer token sent with every request
    #[serde(default)]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    #[validate(custom = "validate_request_timeout")]
    pub request_timeout_secs: u64,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Directory generated invoices are written to
    #[serde(default = "default_invoice_output_dir")]
    pub invoice_output_dir: PathBuf,

    /// Symbol prefixed to currency amounts
    #[serde(default = "default_currency_symbol")]
    #[validate(length(min = 1, max = 8))]
    pub currency_symbol: String,

    /// Invoice header and footer details
    #[serde(default)]
    #[validate]
    pub branding: InvoiceBranding,
}

impl ConsoleConfig {
    /// Creates a configuration pointing at `api_base_url` with defaults elsewhere
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            environment: DEFAULT_ENV.to_string(),
            log_level: default_log_level(),
            log_json: false,
            invoice_output_dir: default_invoice_output_dir(),
            currency_symbol: default_currency_symbol(),
            branding: InvoiceBranding::default(),
        }
    }

    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.is_production() && self.api_base_url.trim_start().starts_with("http://") {
            let mut err = ValidationError::new("api_base_url_insecure");
            err.message = Some(
                "Use an https:// APP__API_BASE_URL outside development so the API token is not sent in clear text"
                    .into(),
            );
            errors.add("api_base_url", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConsoleConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_invoice_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

fn default_company_name() -> String {
    DEFAULT_COMPANY_NAME.to_string()
}

fn validate_base_url(raw: &str) -> Result<(), ValidationError> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => {
            let mut err = ValidationError::new("api_base_url");
            err.message = Some("Must be an absolute http(s) URL".into());
            Err(err)
        }
    }
}

fn validate_request_timeout(secs: u64) -> Result<(), ValidationError> {
    if secs == 0 || secs > 600 {
        let mut err = ValidationError::new("request_timeout_secs");
        err.message = Some("request_timeout_secs must be between 1 and 600".into());
        return Err(err);
    }
    Ok(())
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("rawstock_console={},rawstock={}", level, level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    // Logs go to stderr so `--json` command output on stdout stays parseable
    let builder = fmt()
        .with_env_filter(EnvFilter::new(filter_directive))
        .with_writer(std::io::stderr);

    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Loads console configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<ConsoleConfig, ConsoleConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] with an explicit config directory
pub fn load_config_from(config_dir: &Path) -> Result<ConsoleConfig, ConsoleConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("api_base_url", DEFAULT_API_BASE_URL)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let console_config: ConsoleConfig = config.try_deserialize()?;

    console_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        ConsoleConfigError::Validation(e)
    })?;

    console_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        ConsoleConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(console_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_validate() {
        let cfg = ConsoleConfig::new("http://localhost:5000/api");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.currency_symbol, "₹");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let cfg = ConsoleConfig::new("/api");
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("api_base_url"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = ConsoleConfig::new("http://localhost:5000/api");
        cfg.request_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn timeout_bounds_are_inclusive() {
        let mut cfg = ConsoleConfig::new("http://localhost:5000/api");
        cfg.request_timeout_secs = 600;
        assert!(cfg.validate().is_ok());

        cfg.request_timeout_secs = 601;
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("request_timeout_secs"));
    }

    #[test]
    fn overlong_footer_note_is_rejected() {
        let mut cfg = ConsoleConfig::new("http://localhost:5000/api");
        cfg.branding.footer_note = Some("Goods once sold will not be taken back. ".repeat(5));
        assert!(cfg.validate().is_err());
        cfg.branding.footer_note = Some("Subject to Pune jurisdiction.".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let mut cfg = ConsoleConfig::new("http://localhost:5000/api");
        cfg.log_level = "verbose".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn production_requires_https() {
        let mut cfg = ConsoleConfig::new("http://erp.internal/api");
        cfg.environment = "production".into();
        assert!(cfg.validate_additional_constraints().is_err());

        cfg.api_base_url = "https://erp.internal/api".into();
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
                api_base_url = "https://erp.example.com/api"
                request_timeout_secs = 12

                [branding]
                company_name = "Shree Metals"
                address_lines = ["Plot 4, MIDC", "Pune 411019"]
            "#,
        )
        .unwrap();

        let cfg = load_config_from(dir.path()).unwrap();
        assert_eq!(cfg.api_base_url, "https://erp.example.com/api");
        assert_eq!(cfg.request_timeout_secs, 12);
        assert_eq!(cfg.branding.company_name, "Shree Metals");
        assert_eq!(cfg.branding.address_lines.len(), 2);
    }
}
