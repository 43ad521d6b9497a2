use std::path::Path;
use std::time::Duration;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::analyzer::MIN_CANDLES;
use crate::error::ConfigError;
use crate::model::TimeFrame;
use crate::provider::ProviderKind;

const MAX_RETRIES_LIMIT: u32 = 5;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_provider_name() -> String {
    "bitget".into()
}

fn default_product_type() -> String {
    "USDT-FUTURES".into()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_timeframe() -> String {
    "15m".into()
}

fn default_lookback() -> usize {
    96
}

fn default_quote_currency() -> String {
    "USDT".into()
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Accepted values: `"bitget"` | `"binance"`
    #[serde(default = "default_provider_name")]
    pub name: String,
    /// Overrides the provider's public REST endpoint.
    pub base_url: Option<String>,
    /// Bitget `productType`; ignored by other providers.
    #[serde(default = "default_product_type")]
    pub product_type: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default)]
    pub max_retries: u32,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: None,
            product_type: default_product_type(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
            max_retries: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    /// Number of candles requested per analysis.
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Quote asset appended to symbols typed without one.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
}

impl AnalysisConfig {
    /// Parsed timeframe; falls back to 15m for a config that skipped `validate`.
    pub fn timeframe(&self) -> TimeFrame {
        TimeFrame::from_str(&self.timeframe).unwrap_or(TimeFrame::Min15)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timeframe: default_timeframe(),
            lookback: default_lookback(),
            quote_currency: default_quote_currency(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_log_format(&config.general)?;
    validate_provider(&config.provider)?;
    validate_analysis(&config.analysis)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_log_format(general: &GeneralConfig) -> Result<(), Report<ConfigError>> {
    if !matches!(general.log_format.as_str(), "text" | "json") {
        return Err(invalid(format!(
            "general.log_format \"{}\" must be \"text\" or \"json\"",
            general.log_format
        )));
    }
    Ok(())
}

fn validate_provider(provider: &ProviderConfig) -> Result<(), Report<ConfigError>> {
    if ProviderKind::from_str(&provider.name).is_none() {
        return Err(invalid(format!(
            "provider.name \"{}\" is not a known provider",
            provider.name
        )));
    }
    if provider.timeout_secs == 0 {
        return Err(invalid("provider.timeout_secs must be > 0".into()));
    }
    if provider.requests_per_second == 0 {
        return Err(invalid("provider.requests_per_second must be > 0".into()));
    }
    if provider.max_retries > MAX_RETRIES_LIMIT {
        return Err(invalid(format!(
            "provider.max_retries must be <= {MAX_RETRIES_LIMIT}"
        )));
    }
    Ok(())
}

fn validate_analysis(analysis: &AnalysisConfig) -> Result<(), Report<ConfigError>> {
    if TimeFrame::from_str(&analysis.timeframe).is_none() {
        return Err(invalid(format!(
            "analysis.timeframe: unknown timeframe \"{}\"",
            analysis.timeframe
        )));
    }
    if analysis.lookback < MIN_CANDLES {
        return Err(invalid(format!(
            "analysis.lookback {} is below the minimum of {MIN_CANDLES} candles",
            analysis.lookback
        )));
    }
    let quote = &analysis.quote_currency;
    if quote.is_empty() || !quote.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid(format!(
            "analysis.quote_currency \"{quote}\" must be alphabetic"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[provider]
name = "binance"
base_url = "https://fapi.binance.com"
timeout_secs = 5
requests_per_second = 4
max_retries = 2

[analysis]
timeframe = "1h"
lookback = 120
quote_currency = "USDC"
"#;
        let config = parse(toml);
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.provider.name, "binance");
        assert_eq!(config.provider.timeout(), Duration::from_secs(5));
        assert_eq!(config.provider.max_retries, 2);
        assert_eq!(config.analysis.timeframe(), TimeFrame::Hour1);
        assert_eq!(config.analysis.lookback, 120);
    }

    #[test]
    fn defaults_applied_when_fields_omitted() {
        let config = parse("");
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.provider.name, "bitget");
        assert_eq!(config.provider.product_type, "USDT-FUTURES");
        assert_eq!(config.provider.timeout_secs, 10);
        assert_eq!(config.provider.max_retries, 0);
        assert!(config.provider.base_url.is_none());
        assert_eq!(config.analysis.timeframe(), TimeFrame::Min15);
        assert_eq!(config.analysis.lookback, 96);
        assert_eq!(config.analysis.quote_currency, "USDT");
    }

    #[test]
    fn unknown_provider_rejected() {
        let config = parse(
            r#"
[provider]
name = "kraken"
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn every_provider_kind_is_accepted() {
        for kind in [ProviderKind::Bitget, ProviderKind::Binance] {
            let config = parse(&format!("[provider]\nname = \"{kind}\"\n"));
            assert!(validate(&config).is_ok(), "{kind} rejected");
        }
    }

    #[test]
    fn invalid_timeframe_string_rejected() {
        let config = parse(
            r#"
[analysis]
timeframe = "2m"
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn lookback_below_minimum_rejected() {
        let config = parse(
            r#"
[analysis]
lookback = 20
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = parse(
            r#"
[provider]
timeout_secs = 0
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn excessive_retries_rejected() {
        let config = parse(
            r#"
[provider]
max_retries = 50
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn unknown_log_format_rejected() {
        let config = parse(
            r#"
[general]
log_format = "xml"
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn missing_file_reports_read_error() {
        let report = load(Path::new("/nonexistent/candle-signal.toml")).unwrap_err();
        assert!(matches!(report.current_context(), ConfigError::ReadFile));
    }
}
