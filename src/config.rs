use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveTime;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

const ENV_RPC_URL: &str = "AUTOTX_RPC_URL";
const ENV_GRAPHQL_URL: &str = "AUTOTX_GRAPHQL_URL";
const ENV_LOG: &str = "AUTOTX_LOG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc_url: String,
    pub graphql_url: String,
    pub time_api_url: String,
    pub eth_amount_range: AmountRange,
    /// Pause between cycles in fixed-delay mode.
    pub delay_ms: u64,
    /// Share of the wrapped amount that gets unwrapped again.
    pub unwrap_percentage: BigDecimal,
    pub usdt: UsdtAmounts,
    pub usdc: UsdcAmounts,
    pub retry_delay_ms: u64,
    /// Wait after a borrow before re-reading the balance.
    pub settle_delay_ms: u64,
    /// Upper bound on waiting for a transaction receipt.
    pub receipt_timeout_secs: u64,
    pub swap_deadline_secs: u64,
    /// `HH:MM` in UTC for daily scheduling.
    pub daily_run_utc: String,
    pub key_file: PathBuf,
    pub proxy_file: PathBuf,
    pub log_level: String,
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmountRange {
    pub min: BigDecimal,
    pub max: BigDecimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsdtAmounts {
    pub borrow_amount: BigDecimal,
    pub repay_amount: BigDecimal,
    pub min_swap_balance: BigDecimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsdcAmounts {
    pub supply_amount: BigDecimal,
    pub repeated_supply_amount: BigDecimal,
    pub repeated_supply_count: u32,
}

fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap_or_default()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.api.lisk.com".to_string(),
            graphql_url: "https://portal-api.lisk.com/graphql".to_string(),
            time_api_url: "http://worldtimeapi.org/api/timezone/Etc/UTC".to_string(),
            eth_amount_range: AmountRange::default(),
            delay_ms: 21_600_000,
            unwrap_percentage: decimal("0.95"),
            usdt: UsdtAmounts::default(),
            usdc: UsdcAmounts::default(),
            retry_delay_ms: 5_000,
            settle_delay_ms: 5_000,
            receipt_timeout_secs: 180,
            swap_deadline_secs: 20 * 60,
            daily_run_utc: "00:30".to_string(),
            key_file: PathBuf::from("key.txt"),
            proxy_file: PathBuf::from("proxy.txt"),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for AmountRange {
    fn default() -> Self {
        Self {
            min: decimal("0.00000001"),
            max: decimal("0.0000001"),
        }
    }
}

impl Default for UsdtAmounts {
    fn default() -> Self {
        Self {
            borrow_amount: decimal("0.1"),
            repay_amount: decimal("0.1"),
            min_swap_balance: decimal("0.1"),
        }
    }
}

impl Default for UsdcAmounts {
    fn default() -> Self {
        Self {
            supply_amount: decimal("0.1"),
            repeated_supply_amount: decimal("0.01"),
            repeated_supply_count: 71,
        }
    }
}

impl Config {
    /// Read the config file, falling back to defaults when it does not exist,
    /// then apply environment overrides and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_RPC_URL) {
            self.rpc_url = url;
        }
        if let Ok(url) = std::env::var(ENV_GRAPHQL_URL) {
            self.graphql_url = url;
        }
        if let Ok(level) = std::env::var(ENV_LOG) {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let range = &self.eth_amount_range;
        if range.min < BigDecimal::zero() || range.max < BigDecimal::zero() {
            return Err(ConfigError::Invalid {
                field: "eth_amount_range",
                message: "amounts must not be negative".to_string(),
            });
        }
        if range.min > range.max {
            return Err(ConfigError::Invalid {
                field: "eth_amount_range",
                message: format!("min {} is greater than max {}", range.min, range.max),
            });
        }
        if self.unwrap_percentage <= BigDecimal::zero() || self.unwrap_percentage > BigDecimal::from(1) {
            return Err(ConfigError::Invalid {
                field: "unwrap_percentage",
                message: format!("{} is outside (0, 1]", self.unwrap_percentage),
            });
        }
        if self.receipt_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "receipt_timeout_secs",
                message: "must be at least one second".to_string(),
            });
        }
        self.daily_run_time()?;
        Ok(())
    }

    pub fn daily_run_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.daily_run_utc.trim(), "%H:%M").map_err(|e| ConfigError::Invalid {
            field: "daily_run_utc",
            message: format!("{:?}: {}", self.daily_run_utc, e),
        })
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delay(), Duration::from_secs(6 * 60 * 60));
        assert_eq!(config.usdc.repeated_supply_count, 71);
        assert_eq!(
            config.daily_run_time().unwrap(),
            NaiveTime::from_hms_opt(0, 30, 0).unwrap()
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            delay_ms = 60000
            unwrap_percentage = "0.5"

            [eth_amount_range]
            min = "0.000001"
            max = "0.00001"

            [usdt]
            borrow_amount = "0.2"
            "#,
        )
        .unwrap();

        assert_eq!(config.delay_ms, 60_000);
        assert_eq!(config.unwrap_percentage, decimal("0.5"));
        assert_eq!(config.eth_amount_range.min, decimal("0.000001"));
        assert_eq!(config.usdt.borrow_amount, decimal("0.2"));
        assert_eq!(config.usdt.repay_amount, decimal("0.1"));
        assert_eq!(config.rpc_url, "https://rpc.api.lisk.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_range() {
        let mut config = Config::default();
        config.eth_amount_range.min = decimal("1");
        config.eth_amount_range.max = decimal("0.5");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "eth_amount_range", .. })
        ));
    }

    #[test]
    fn rejects_unwrap_percentage_above_one() {
        let mut config = Config::default();
        config.unwrap_percentage = decimal("1.5");
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_daily_time() {
        let mut config = Config::default();
        config.daily_run_utc = "25:99".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "daily_run_utc", .. })
        ));
    }

    #[test]
    fn receipt_wait_is_bounded() {
        let mut config = Config::default();
        assert_eq!(config.receipt_timeout(), Duration::from_secs(180));

        config.receipt_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "receipt_timeout_secs", .. })
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load("definitely/not/here/config.toml").unwrap();
        assert_eq!(config.usdc.supply_amount, decimal("0.1"));
    }
}
