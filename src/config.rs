//! Deployment configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety
//!
//! The capacity model and cashback settings live here: they are static
//! deployment-time inputs, never derived from data and never mutated at
//! runtime by the metrics core.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Machine fleet capacity model
    pub capacity: CapacityConfig,

    /// Cashback program settings
    pub cashback: CashbackConfig,

    /// Business calendar settings
    pub business: BusinessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_directory: PathBuf,
}

/// Static capacity model: fleet size, cycle times, operating hours, and the
/// efficiency correction factor accounting for idle time between cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub washers: u32,
    pub dryers: u32,
    pub wash_cycle_minutes: u32,
    pub dry_cycle_minutes: u32,
    /// First operating hour of the day (inclusive).
    pub open_hour: u32,
    /// Last operating hour of the day (exclusive).
    pub close_hour: u32,
    /// 0 < f <= 1; corrects theoretical throughput for realistic idle time.
    pub efficiency_factor: f64,
    /// Peak demand sub-range (inclusive start, exclusive end) within operating hours.
    pub peak_start_hour: u32,
    pub peak_end_hour: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbackConfig {
    /// Fraction of gross credited back to the customer, e.g. 0.075 for 7.5%.
    pub rate: f64,
    /// Transactions dated on/after this date accrue cashback liability.
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    /// Start of the AllTime reporting window.
    pub all_time_start: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "ERROR".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
                log_directory: PathBuf::from("logs"),
            },
            capacity: CapacityConfig {
                washers: 4,
                dryers: 4,
                wash_cycle_minutes: 35,
                dry_cycle_minutes: 45,
                open_hour: 7,
                close_hour: 23,
                efficiency_factor: 0.7,
                peak_start_hour: 18,
                peak_end_hour: 22,
            },
            cashback: CashbackConfig {
                rate: 0.075,
                start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
            },
            business: BusinessConfig {
                all_time_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            },
        }
    }
}

impl CapacityConfig {
    pub fn operating_hours_per_day(&self) -> u32 {
        self.close_hour.saturating_sub(self.open_hour)
    }

    pub fn peak_hours_per_day(&self) -> u32 {
        self.peak_end_hour.saturating_sub(self.peak_start_hour)
    }

    pub fn off_peak_hours_per_day(&self) -> u32 {
        self.operating_hours_per_day()
            .saturating_sub(self.peak_hours_per_day())
    }

    pub fn is_peak_hour(&self, hour: u32) -> bool {
        hour >= self.peak_start_hour && hour < self.peak_end_hour
    }

    pub fn is_operating_hour(&self, hour: u32) -> bool {
        hour >= self.open_hour && hour < self.close_hour
    }

    /// Theoretical maximum wash cycles for a span of days and hours per day.
    pub fn wash_theoretical_max(&self, active_days: i64, hours_per_day: u32) -> f64 {
        Self::theoretical_max(
            active_days,
            hours_per_day,
            self.wash_cycle_minutes,
            self.washers,
            self.efficiency_factor,
        )
    }

    /// Theoretical maximum dry cycles for a span of days and hours per day.
    pub fn dry_theoretical_max(&self, active_days: i64, hours_per_day: u32) -> f64 {
        Self::theoretical_max(
            active_days,
            hours_per_day,
            self.dry_cycle_minutes,
            self.dryers,
            self.efficiency_factor,
        )
    }

    /// Combined cycles-per-hour capacity of the whole fleet.
    pub fn fleet_hourly_capacity(&self) -> f64 {
        let wash = Self::theoretical_max(1, 1, self.wash_cycle_minutes, self.washers, self.efficiency_factor);
        let dry = Self::theoretical_max(1, 1, self.dry_cycle_minutes, self.dryers, self.efficiency_factor);
        wash + dry
    }

    fn theoretical_max(
        active_days: i64,
        hours_per_day: u32,
        cycle_minutes: u32,
        machine_count: u32,
        efficiency: f64,
    ) -> f64 {
        if cycle_minutes == 0 {
            return 0.0;
        }
        active_days as f64
            * hours_per_day as f64
            * (60.0 / cycle_minutes as f64)
            * machine_count as f64
            * efficiency
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file if it exists
        let config_paths = [
            PathBuf::from("lavapop-metrics.toml"),
            PathBuf::from(".lavapop-metrics.toml"),
            dirs::config_dir()
                .map(|d| d.join("lavapop-metrics").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Capacity overrides
        if let Ok(val) = env::var("LAVAPOP_WASHERS") {
            self.capacity.washers = val.parse().context("Invalid LAVAPOP_WASHERS")?;
        }
        if let Ok(val) = env::var("LAVAPOP_DRYERS") {
            self.capacity.dryers = val.parse().context("Invalid LAVAPOP_DRYERS")?;
        }
        if let Ok(val) = env::var("LAVAPOP_EFFICIENCY_FACTOR") {
            self.capacity.efficiency_factor =
                val.parse().context("Invalid LAVAPOP_EFFICIENCY_FACTOR")?;
        }

        // Cashback overrides
        if let Ok(val) = env::var("LAVAPOP_CASHBACK_RATE") {
            self.cashback.rate = val.parse().context("Invalid LAVAPOP_CASHBACK_RATE")?;
        }
        if let Ok(val) = env::var("LAVAPOP_CASHBACK_START_DATE") {
            self.cashback.start_date = NaiveDate::parse_from_str(&val, "%Y-%m-%d")
                .context("Invalid LAVAPOP_CASHBACK_START_DATE, use YYYY-MM-DD")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.capacity.efficiency_factor <= 0.0 || self.capacity.efficiency_factor > 1.0 {
            return Err(anyhow::anyhow!(
                "Efficiency factor must be in (0, 1], got {}",
                self.capacity.efficiency_factor
            ));
        }

        if self.capacity.open_hour >= self.capacity.close_hour || self.capacity.close_hour > 24 {
            return Err(anyhow::anyhow!(
                "Operating hours must satisfy open < close <= 24, got {}..{}",
                self.capacity.open_hour,
                self.capacity.close_hour
            ));
        }

        if self.capacity.peak_start_hour >= self.capacity.peak_end_hour
            || self.capacity.peak_start_hour < self.capacity.open_hour
            || self.capacity.peak_end_hour > self.capacity.close_hour
        {
            return Err(anyhow::anyhow!(
                "Peak hours {}..{} must be a sub-range of operating hours {}..{}",
                self.capacity.peak_start_hour,
                self.capacity.peak_end_hour,
                self.capacity.open_hour,
                self.capacity.close_hour
            ));
        }

        if self.capacity.wash_cycle_minutes == 0 || self.capacity.dry_cycle_minutes == 0 {
            return Err(anyhow::anyhow!("Cycle minutes must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.cashback.rate) {
            return Err(anyhow::anyhow!(
                "Cashback rate must be in [0, 1], got {}",
                self.cashback.rate
            ));
        }

        // Zero machines is degenerate but allowed; utilization reports 0.

        Ok(())
    }

    /// Save current configuration to file
    #[allow(dead_code)]
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "ERROR");
        assert_eq!(config.capacity.washers, 4);
        assert_eq!(config.cashback.rate, 0.075);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override() {
        env::set_var("LAVAPOP_WASHERS", "6");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.capacity.washers, 6);
        env::remove_var("LAVAPOP_WASHERS");
    }

    #[test]
    fn test_validation_rejects_bad_efficiency() {
        let mut config = Config::default();
        config.capacity.efficiency_factor = 1.5;
        assert!(config.validate().is_err());

        config.capacity.efficiency_factor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_peak_outside_operating_hours() {
        let mut config = Config::default();
        config.capacity.peak_end_hour = config.capacity.close_hour + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_theoretical_max_monotonicity() {
        let capacity = Config::default().capacity;

        let base = capacity.wash_theoretical_max(7, capacity.operating_hours_per_day());
        let more_days = capacity.wash_theoretical_max(14, capacity.operating_hours_per_day());
        assert!(more_days > base);

        let mut bigger_fleet = capacity.clone();
        bigger_fleet.washers += 2;
        assert!(bigger_fleet.wash_theoretical_max(7, capacity.operating_hours_per_day()) > base);

        let mut slower_cycles = capacity.clone();
        slower_cycles.wash_cycle_minutes *= 2;
        assert!(slower_cycles.wash_theoretical_max(7, capacity.operating_hours_per_day()) < base);

        let mut less_efficient = capacity.clone();
        less_efficient.efficiency_factor = 0.5;
        assert!(less_efficient.wash_theoretical_max(7, capacity.operating_hours_per_day()) < base);
    }

    #[test]
    fn test_zero_machines_is_degenerate_not_invalid() {
        let mut config = Config::default();
        config.capacity.washers = 0;
        config.capacity.dryers = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity.wash_theoretical_max(7, 16), 0.0);
    }
}
