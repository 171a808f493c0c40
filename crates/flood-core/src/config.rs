//! Configuration System
//!
//! Loads run parameters from a TOML file (`flood.toml` by default). Every
//! section is optional; missing values fall back to the reference model's
//! constants.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "flood.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub population: PopulationConfig,
    pub facilities: FacilityConfig,
    pub funding: FundingConfig,
    pub phases: PhaseConfig,
    pub rescue: RescueConfig,
    pub town: TownConfig,
    pub flood: FloodConfig,
    pub economy: EconomyConfig,
}

/// Output cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks between snapshot files (0 disables periodic snapshots)
    pub snapshot_interval: u64,
    /// Include per-individual rows in snapshots
    pub snapshot_individuals: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 24,
            snapshot_individuals: true,
        }
    }
}

/// Population size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub size: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self { size: 300 }
    }
}

/// Care capacity as a percentage of the population
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    pub shelter_capacity_pct: f64,
    pub healthcare_capacity_pct: f64,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            shelter_capacity_pct: 1.0,
            healthcare_capacity_pct: 5.0,
        }
    }
}

impl FacilityConfig {
    /// Number of beds for a percentage of the population. Admission compares
    /// occupancy against the fractional limit, so the bed count rounds up.
    pub fn capacity_for(pct: f64, population: usize) -> usize {
        (pct / 100.0 * population as f64).ceil() as usize
    }

    pub fn shelter_capacity(&self, population: usize) -> usize {
        Self::capacity_for(self.shelter_capacity_pct, population)
    }

    pub fn healthcare_capacity(&self, population: usize) -> usize {
        Self::capacity_for(self.healthcare_capacity_pct, population)
    }
}

/// Annual per-capita funding bases, scaled to `reserve_days` of spending
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingConfig {
    pub business_per_capita: f64,
    pub school_per_capita: f64,
    pub shelter_per_capita: f64,
    pub healthcare_per_capita: f64,
    pub government_per_capita: f64,
    pub reserve_days: f64,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            business_per_capita: 22_000.0,
            school_per_capita: 1_200.0,
            shelter_per_capita: 4_200.0,
            healthcare_per_capita: 4_200.0,
            government_per_capita: 7_000.0,
            reserve_days: 14.0,
        }
    }
}

impl FundingConfig {
    /// Initial pool for a per-capita annual amount
    pub fn pool(&self, per_capita: f64, population: usize) -> f64 {
        population as f64 * per_capita / 365.0 * self.reserve_days
    }
}

/// Disaster phase durations in days
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    pub pre_flood_days: u64,
    pub flood_days: u64,
    pub post_flood_days: u64,
    /// Days before the flood during which individuals consider evacuating
    pub evacuation_window_days: u64,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            pre_flood_days: 8,
            flood_days: 10,
            post_flood_days: 14,
            evacuation_window_days: 7,
        }
    }
}

/// Rescue and care admission parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RescueConfig {
    /// Stranded hours before a shelter admission can succeed
    pub hours_before_rescue: u32,
    /// Injured hours before a healthcare admission can succeed
    pub hours_before_healthcare: u32,
    /// Hours in shelter after which an individual with a dry home leaves
    pub shelter_stay_hours: u32,
    /// Hospitalized patients at or below this recovery rate are discharged
    pub recovery_threshold: f64,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            hours_before_rescue: 2,
            hours_before_healthcare: 0,
            shelter_stay_hours: 12,
            recovery_threshold: 0.9,
        }
    }
}

/// Synthetic town layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TownConfig {
    pub houses: usize,
    pub businesses: usize,
    pub schools: usize,
    /// Side length of the square study area
    pub extent: f64,
    /// Footprint radius of every building
    pub building_radius: f64,
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            houses: 80,
            businesses: 12,
            schools: 3,
            extent: 1_000.0,
            building_radius: 15.0,
        }
    }
}

/// Geometry of the three flood layers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FloodConfig {
    pub center_x: f64,
    pub center_y: f64,
    /// Radius of the first (smallest) layer
    pub base_radius: f64,
    /// Extra radius for each subsequent layer
    pub radius_step: f64,
    /// Hazard level range returned inside a flooded zone
    pub min_depth: f64,
    pub max_depth: f64,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            center_x: 350.0,
            center_y: 500.0,
            base_radius: 150.0,
            radius_step: 100.0,
            min_depth: 10.0,
            max_depth: 55.0,
        }
    }
}

/// When monthly taxes are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaxSchedule {
    /// Only when the hour counter divided by 24 equals exactly 30
    #[default]
    Once,
    /// On every 30th day boundary
    EveryThirtiethDay,
}

impl TaxSchedule {
    /// Whether taxes are due at this hour.
    pub fn is_due(self, hour: u64) -> bool {
        const TAX_PERIOD_HOURS: u64 = 30 * 24;
        match self {
            TaxSchedule::Once => hour == TAX_PERIOD_HOURS,
            TaxSchedule::EveryThirtiethDay => hour > 0 && hour % TAX_PERIOD_HOURS == 0,
        }
    }
}

/// Economic side-model knobs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub tax_schedule: TaxSchedule,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a path, or use defaults if it cannot be read
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", path.display(), e);
            Self::default()
        })
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Total run length in hours
    pub fn total_hours(&self) -> u64 {
        (self.phases.pre_flood_days + self.phases.flood_days + self.phases.post_flood_days) * 24
    }

    /// Reject configurations the simulation cannot start from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population.size == 0 {
            return Err(ConfigError::Invalid("population.size must be positive".into()));
        }
        if self.town.houses == 0 || self.town.businesses == 0 || self.town.schools == 0 {
            return Err(ConfigError::Invalid(
                "town needs at least one house, business and school".into(),
            ));
        }
        for (name, pct) in [
            ("shelter_capacity_pct", self.facilities.shelter_capacity_pct),
            ("healthcare_capacity_pct", self.facilities.healthcare_capacity_pct),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(ConfigError::Invalid(format!(
                    "facilities.{} must lie in [0, 100], got {}",
                    name, pct
                )));
            }
        }
        if self.town.extent <= 0.0 || self.town.building_radius <= 0.0 {
            return Err(ConfigError::Invalid("town extent and building radius must be positive".into()));
        }
        if self.flood.max_depth < self.flood.min_depth {
            return Err(ConfigError::Invalid("flood.max_depth is below flood.min_depth".into()));
        }
        if self.phases.flood_days == 0 {
            return Err(ConfigError::Invalid("phases.flood_days must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.rescue.recovery_threshold) {
            return Err(ConfigError::Invalid(format!(
                "rescue.recovery_threshold must lie in [0, 1], got {}",
                self.rescue.recovery_threshold
            )));
        }
        if self.funding.reserve_days < 0.0 {
            return Err(ConfigError::Invalid("funding.reserve_days must not be negative".into()));
        }
        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.population.size, 300);
        assert_eq!(config.rescue.hours_before_rescue, 2);
        assert_eq!(config.total_hours(), (8 + 10 + 14) * 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_str(
            r#"
            [population]
            size = 50

            [economy]
            tax_schedule = "every_thirtieth_day"
            "#,
        )
        .unwrap();

        assert_eq!(config.population.size, 50);
        assert_eq!(config.economy.tax_schedule, TaxSchedule::EveryThirtiethDay);
        assert_eq!(config.phases.flood_days, 10);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let back = Config::from_str(&text).unwrap();
        assert_eq!(back.town.houses, config.town.houses);
    }

    #[test]
    fn test_zero_facilities_is_fatal() {
        let mut config = Config::default();
        config.town.businesses = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_capacity_percentage_bounds() {
        let mut config = Config::default();
        config.facilities.shelter_capacity_pct = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_day_flood_is_fatal() {
        let mut config = Config::default();
        config.phases.flood_days = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_recovery_threshold_bounds() {
        let mut config = Config::default();
        config.rescue.recovery_threshold = 1.5;
        assert!(config.validate().is_err());
        config.rescue.recovery_threshold = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_capacity_rounds_up() {
        assert_eq!(FacilityConfig::capacity_for(1.0, 300), 3);
        assert_eq!(FacilityConfig::capacity_for(0.3, 300), 1);
        assert_eq!(FacilityConfig::capacity_for(0.0, 300), 0);
    }

    #[test]
    fn test_tax_schedule_fires_once() {
        assert!(TaxSchedule::Once.is_due(720));
        assert!(!TaxSchedule::Once.is_due(1440));
        assert!(!TaxSchedule::Once.is_due(0));

        assert!(TaxSchedule::EveryThirtiethDay.is_due(720));
        assert!(TaxSchedule::EveryThirtiethDay.is_due(1440));
        assert!(!TaxSchedule::EveryThirtiethDay.is_due(0));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_or_default("definitely/not/here.toml");
        assert_eq!(config.population.size, 300);
    }
}
