//! Tool configuration.
//!
//! Handles loading and validating `imgpress.toml`. Config files are sparse —
//! every field has a default and users override only what they want:
//!
//! ```toml
//! [solver]
//! max_attempts = 10        # Encode attempts when a target size is set
//! quality_floor = 10       # Lowest quality the search will try
//! quality_step = 10        # Quality decrement between attempts
//! deliver_oversized = true # Keep the best attempt when the target is missed
//!
//! [intake]
//! max_source_bytes = 10485760  # Absolute source-size ceiling (10 MiB)
//!
//! [processing]
//! max_processes = 4        # Max parallel workers in batch mode (omit for auto)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::solver::SolverSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `imgpress.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressorConfig {
    /// Quality-search settings.
    pub solver: SolverConfig,
    /// Source intake limits.
    pub intake: IntakeConfig,
    /// Parallel processing settings for batch mode.
    pub processing: ProcessingConfig,
}

impl CompressorConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "solver.max_attempts must be at least 1".into(),
            ));
        }
        if self.solver.quality_floor == 0 || self.solver.quality_floor > 100 {
            return Err(ConfigError::Validation(
                "solver.quality_floor must be 1-100".into(),
            ));
        }
        if self.solver.quality_step == 0 {
            return Err(ConfigError::Validation(
                "solver.quality_step must be at least 1".into(),
            ));
        }
        if self.intake.max_source_bytes == 0 {
            return Err(ConfigError::Validation(
                "intake.max_source_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Quality-search settings (`[solver]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Encode attempts allowed when a target size is requested.
    pub max_attempts: u32,
    /// Lowest quality the search will try.
    pub quality_floor: u32,
    /// Quality decrement between attempts.
    pub quality_step: u32,
    /// Whether an exhausted budget still delivers the (oversized) best
    /// attempt, flagged as such, instead of failing the request.
    pub deliver_oversized: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            quality_floor: 10,
            quality_step: 10,
            deliver_oversized: true,
        }
    }
}

impl From<&SolverConfig> for SolverSettings {
    fn from(config: &SolverConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            quality_floor: config.quality_floor,
            quality_step: config.quality_step,
            deliver_oversized: config.deliver_oversized,
        }
    }
}

/// Source intake limits (`[intake]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeConfig {
    /// Absolute ceiling on staged source files, in bytes.
    pub max_source_bytes: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_source_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Parallel processing settings (`[processing]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel encode workers in batch mode.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// A stock `imgpress.toml` with every option documented, printed by the
/// `gen-config` subcommand.
pub fn stock_config_toml() -> &'static str {
    r#"# imgpress configuration. Every option is optional; defaults shown.

[solver]
# Encode attempts allowed when a target size is requested.
max_attempts = 10
# Lowest quality the search will try.
quality_floor = 10
# Quality decrement between attempts.
quality_step = 10
# When the attempt budget runs out: true keeps the best (oversized) attempt
# and reports target_met = false; false fails the request instead.
deliver_oversized = true

[intake]
# Absolute ceiling on source files, in bytes (default 10 MiB).
max_source_bytes = 10485760

[processing]
# Max parallel workers in batch mode. Omit for one per CPU core.
# max_processes = 4
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CompressorConfig::default();
        assert_eq!(config.solver.max_attempts, 10);
        assert_eq!(config.solver.quality_floor, 10);
        assert_eq!(config.solver.quality_step, 10);
        assert!(config.solver.deliver_oversized);
        assert_eq!(config.intake.max_source_bytes, 10 * 1024 * 1024);
        assert_eq!(config.processing.max_processes, None);
        config.validate().unwrap();
    }

    #[test]
    fn sparse_config_overrides_only_named_values() {
        let config: CompressorConfig = toml::from_str(
            r#"
            [solver]
            deliver_oversized = false
            "#,
        )
        .unwrap();
        assert!(!config.solver.deliver_oversized);
        assert_eq!(config.solver.max_attempts, 10);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<CompressorConfig, _> = toml::from_str(
            r#"
            [solver]
            max_atempts = 5
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_bad_ranges() {
        let mut config = CompressorConfig::default();
        config.solver.quality_floor = 0;
        assert!(config.validate().is_err());

        let mut config = CompressorConfig::default();
        config.solver.quality_floor = 101;
        assert!(config.validate().is_err());

        let mut config = CompressorConfig::default();
        config.solver.quality_step = 0;
        assert!(config.validate().is_err());

        let mut config = CompressorConfig::default();
        config.solver.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = CompressorConfig::default();
        config.intake.max_source_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let parsed: CompressorConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = CompressorConfig::default();
        assert_eq!(parsed.solver.max_attempts, defaults.solver.max_attempts);
        assert_eq!(parsed.solver.quality_floor, defaults.solver.quality_floor);
        assert_eq!(
            parsed.intake.max_source_bytes,
            defaults.intake.max_source_bytes
        );
        assert_eq!(parsed.processing.max_processes, None);
    }

    #[test]
    fn solver_settings_mirror_config() {
        let config = SolverConfig {
            max_attempts: 4,
            quality_floor: 20,
            quality_step: 5,
            deliver_oversized: false,
        };
        let settings = SolverSettings::from(&config);
        assert_eq!(settings.max_attempts, 4);
        assert_eq!(settings.quality_floor, 20);
        assert_eq!(settings.quality_step, 5);
        assert!(!settings.deliver_oversized);
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let auto = effective_threads(&ProcessingConfig::default());
        assert!(auto >= 1);

        let constrained = effective_threads(&ProcessingConfig {
            max_processes: Some(1),
        });
        assert_eq!(constrained, 1);

        let oversized = effective_threads(&ProcessingConfig {
            max_processes: Some(100_000),
        });
        assert!(oversized <= auto);
    }
}
