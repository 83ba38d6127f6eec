//! Run configuration with eager validation.

use crate::error::PropertyError;

/// Base configuration shared by every runner: an optional fixed seed and
/// the number of trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Seed for the top-level random source. `None` derives one from the
    /// clock; pin it to reproduce a prior run.
    pub seed: Option<u32>,
    /// Number of generate-and-check trials.
    pub runs: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            runs: 100,
        }
    }
}

impl RunConfig {
    /// Validate the configuration. Called by every run entry point before
    /// any value is generated.
    pub fn validate(&self) -> Result<(), PropertyError> {
        if self.runs == 0 {
            return Err(PropertyError::config("runs must be positive", "runs"));
        }
        Ok(())
    }
}

/// Configuration for property runs: [`RunConfig`] plus a shrink budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyConfig {
    pub seed: Option<u32>,
    pub runs: u32,
    /// Upper bound on shrink attempts; every evaluated candidate consumes
    /// one unit whether or not it fails.
    pub max_shrinks: u32,
}

impl Default for PropertyConfig {
    fn default() -> Self {
        Self {
            seed: None,
            runs: 100,
            max_shrinks: 1000,
        }
    }
}

impl PropertyConfig {
    /// Start from defaults with a pinned seed.
    pub fn seeded(seed: u32) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn with_runs(mut self, runs: u32) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_max_shrinks(mut self, max_shrinks: u32) -> Self {
        self.max_shrinks = max_shrinks;
        self
    }

    /// Validate the configuration before any generation happens.
    pub fn validate(&self) -> Result<(), PropertyError> {
        if self.runs == 0 {
            return Err(PropertyError::config("runs must be positive", "runs"));
        }
        if self.max_shrinks == 0 {
            return Err(PropertyError::config(
                "max_shrinks must be positive",
                "max_shrinks",
            ));
        }
        Ok(())
    }
}

impl From<RunConfig> for PropertyConfig {
    fn from(run: RunConfig) -> Self {
        Self {
            seed: run.seed,
            runs: run.runs,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PropertyConfig::default();
        assert_eq!(config.runs, 100);
        assert_eq!(config.max_shrinks, 1000);
        assert!(config.seed.is_none());
    }

    #[test]
    fn zero_runs_rejected() {
        let config = PropertyConfig::default().with_runs(0);
        assert!(matches!(
            config.validate(),
            Err(PropertyError::Config { .. })
        ));
    }

    #[test]
    fn zero_shrink_budget_rejected() {
        let config = PropertyConfig::default().with_max_shrinks(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn run_config_promotes_to_property_config() {
        let base = RunConfig {
            seed: Some(9),
            runs: 3,
        };
        let config = PropertyConfig::from(base);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.runs, 3);
        assert_eq!(config.max_shrinks, 1000);
    }
}
