//! Model run configuration.

use attest::PropertyError;

/// Configuration for model-based runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Seed for the top-level random source; `None` derives one from the
    /// clock.
    pub seed: Option<u32>,
    /// Number of episodes.
    pub runs: u32,
    /// Maximum commands per episode.
    pub max_commands: u32,
    /// Budget for shrink candidate evaluations, shared by both shrink
    /// phases.
    pub max_shrinks: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seed: None,
            runs: 100,
            max_commands: 20,
            max_shrinks: 1000,
        }
    }
}

impl ModelConfig {
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

    pub fn with_max_commands(mut self, max_commands: u32) -> Self {
        self.max_commands = max_commands;
        self
    }

    pub fn with_max_shrinks(mut self, max_shrinks: u32) -> Self {
        self.max_shrinks = max_shrinks;
        self
    }

    /// Validate before any episode is generated.
    pub fn validate(&self) -> Result<(), PropertyError> {
        if self.runs == 0 {
            return Err(PropertyError::config("runs must be positive", "runs"));
        }
        if self.max_commands == 0 {
            return Err(PropertyError::config(
                "max_commands must be positive",
                "max_commands",
            ));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.runs, 100);
        assert_eq!(config.max_commands, 20);
        assert_eq!(config.max_shrinks, 1000);
    }

    #[test]
    fn zero_fields_are_rejected() {
        assert!(ModelConfig::default().with_runs(0).validate().is_err());
        assert!(ModelConfig::default()
            .with_max_commands(0)
            .validate()
            .is_err());
        assert!(ModelConfig::default()
            .with_max_shrinks(0)
            .validate()
            .is_err());
    }
}
