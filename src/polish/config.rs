use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::batch::{OverlapBatchLimits, Scoring, WindowBatchLimits};
use crate::core::types::PolisherType;
use crate::polish::assemble::AssembleOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Default window length used to split targets
pub const DEFAULT_WINDOW_LENGTH: u32 = 500;

/// Configuration for a polishing run.
///
/// Every field has a default, so a JSON file only needs the values it changes:
///
/// ```
/// use polish_sched::polish::config::PolishConfig;
///
/// let config = PolishConfig::from_json(r#"{"accelerator_batches": 4}"#).unwrap();
/// assert_eq!(config.accelerator_batches, 4);
/// assert_eq!(config.window_length, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolishConfig {
    pub polisher_type: PolisherType,

    /// Length of the windows targets are split into
    pub window_length: u32,

    /// Host threads used for fallback work
    pub num_threads: usize,

    /// Accelerator batch units, spread round-robin over the devices
    pub accelerator_batches: usize,

    /// Use banded alignment in consensus batches
    pub banded_alignment: bool,

    /// Do not emit targets for which no window was polished
    pub drop_unpolished_sequences: bool,

    pub scoring: Scoring,

    pub window_batch: WindowBatchLimits,

    pub overlap_batch: OverlapBatchLimits,
}

impl Default for PolishConfig {
    fn default() -> Self {
        Self {
            polisher_type: PolisherType::default(),
            window_length: DEFAULT_WINDOW_LENGTH,
            num_threads: 1,
            accelerator_batches: 1,
            banded_alignment: false,
            drop_unpolished_sequences: false,
            scoring: Scoring::default(),
            window_batch: WindowBatchLimits::default(),
            overlap_batch: OverlapBatchLimits::default(),
        }
    }
}

impl PolishConfig {
    /// Parse and validate a config from JSON
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for malformed JSON and
    /// `ConfigError::Invalid` if a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read, otherwise as
    /// [`PolishConfig::from_json`].
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_length == 0 {
            return Err(ConfigError::Invalid(
                "window_length must be positive".to_string(),
            ));
        }
        if self.num_threads == 0 {
            return Err(ConfigError::Invalid(
                "num_threads must be at least 1".to_string(),
            ));
        }
        if self.accelerator_batches == 0 {
            return Err(ConfigError::Invalid(
                "accelerator_batches must be at least 1".to_string(),
            ));
        }
        if self.window_batch.max_windows == 0 || self.window_batch.max_depth_per_window == 0 {
            return Err(ConfigError::Invalid(
                "window_batch limits must be positive".to_string(),
            ));
        }
        if self.overlap_batch.max_alignments == 0
            || self.overlap_batch.max_query_length == 0
            || self.overlap_batch.max_target_length == 0
        {
            return Err(ConfigError::Invalid(
                "overlap_batch limits must be positive".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            polisher_type: self.polisher_type,
            drop_unpolished_sequences: self.drop_unpolished_sequences,
        }
    }
}
