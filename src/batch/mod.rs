//! Accelerator batch units.
//!
//! A batch unit is a fixed-capacity container that accepts work items until it is
//! full, executes them as one accelerator operation and reports per-item success.
//! Both flavors (overlap aligner and window consensus) implement [`BatchUnit`], so
//! the cursor and runner logic in [`crate::schedule`] is written once.
//!
//! ## Lifecycle of one round
//!
//! ```text
//! reset -> try_add* -> execute -> results -> write_back
//! ```
//!
//! [`Accelerator`] creates batch units bound to a device.

pub mod accelerator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{BatchId, DeviceId};

pub use accelerator::Accelerator;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("device {device} error: {message}")]
    Device { device: DeviceId, message: String },

    #[error("batch {batch} failed to allocate: {message}")]
    Allocation { batch: BatchId, message: String },

    #[error("batch {batch} execution failed: {message}")]
    Execution { batch: BatchId, message: String },
}

/// Which kind of work a batch unit processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchFlavor {
    OverlapAligner,
    WindowConsensus,
}

impl std::fmt::Display for BatchFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverlapAligner => write!(f, "overlaps"),
            Self::WindowConsensus => write!(f, "windows"),
        }
    }
}

/// Capability shared by both batch flavors.
pub trait BatchUnit {
    type Item;

    /// Clear the previous assignment. Calling it repeatedly has the same effect as
    /// calling it once.
    fn reset(&mut self);

    /// Insert one item if it fits. Never partially inserts.
    fn try_add(&mut self, item: &Self::Item) -> bool;

    fn has_items(&self) -> bool;

    /// Run the accelerator computation for all held items. May block for a long time.
    ///
    /// # Errors
    ///
    /// Returns a `BatchError` if the device failed; per-item failures are reported
    /// through [`BatchUnit::results`] instead.
    fn execute(&mut self) -> Result<(), BatchError>;

    /// One flag per inserted item, in insertion order. Only meaningful after
    /// [`BatchUnit::execute`].
    fn results(&self) -> &[bool];

    /// Move computed outputs into the items this batch was filled from.
    /// `items` holds exactly the assigned items, in insertion order.
    fn write_back(&mut self, items: &mut [Self::Item]);

    fn id(&self) -> BatchId;

    fn flavor(&self) -> BatchFlavor;
}

/// Alignment scores handed to consensus batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scoring {
    pub match_score: i8,
    pub mismatch: i8,
    pub gap: i8,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            match_score: 3,
            mismatch: -5,
            gap: -4,
        }
    }
}

/// Capacity of a window-consensus batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowBatchLimits {
    /// Maximum number of windows per batch
    pub max_windows: u32,
    /// Maximum number of sequences per window on the accelerator
    pub max_depth_per_window: u32,
}

impl Default for WindowBatchLimits {
    fn default() -> Self {
        Self {
            max_windows: 256,
            max_depth_per_window: 200,
        }
    }
}

/// Capacity of an overlap-aligner batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapBatchLimits {
    pub max_query_length: u32,
    pub max_target_length: u32,
    /// Maximum number of alignments per batch
    pub max_alignments: u32,
}

impl Default for OverlapBatchLimits {
    fn default() -> Self {
        Self {
            max_query_length: 20_000,
            max_target_length: 20_000,
            max_alignments: 1000,
        }
    }
}
