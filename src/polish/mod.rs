//! Polishing flow built on the scheduler.
//!
//! - [`Polisher`]: validates the config, lays batches out over devices, runs the
//!   overlap phase and the consensus phase
//! - [`assemble`]: turns the per-window results into one record per target
//! - [`PolishConfig`]: run configuration, loadable from JSON
//!
//! ## Example
//!
//! ```rust
//! use polish_sched::polish::{PolishConfig, Polisher};
//! use polish_sched::testing::{SyntheticAccelerator, SyntheticEngine, SyntheticWorkload};
//!
//! let workload = SyntheticWorkload::generate(2, 1_000, 500, 8, 42);
//! let polisher = Polisher::new(
//!     PolishConfig::default(),
//!     SyntheticAccelerator::new(1),
//!     |_| SyntheticEngine::default(),
//! )
//! .unwrap();
//!
//! let outcome = polisher.polish(workload.windows, &workload.targets).unwrap();
//! assert_eq!(outcome.sequences.len(), 2);
//! ```

pub mod assemble;
pub mod config;
pub mod polisher;

pub use assemble::{assemble, AssembleError, AssembleOptions};
pub use config::{ConfigError, PolishConfig};
pub use polisher::{PolishError, PolishOutcome, Polisher};
