//! # polish-sched
//!
//! A work scheduler for sequence polishing on accelerator hardware.
//!
//! Polishing splits every target sequence into fixed-length windows, aligns the
//! reads overlapping each window, and computes a consensus per window. Most of
//! that work runs on a small set of accelerator batch units. Batches pull
//! contiguous ranges of work from a shared cursor until the input is exhausted,
//! and anything the accelerator could not finish is retried on a host thread
//! pool where every worker owns its own engine.
//!
//! ## Features
//!
//! - **Disjoint ranges**: each batch fill hands out an exclusive sub-slice, so no
//!   two runners can ever touch the same item
//! - **Per-item status**: every item ends the phase accelerated, polished on the
//!   host, or failed on both paths
//! - **Host fallback**: failed items are claimed once and spread over a rayon pool
//!   with one engine per worker slot
//! - **Ordered assembly**: windows are merged in input order into one record per
//!   target, tagged with length, coverage and polished ratio
//!
//! ## Example
//!
//! ```rust
//! use polish_sched::{PolishConfig, Polisher};
//! use polish_sched::testing::{SyntheticAccelerator, SyntheticEngine, SyntheticWorkload};
//!
//! let config = PolishConfig {
//!     accelerator_batches: 4,
//!     num_threads: 2,
//!     ..PolishConfig::default()
//! };
//! let polisher = Polisher::new(config, SyntheticAccelerator::new(2), |_| {
//!     SyntheticEngine::default()
//! })
//! .unwrap();
//!
//! let workload = SyntheticWorkload::generate(3, 2_000, 500, 10, 7);
//! let mut overlaps = workload.overlaps;
//! polisher.align_overlaps(&mut overlaps).unwrap();
//!
//! let outcome = polisher.polish(workload.windows, &workload.targets).unwrap();
//! for sequence in &outcome.sequences {
//!     println!("{} {:.1}%", sequence.name, sequence.polished_ratio * 100.0);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Work item traits, identifiers and output records
//! - [`batch`]: The accelerator batch contract
//! - [`schedule`]: Cursor, batch runners, status board and host fallback
//! - [`polish`]: Configuration, the two-phase polisher and assembly
//! - [`testing`]: Synthetic accelerator and workloads
//! - [`cli`]: Command-line interface implementation

pub mod batch;
pub mod cli;
pub mod core;
pub mod polish;
pub mod schedule;
pub mod testing;

// Re-export commonly used types for convenience
pub use batch::{Accelerator, BatchError, BatchUnit};
pub use core::item::{Overlap, Window};
pub use core::output::{PolishedSequence, TargetSummary};
pub use core::types::*;
pub use polish::{PolishConfig, PolishError, PolishOutcome, Polisher};
pub use schedule::{dispatch, HostPool, PhaseReport, ScheduleError, StatusBoard, WorkCursor};
