//! Core data types shared by the scheduler and the polisher.
//!
//! - [`Window`], [`Overlap`]: contracts required from the two kinds of work item
//! - [`BatchId`], [`DeviceId`], [`WorkerSlot`], [`BatchSlot`]: identities of the
//!   execution resources
//! - [`ItemState`]: per-item lifecycle tracked by the status board
//! - [`TargetSummary`], [`PolishedSequence`]: assembler input and output
//!
//! [`Window`]: item::Window
//! [`Overlap`]: item::Overlap
//! [`BatchId`]: types::BatchId
//! [`DeviceId`]: types::DeviceId
//! [`WorkerSlot`]: types::WorkerSlot
//! [`BatchSlot`]: types::BatchSlot
//! [`ItemState`]: types::ItemState
//! [`TargetSummary`]: output::TargetSummary
//! [`PolishedSequence`]: output::PolishedSequence

pub mod item;
pub mod output;
pub mod types;
