use crate::batch::{BatchError, BatchUnit, OverlapBatchLimits, Scoring, WindowBatchLimits};
use crate::core::item::{Overlap, Window};
use crate::core::types::BatchSlot;

/// Engine type shared by an accelerator's windows and overlaps
pub type EngineOf<A> = <<A as Accelerator>::Window as Window>::Engine;

/// The accelerator backend: reports its devices and builds batch units on them.
///
/// Batch construction happens before any scheduling starts, so allocation
/// failures surface before work is handed out.
pub trait Accelerator {
    type Window: Window;
    type Overlap: Overlap<Engine = <Self::Window as Window>::Engine>;
    type WindowBatch: BatchUnit<Item = Self::Window> + Send;
    type OverlapBatch: BatchUnit<Item = Self::Overlap> + Send;

    /// Number of usable devices; zero is fatal for the polisher
    fn device_count(&self) -> usize;

    /// Create an overlap-aligner batch on `slot.device`. Executing it aligns the
    /// held overlaps and splits them at `window_length` boundaries.
    ///
    /// # Errors
    ///
    /// Returns a `BatchError` if the device cannot host the batch.
    fn overlap_batch(
        &self,
        slot: BatchSlot,
        limits: &OverlapBatchLimits,
        window_length: u32,
    ) -> Result<Self::OverlapBatch, BatchError>;

    /// Create a window-consensus batch on `slot.device`
    ///
    /// # Errors
    ///
    /// Returns a `BatchError` if the device cannot host the batch.
    fn window_batch(
        &self,
        slot: BatchSlot,
        limits: &WindowBatchLimits,
        scoring: Scoring,
        banded_alignment: bool,
    ) -> Result<Self::WindowBatch, BatchError>;
}
