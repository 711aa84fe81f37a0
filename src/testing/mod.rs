//! Synthetic accelerator and work items.
//!
//! Deterministic stand-ins for the real accelerator kernels, used by the
//! `simulate` command and by tests. A window "polishes" to its backbone; what is
//! modelled faithfully is when each path succeeds or fails:
//!
//! - fewer than [`MIN_CONSENSUS_DEPTH`] sequences: no consensus on either path
//! - deeper than the batch's depth limit: the accelerator fails, the host succeeds
//! - overlaps longer than the batch's length limit: the accelerator fails, the
//!   host succeeds

pub mod workload;

use crate::batch::{
    Accelerator, BatchError, BatchFlavor, BatchUnit, OverlapBatchLimits, Scoring,
    WindowBatchLimits,
};
use crate::core::item::{Overlap, Window};
use crate::core::types::{BatchId, BatchSlot};

pub use workload::SyntheticWorkload;

/// Windows with fewer sequences than this produce no consensus
pub const MIN_CONSENSUS_DEPTH: u32 = 3;

/// Host engine that counts the work it was given
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyntheticEngine {
    pub windows: usize,
    pub overlaps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticWindow {
    pub sequence_id: usize,
    pub rank: u32,
    pub backbone: String,
    /// Number of sequences aligned to the window, backbone included
    pub depth: u32,
    pub consensus: String,
    pub polished_by_accelerator: bool,
    pub polished_on_host: bool,
}

impl SyntheticWindow {
    pub fn new(sequence_id: usize, rank: u32, backbone: &str, depth: u32) -> Self {
        Self {
            sequence_id,
            rank,
            backbone: backbone.to_string(),
            depth,
            consensus: String::new(),
            polished_by_accelerator: false,
            polished_on_host: false,
        }
    }

    /// A window whose consensus text is already known
    pub fn with_consensus(sequence_id: usize, rank: u32, consensus: &str) -> Self {
        Self {
            consensus: consensus.to_string(),
            ..Self::new(sequence_id, rank, consensus, MIN_CONSENSUS_DEPTH)
        }
    }
}

impl Window for SyntheticWindow {
    type Engine = SyntheticEngine;

    fn generate_consensus(&mut self, engine: &mut SyntheticEngine) -> bool {
        engine.windows += 1;
        self.consensus.clone_from(&self.backbone);
        self.polished_on_host = self.depth >= MIN_CONSENSUS_DEPTH;
        self.polished_on_host
    }

    fn consensus(&self) -> &str {
        &self.consensus
    }

    fn rank(&self) -> u32 {
        self.rank
    }

    fn sequence_id(&self) -> usize {
        self.sequence_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticOverlap {
    pub query_id: usize,
    pub target_id: usize,
    pub length: u32,
    /// `(start, end)` of each window-sized piece of the alignment
    pub breaking_points: Vec<(u32, u32)>,
    pub aligned_on_host: bool,
}

impl SyntheticOverlap {
    pub fn new(query_id: usize, target_id: usize, length: u32) -> Self {
        Self {
            query_id,
            target_id,
            length,
            breaking_points: Vec::new(),
            aligned_on_host: false,
        }
    }
}

fn breaking_points(length: u32, window_length: u32) -> Vec<(u32, u32)> {
    (0..length)
        .step_by(window_length.max(1) as usize)
        .map(|start| (start, start.saturating_add(window_length).min(length)))
        .collect()
}

impl Overlap for SyntheticOverlap {
    type Engine = SyntheticEngine;

    fn find_breaking_points(&mut self, engine: &mut SyntheticEngine, window_length: u32) -> bool {
        engine.overlaps += 1;
        self.breaking_points = breaking_points(self.length, window_length);
        self.aligned_on_host = !self.breaking_points.is_empty();
        self.aligned_on_host
    }

    fn query_id(&self) -> usize {
        self.query_id
    }

    fn target_id(&self) -> usize {
        self.target_id
    }
}

/// Window-consensus batch holding up to `capacity` windows
#[derive(Debug, Clone)]
pub struct SyntheticBatch {
    id: BatchId,
    capacity: usize,
    max_depth: u32,
    /// (depth, backbone) of each held window
    held: Vec<(u32, String)>,
    results: Vec<bool>,
    drop_last_result: bool,
    failure: Option<ExecuteFailure>,
}

/// How a synthetic batch breaks when executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecuteFailure {
    Error,
    Panic,
}

impl SyntheticBatch {
    pub fn with_capacity(id: u32, capacity: usize) -> Self {
        Self {
            id: BatchId(id),
            capacity,
            max_depth: WindowBatchLimits::default().max_depth_per_window,
            held: Vec::new(),
            results: Vec::new(),
            drop_last_result: false,
            failure: None,
        }
    }

    /// Windows deeper than `max_depth` fail on this batch
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Report one result fewer than the batch held, breaking the result contract
    #[must_use]
    pub fn dropping_last_result(mut self) -> Self {
        self.drop_last_result = true;
        self
    }

    /// `execute` returns `BatchError::Execution` on every round
    #[must_use]
    pub fn failing_execution(mut self) -> Self {
        self.failure = Some(ExecuteFailure::Error);
        self
    }

    /// `execute` panics on every round
    #[must_use]
    pub fn panicking_execution(mut self) -> Self {
        self.failure = Some(ExecuteFailure::Panic);
        self
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl BatchUnit for SyntheticBatch {
    type Item = SyntheticWindow;

    fn reset(&mut self) {
        self.held.clear();
        self.results.clear();
    }

    fn try_add(&mut self, window: &SyntheticWindow) -> bool {
        if self.held.len() >= self.capacity {
            return false;
        }
        self.held.push((window.depth, window.backbone.clone()));
        true
    }

    fn has_items(&self) -> bool {
        !self.held.is_empty()
    }

    fn execute(&mut self) -> Result<(), BatchError> {
        match self.failure {
            Some(ExecuteFailure::Error) => {
                return Err(BatchError::Execution {
                    batch: self.id,
                    message: "synthetic kernel failure".to_string(),
                })
            }
            Some(ExecuteFailure::Panic) => panic!("batch {} kernel crashed", self.id),
            None => {}
        }
        self.results = self
            .held
            .iter()
            .map(|(depth, _)| (MIN_CONSENSUS_DEPTH..=self.max_depth).contains(depth))
            .collect();
        if self.drop_last_result {
            self.results.pop();
        }
        Ok(())
    }

    fn results(&self) -> &[bool] {
        &self.results
    }

    fn write_back(&mut self, windows: &mut [SyntheticWindow]) {
        for ((window, &ok), (_, backbone)) in windows.iter_mut().zip(&self.results).zip(&self.held)
        {
            if ok {
                window.consensus.clone_from(backbone);
                window.polished_by_accelerator = true;
            }
        }
    }

    fn id(&self) -> BatchId {
        self.id
    }

    fn flavor(&self) -> BatchFlavor {
        BatchFlavor::WindowConsensus
    }
}

/// Overlap-aligner batch holding up to `max_alignments` overlaps
#[derive(Debug, Clone)]
pub struct SyntheticOverlapBatch {
    id: BatchId,
    limits: OverlapBatchLimits,
    window_length: u32,
    held: Vec<u32>,
    results: Vec<bool>,
    drop_last_result: bool,
}

impl SyntheticOverlapBatch {
    pub fn new(id: u32, limits: OverlapBatchLimits, window_length: u32) -> Self {
        Self {
            id: BatchId(id),
            limits,
            window_length,
            held: Vec::new(),
            results: Vec::new(),
            drop_last_result: false,
        }
    }
}

impl BatchUnit for SyntheticOverlapBatch {
    type Item = SyntheticOverlap;

    fn reset(&mut self) {
        self.held.clear();
        self.results.clear();
    }

    fn try_add(&mut self, overlap: &SyntheticOverlap) -> bool {
        if self.held.len() >= self.limits.max_alignments as usize {
            return false;
        }
        self.held.push(overlap.length);
        true
    }

    fn has_items(&self) -> bool {
        !self.held.is_empty()
    }

    fn execute(&mut self) -> Result<(), BatchError> {
        let max_length = self
            .limits
            .max_query_length
            .min(self.limits.max_target_length);
        self.results = self
            .held
            .iter()
            .map(|&length| length > 0 && length <= max_length)
            .collect();
        if self.drop_last_result {
            self.results.pop();
        }
        Ok(())
    }

    fn results(&self) -> &[bool] {
        &self.results
    }

    fn write_back(&mut self, overlaps: &mut [SyntheticOverlap]) {
        for (overlap, &ok) in overlaps.iter_mut().zip(&self.results) {
            if ok {
                overlap.breaking_points = breaking_points(overlap.length, self.window_length);
            }
        }
    }

    fn id(&self) -> BatchId {
        self.id
    }

    fn flavor(&self) -> BatchFlavor {
        BatchFlavor::OverlapAligner
    }
}

/// Accelerator with a fixed number of devices building synthetic batches
#[derive(Debug, Clone)]
pub struct SyntheticAccelerator {
    devices: usize,
    short_results: bool,
}

impl SyntheticAccelerator {
    pub fn new(devices: usize) -> Self {
        Self {
            devices,
            short_results: false,
        }
    }

    /// Every batch built by this accelerator drops its last result
    #[must_use]
    pub fn with_short_results(mut self) -> Self {
        self.short_results = true;
        self
    }

    fn check_device(&self, slot: BatchSlot) -> Result<(), BatchError> {
        if slot.device.0 as usize >= self.devices {
            return Err(BatchError::Device {
                device: slot.device,
                message: "no such device".to_string(),
            });
        }
        Ok(())
    }
}

impl Accelerator for SyntheticAccelerator {
    type Window = SyntheticWindow;
    type Overlap = SyntheticOverlap;
    type WindowBatch = SyntheticBatch;
    type OverlapBatch = SyntheticOverlapBatch;

    fn device_count(&self) -> usize {
        self.devices
    }

    fn overlap_batch(
        &self,
        slot: BatchSlot,
        limits: &OverlapBatchLimits,
        window_length: u32,
    ) -> Result<SyntheticOverlapBatch, BatchError> {
        self.check_device(slot)?;
        if limits.max_alignments == 0 {
            return Err(BatchError::Allocation {
                batch: slot.id,
                message: "overlap batch needs room for at least one alignment".to_string(),
            });
        }
        let mut batch = SyntheticOverlapBatch::new(slot.id.0, *limits, window_length);
        batch.drop_last_result = self.short_results;
        Ok(batch)
    }

    fn window_batch(
        &self,
        slot: BatchSlot,
        limits: &WindowBatchLimits,
        _scoring: Scoring,
        _banded_alignment: bool,
    ) -> Result<SyntheticBatch, BatchError> {
        self.check_device(slot)?;
        if limits.max_windows == 0 {
            return Err(BatchError::Allocation {
                batch: slot.id,
                message: "window batch needs room for at least one window".to_string(),
            });
        }
        let mut batch = SyntheticBatch::with_capacity(slot.id.0, limits.max_windows as usize)
            .with_max_depth(limits.max_depth_per_window);
        batch.drop_last_result = self.short_results;
        Ok(batch)
    }
}
