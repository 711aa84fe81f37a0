use thiserror::Error;
use tracing::info;

use crate::batch::accelerator::EngineOf;
use crate::batch::{Accelerator, BatchError};
use crate::core::item::{Overlap, Window};
use crate::core::output::{PolishedSequence, TargetSummary};
use crate::core::types::WorkerSlot;
use crate::polish::assemble::{assemble, AssembleError};
use crate::polish::config::{ConfigError, PolishConfig};
use crate::schedule::{self, DeviceLayout, HostPool, LayoutError, PhaseReport, ScheduleError};

#[derive(Error, Debug)]
pub enum PolishError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Result of the consensus phase
#[derive(Debug, Clone)]
pub struct PolishOutcome {
    pub sequences: Vec<PolishedSequence>,
    pub report: PhaseReport,
}

/// Runs both polishing phases over an accelerator and a host pool.
///
/// Construction checks the config, lays batches out over the devices and binds
/// one engine to every host worker, so all fatal preconditions surface before
/// any work is scheduled.
pub struct Polisher<A: Accelerator> {
    config: PolishConfig,
    accelerator: A,
    layout: DeviceLayout,
    pool: HostPool<EngineOf<A>>,
}

impl<A: Accelerator> Polisher<A> {
    /// # Errors
    ///
    /// Returns `PolishError::Config` for an invalid config, `PolishError::Layout`
    /// when the accelerator reports no devices, and `PolishError::Schedule` if the
    /// host pool cannot be built.
    pub fn new<F>(config: PolishConfig, accelerator: A, make_engine: F) -> Result<Self, PolishError>
    where
        F: FnMut(WorkerSlot) -> EngineOf<A>,
    {
        config.validate()?;

        let devices = accelerator.device_count();
        let layout = DeviceLayout::round_robin(config.accelerator_batches, devices)?;
        info!(
            "Using {} accelerator device(s) for {} batches",
            devices,
            layout.len()
        );

        let pool = HostPool::new(config.num_threads, make_engine)?;

        Ok(Self {
            config,
            accelerator,
            layout,
            pool,
        })
    }

    pub fn config(&self) -> &PolishConfig {
        &self.config
    }

    pub fn layout(&self) -> &DeviceLayout {
        &self.layout
    }

    /// Align overlaps and find their window breaking points.
    ///
    /// # Errors
    ///
    /// Returns the first batch allocation or scheduling error.
    pub fn align_overlaps(&self, overlaps: &mut [A::Overlap]) -> Result<PhaseReport, PolishError> {
        let mut batches = self
            .layout
            .slots
            .iter()
            .map(|&slot| {
                self.accelerator.overlap_batch(
                    slot,
                    &self.config.overlap_batch,
                    self.config.window_length,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!("allocated {} overlap batches", batches.len());

        let window_length = self.config.window_length;
        let board = schedule::dispatch(overlaps, &mut batches, &self.pool, |overlap, engine| {
            overlap.find_breaking_points(engine, window_length)
        })?;

        let report = board.report();
        info!(
            "aligned {} overlaps ({} on accelerator, {} on host)",
            report.total,
            report.accelerated,
            report.fallback()
        );
        Ok(report)
    }

    /// Generate consensus for every window and assemble one record per target.
    ///
    /// `targets[id]` describes the target with `sequence_id() == id`.
    ///
    /// # Errors
    ///
    /// Returns the first batch allocation, scheduling or assembly error. No
    /// records are returned from a run that failed.
    pub fn polish(
        &self,
        mut windows: Vec<A::Window>,
        targets: &[TargetSummary],
    ) -> Result<PolishOutcome, PolishError> {
        let mut batches = self
            .layout
            .slots
            .iter()
            .map(|&slot| {
                self.accelerator.window_batch(
                    slot,
                    &self.config.window_batch,
                    self.config.scoring,
                    self.config.banded_alignment,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!("allocated {} consensus batches", batches.len());

        let board = schedule::dispatch(&mut windows, &mut batches, &self.pool, |window, engine| {
            window.generate_consensus(engine)
        })?;
        drop(batches);

        let report = board.report();
        let sequences = assemble(windows, &board, targets, self.config.assemble_options())?;
        info!(
            "polished {} sequences from {} windows ({} on host)",
            sequences.len(),
            report.total,
            report.fallback()
        );

        Ok(PolishOutcome { sequences, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SyntheticAccelerator, SyntheticEngine, SyntheticWorkload};

    fn config() -> PolishConfig {
        PolishConfig {
            accelerator_batches: 3,
            num_threads: 2,
            window_length: 100,
            ..PolishConfig::default()
        }
    }

    #[test]
    fn test_no_devices_is_fatal() {
        let result = Polisher::new(config(), SyntheticAccelerator::new(0), |_| {
            SyntheticEngine::default()
        });
        assert!(matches!(
            result,
            Err(PolishError::Layout(LayoutError::NoDevices))
        ));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let bad = PolishConfig {
            num_threads: 0,
            ..config()
        };
        let result = Polisher::new(bad, SyntheticAccelerator::new(1), |_| {
            SyntheticEngine::default()
        });
        assert!(matches!(result, Err(PolishError::Config(_))));
    }

    #[test]
    fn test_full_run_emits_one_record_per_target() {
        let workload = SyntheticWorkload::generate(4, 1000, 100, 6, 7);
        let polisher = Polisher::new(config(), SyntheticAccelerator::new(2), |_| {
            SyntheticEngine::default()
        })
        .unwrap();
        assert_eq!(polisher.layout().devices, 2);

        let mut overlaps = workload.overlaps;
        let overlap_report = polisher.align_overlaps(&mut overlaps).unwrap();
        assert_eq!(overlap_report.total, overlaps.len());
        assert_eq!(overlap_report.unattempted, 0);
        assert!(overlaps.iter().all(|o| !o.breaking_points.is_empty()));

        let outcome = polisher.polish(workload.windows, &workload.targets).unwrap();
        assert_eq!(outcome.sequences.len(), 4);
        assert_eq!(outcome.report.unattempted, 0);
        for (sequence, target) in outcome.sequences.iter().zip(&workload.targets) {
            assert!(sequence.name.starts_with(&target.name));
            assert_eq!(sequence.len(), 1000);
        }
    }

    #[test]
    fn test_integrity_violation_aborts_without_output() {
        let workload = SyntheticWorkload::generate(2, 500, 100, 6, 1);
        let polisher = Polisher::new(
            config(),
            SyntheticAccelerator::new(1).with_short_results(),
            |_| SyntheticEngine::default(),
        )
        .unwrap();

        let result = polisher.polish(workload.windows, &workload.targets);
        assert!(matches!(
            result,
            Err(PolishError::Schedule(
                ScheduleError::IntegrityViolation { .. }
            ))
        ));
    }

    #[test]
    fn test_long_overlaps_fall_back_to_host() {
        let workload = SyntheticWorkload::generate(4, 1000, 100, 6, 7);
        let mut short_limits = config();
        short_limits.overlap_batch.max_query_length = 300;
        let polisher = Polisher::new(short_limits, SyntheticAccelerator::new(2), |_| {
            SyntheticEngine::default()
        })
        .unwrap();

        let mut overlaps = workload.overlaps;
        let long = overlaps.iter().filter(|o| o.length > 300).count();
        assert!(long > 0);

        let report = polisher.align_overlaps(&mut overlaps).unwrap();
        assert_eq!(report.fallback_succeeded, long);
        assert_eq!(report.fallback_failed, 0);
        assert_eq!(report.accelerated, overlaps.len() - long);
        for overlap in &overlaps {
            assert_eq!(overlap.aligned_on_host, overlap.length > 300);
            assert!(!overlap.breaking_points.is_empty());
        }
    }
}
