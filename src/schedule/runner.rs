use thiserror::Error;
use tracing::{debug, warn};

use crate::batch::{BatchError, BatchUnit};
use crate::core::types::{BatchId, WorkerSlot};
use crate::schedule::cursor::{Assignment, WorkCursor};
use crate::schedule::status::StatusBoard;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("batch {batch} returned {returned} results for {assigned} assigned items")]
    IntegrityViolation {
        batch: BatchId,
        assigned: usize,
        returned: usize,
    },

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("no alignment engine bound to host worker {0}")]
    MissingWorkerContext(WorkerSlot),

    #[error("runner for batch {0} panicked")]
    RunnerPanicked(BatchId),

    #[error("failed to spawn runner thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to build host thread pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}

/// Work done by one runner over a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerStats {
    pub batch: BatchId,
    pub rounds: usize,
    pub items: usize,
}

/// Drives one batch unit: fill, execute, record, until the cursor runs dry.
pub struct BatchRunner<'c, 'a, T> {
    cursor: &'c WorkCursor<'a, T>,
    board: &'c StatusBoard,
}

impl<'c, 'a, T> BatchRunner<'c, 'a, T> {
    pub fn new(cursor: &'c WorkCursor<'a, T>, board: &'c StatusBoard) -> Self {
        Self { cursor, board }
    }

    /// Run rounds on `batch` until a fill yields nothing.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. The cursor is closed before returning so the
    /// other runners stop after their current round.
    pub fn run<B>(&self, batch: &mut B) -> Result<RunnerStats, ScheduleError>
    where
        B: BatchUnit<Item = T>,
    {
        let mut stats = RunnerStats {
            batch: batch.id(),
            rounds: 0,
            items: 0,
        };

        loop {
            let mut assignment = self.cursor.fill(batch);
            if !batch.has_items() {
                let left = self.cursor.total() - self.cursor.assigned();
                if left > 0 && !self.cursor.is_closed() {
                    warn!(
                        "batch {} refused item {} while empty; {} items left for the host",
                        stats.batch,
                        assignment.start(),
                        left
                    );
                }
                break;
            }

            self.board.mark_assigned(&assignment);
            if let Err(e) = self.execute_round(batch, &mut assignment) {
                self.cursor.close();
                return Err(e);
            }
            stats.rounds += 1;
            stats.items += assignment.len();
        }

        debug!(
            "batch {} finished: {} rounds, {} items",
            stats.batch, stats.rounds, stats.items
        );
        Ok(stats)
    }

    fn execute_round<B>(
        &self,
        batch: &mut B,
        assignment: &mut Assignment<'a, T>,
    ) -> Result<(), ScheduleError>
    where
        B: BatchUnit<Item = T>,
    {
        batch.execute()?;
        self.board.record(assignment, batch.id(), batch.results())?;
        batch.write_back(assignment.items_mut());
        Ok(())
    }
}

/// Run one [`BatchRunner`] per batch unit, each on its own thread, and wait for
/// all of them.
///
/// # Errors
///
/// Returns the first error reported by any runner, a panicked runner, or a thread
/// that could not be spawned. All started runners are joined before returning.
pub fn run_batches<T, B>(
    cursor: &WorkCursor<'_, T>,
    board: &StatusBoard,
    batches: &mut [B],
) -> Result<Vec<RunnerStats>, ScheduleError>
where
    T: Send,
    B: BatchUnit<Item = T> + Send,
{
    std::thread::scope(|scope| {
        let mut first_error = None;
        let mut handles = Vec::with_capacity(batches.len());

        for batch in batches.iter_mut() {
            let id = batch.id();
            let runner = BatchRunner::new(cursor, board);
            let spawned = std::thread::Builder::new()
                .name(format!("batch-{id}"))
                .spawn_scoped(scope, move || runner.run(batch));
            match spawned {
                Ok(handle) => handles.push((id, handle)),
                Err(e) => {
                    cursor.close();
                    first_error = Some(ScheduleError::Spawn(e));
                    break;
                }
            }
        }

        let mut stats = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let outcome = handle
                .join()
                .map_err(|_| ScheduleError::RunnerPanicked(id))
                .and_then(|result| result);
            match outcome {
                Ok(s) => stats.push(s),
                Err(e) => {
                    cursor.close();
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ItemState;
    use crate::testing::{SyntheticBatch, SyntheticWindow};

    fn windows(n: usize, depth: u32) -> Vec<SyntheticWindow> {
        (0..n)
            .map(|i| SyntheticWindow::new(0, i as u32, "ACGT", depth))
            .collect()
    }

    #[test]
    fn test_runner_processes_every_item() {
        let mut items = windows(10, 4);
        let board = StatusBoard::new(items.len());
        let cursor = WorkCursor::new(&mut items);
        let mut batch = SyntheticBatch::with_capacity(0, 3);

        let stats = BatchRunner::new(&cursor, &board).run(&mut batch).unwrap();
        assert_eq!(stats.rounds, 4);
        assert_eq!(stats.items, 10);
        assert!(board
            .states()
            .all(|s| s == ItemState::AcceleratorSucceeded));
    }

    #[test]
    fn test_runner_writes_consensus_back() {
        let mut items = windows(3, 4);
        {
            let board = StatusBoard::new(items.len());
            let cursor = WorkCursor::new(&mut items);
            let mut batch = SyntheticBatch::with_capacity(0, 2);
            BatchRunner::new(&cursor, &board).run(&mut batch).unwrap();
        }
        assert!(items.iter().all(|w| w.polished_by_accelerator));
    }

    #[test]
    fn test_short_results_abort_and_close_cursor() {
        let mut items = windows(10, 4);
        let board = StatusBoard::new(items.len());
        let cursor = WorkCursor::new(&mut items);
        let mut batch = SyntheticBatch::with_capacity(2, 4).dropping_last_result();

        let err = BatchRunner::new(&cursor, &board)
            .run(&mut batch)
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::IntegrityViolation {
                assigned: 4,
                returned: 3,
                ..
            }
        ));
        assert!(cursor.is_closed());
    }

    #[test]
    fn test_run_batches_joins_all_runners() {
        let mut items = windows(100, 4);
        let board = StatusBoard::new(items.len());
        let cursor = WorkCursor::new(&mut items);
        let mut batches: Vec<SyntheticBatch> = (0..4)
            .map(|id| SyntheticBatch::with_capacity(id, 7))
            .collect();

        let stats = run_batches(&cursor, &board, &mut batches).unwrap();
        assert_eq!(stats.len(), 4);
        assert_eq!(stats.iter().map(|s| s.items).sum::<usize>(), 100);
        assert_eq!(board.report().accelerated, 100);
    }

    #[test]
    fn test_run_batches_reports_first_failure() {
        let mut items = windows(50, 4);
        let board = StatusBoard::new(items.len());
        let cursor = WorkCursor::new(&mut items);
        let mut batches: Vec<SyntheticBatch> = (0..3)
            .map(|id| SyntheticBatch::with_capacity(id, 5).dropping_last_result())
            .collect();

        let err = run_batches(&cursor, &board, &mut batches).unwrap_err();
        assert!(matches!(err, ScheduleError::IntegrityViolation { .. }));
    }

    #[test]
    fn test_execution_error_closes_cursor() {
        let mut items = windows(10, 4);
        let board = StatusBoard::new(items.len());
        let cursor = WorkCursor::new(&mut items);
        let mut batches = vec![SyntheticBatch::with_capacity(0, 3).failing_execution()];

        let err = run_batches(&cursor, &board, &mut batches).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Batch(BatchError::Execution { batch: BatchId(0), .. })
        ));
        assert!(cursor.is_closed());
        assert_eq!(cursor.assigned(), 3);
        assert_eq!(board.state(0), ItemState::AssignedToBatch);
        assert_eq!(board.state(3), ItemState::Unprocessed);
    }

    #[test]
    fn test_panicking_runner_is_reported_and_closes_cursor() {
        let mut items = windows(10, 4);
        let board = StatusBoard::new(items.len());
        let cursor = WorkCursor::new(&mut items);
        let mut batches = vec![SyntheticBatch::with_capacity(5, 3).panicking_execution()];

        let err = run_batches(&cursor, &board, &mut batches).unwrap_err();
        assert!(matches!(err, ScheduleError::RunnerPanicked(BatchId(5))));
        assert!(cursor.is_closed());
    }
}
