//! Heterogeneous batch scheduling.
//!
//! One phase distributes an ordered collection of work items over accelerator
//! batch units and then retries whatever they could not complete on the host.
//!
//! ```text
//!   items[0..N]
//!       │  WorkCursor::fill (one lock, lowest indices first)
//!       ▼
//!   BatchRunner × batches  ── one OS thread each ──►  StatusBoard (lock-free)
//!       │  join all
//!       ▼
//!   StatusBoard::claim_failed ──► HostPool::run_fallback (rayon, engine per slot)
//! ```
//!
//! - [`WorkCursor`]: hands out disjoint [`Assignment`]s
//! - [`BatchRunner`], [`run_batches`]: accelerator phase
//! - [`StatusBoard`]: per-item [`ItemState`](crate::core::types::ItemState)
//! - [`HostPool`]: host fallback phase
//! - [`DeviceLayout`]: which device each batch runs on
//!
//! Every item ends in exactly one terminal state: accelerated, or reprocessed on
//! the host with a definite outcome.

pub mod cursor;
pub mod fallback;
pub mod layout;
pub mod progress;
pub mod runner;
pub mod status;

use tracing::info;

use crate::batch::BatchUnit;

pub use cursor::{Assignment, WorkCursor};
pub use fallback::HostPool;
pub use layout::{DeviceLayout, LayoutError};
pub use progress::Progress;
pub use runner::{run_batches, BatchRunner, RunnerStats, ScheduleError};
pub use status::{Claim, PhaseReport, StatusBoard};

/// Run one full phase over `items`: accelerator batches first, then the host
/// fallback for every item they did not complete.
///
/// `host_task` recomputes a single item with the executing worker's engine.
///
/// # Errors
///
/// Returns the first fatal error of either phase. On error the returned board is
/// lost; callers must not produce output from a partial run.
pub fn dispatch<T, B, E, F>(
    items: &mut [T],
    batches: &mut [B],
    pool: &HostPool<E>,
    host_task: F,
) -> Result<StatusBoard, ScheduleError>
where
    T: Send,
    B: BatchUnit<Item = T> + Send,
    E: Send,
    F: Fn(&mut T, &mut E) -> bool + Sync,
{
    let board = StatusBoard::new(items.len());

    let mut cursor = WorkCursor::new(&mut *items);
    if let Some(flavor) = batches.first().map(BatchUnit::flavor) {
        let progress = Progress::new(cursor.total(), flavor);
        cursor = cursor.with_progress(progress);
    }
    let runners = run_batches(&cursor, &board, batches)?;
    let progress = cursor.into_progress();

    let claims = board.claim_failed(items);
    info!(
        "{} batches completed {} of {} items; {} left for the host",
        runners.len(),
        board.len() - claims.len(),
        board.len(),
        claims.len()
    );
    pool.run_fallback(claims, &board, host_task)?;

    if let Some(progress) = progress {
        progress.finish();
    }
    Ok(board)
}
