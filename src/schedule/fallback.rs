use crossbeam_queue::SegQueue;
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::core::types::WorkerSlot;
use crate::schedule::runner::ScheduleError;
use crate::schedule::status::{Claim, StatusBoard};

/// Host thread pool that reprocesses the items the accelerator path left behind.
///
/// Every worker owns one engine, bound to its slot when the pool is built. Tasks
/// receive the engine of the worker running them; nothing is looked up by thread
/// identity at run time.
pub struct HostPool<E> {
    pool: ThreadPool,
    engines: Vec<Mutex<E>>,
}

impl<E: Send> HostPool<E> {
    /// Build a pool of `num_threads` workers, creating one engine per slot.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::PoolBuild` if the worker threads cannot be started.
    pub fn new<F>(num_threads: usize, mut make_engine: F) -> Result<Self, ScheduleError>
    where
        F: FnMut(WorkerSlot) -> E,
    {
        let engines = (0..num_threads)
            .map(|slot| make_engine(WorkerSlot(slot)))
            .collect();
        Self::with_engines(num_threads, engines)
    }

    /// Build a pool from prepared engines; `engines[i]` belongs to worker `i`.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::MissingWorkerContext` naming the first worker slot
    /// without an engine, or `ScheduleError::PoolBuild` if the threads cannot be
    /// started. Zero threads is rejected as slot 0 having no engine, since rayon
    /// would otherwise start a default number of workers.
    pub fn with_engines(num_threads: usize, engines: Vec<E>) -> Result<Self, ScheduleError> {
        if num_threads == 0 {
            return Err(ScheduleError::MissingWorkerContext(WorkerSlot(0)));
        }
        if engines.len() < num_threads {
            return Err(ScheduleError::MissingWorkerContext(WorkerSlot(
                engines.len(),
            )));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("host-worker-{i}"))
            .build()?;

        Ok(Self {
            pool,
            engines: engines.into_iter().map(Mutex::new).collect(),
        })
    }

    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Reprocess every claimed item with `task` and record each outcome on `board`.
    ///
    /// Claims are independent and may complete in any order. Blocks until all of
    /// them are done. Returns the number of items each worker slot processed.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::MissingWorkerContext` if a worker has no engine.
    pub fn run_fallback<T, F>(
        &self,
        claims: Vec<Claim<'_, T>>,
        board: &StatusBoard,
        task: F,
    ) -> Result<Vec<usize>, ScheduleError>
    where
        T: Send,
        F: Fn(&mut T, &mut E) -> bool + Sync,
    {
        if claims.is_empty() {
            return Ok(Vec::new());
        }

        let queue = SegQueue::new();
        for claim in claims {
            queue.push(claim);
        }

        let per_slot = self.pool.broadcast(|ctx| -> Result<usize, ScheduleError> {
            let slot = WorkerSlot(ctx.index());
            let engine = self
                .engines
                .get(slot.0)
                .ok_or(ScheduleError::MissingWorkerContext(slot))?;
            let mut engine = engine.lock();

            let mut processed = 0;
            while let Some(mut claim) = queue.pop() {
                let ok = task(claim.item_mut(), &mut *engine);
                board.record_fallback(&claim, ok);
                processed += 1;
            }
            Ok(processed)
        });

        let per_slot = per_slot.into_iter().collect::<Result<Vec<usize>, _>>()?;
        debug!("host workers processed {:?} items per slot", per_slot);
        Ok(per_slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ItemState;

    #[test]
    fn test_pool_binds_one_engine_per_slot() {
        let pool = HostPool::new(3, |slot| slot.0 * 10).unwrap();
        assert_eq!(pool.num_threads(), 3);
        assert_eq!(pool.engines.len(), 3);
        assert_eq!(*pool.engines[2].lock(), 20);
    }

    #[test]
    fn test_missing_engine_is_rejected() {
        let err = HostPool::with_engines(4, vec![(), ()]).err().unwrap();
        assert!(matches!(
            err,
            ScheduleError::MissingWorkerContext(WorkerSlot(2))
        ));
    }

    #[test]
    fn test_zero_threads_is_rejected_at_construction() {
        let err = HostPool::new(0, |_| ()).err().unwrap();
        assert!(matches!(
            err,
            ScheduleError::MissingWorkerContext(WorkerSlot(0))
        ));

        let err = HostPool::with_engines(0, vec![(), ()]).err().unwrap();
        assert!(matches!(
            err,
            ScheduleError::MissingWorkerContext(WorkerSlot(0))
        ));
    }

    #[test]
    fn test_fallback_processes_every_claim_once() {
        let mut items: Vec<u32> = (0..100).collect();
        let board = StatusBoard::new(items.len());
        let claims = board.claim_failed(&mut items);
        let pool = HostPool::new(4, |_| 0usize).unwrap();

        let per_slot = pool
            .run_fallback(claims, &board, |item, calls| {
                *calls += 1;
                *item += 1000;
                *item % 2 == 0
            })
            .unwrap();

        assert_eq!(per_slot.len(), 4);
        assert_eq!(per_slot.iter().sum::<usize>(), 100);
        assert!(items.iter().all(|&v| v >= 1000 && v < 1100));
        assert_eq!(board.state(0), ItemState::FallbackSucceeded);
        assert_eq!(board.state(1), ItemState::FallbackFailed);
        assert_eq!(board.first_unattempted(), None);

        let engine_calls: usize = pool.engines.iter().map(|e| *e.lock()).sum();
        assert_eq!(engine_calls, 100);
    }

    #[test]
    fn test_no_claims_is_a_no_op() {
        let board = StatusBoard::new(0);
        let pool = HostPool::new(2, |_| ()).unwrap();
        let per_slot = pool
            .run_fallback(Vec::<Claim<'_, u32>>::new(), &board, |_, _| true)
            .unwrap();
        assert!(per_slot.is_empty());
    }
}
