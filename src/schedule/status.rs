use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::types::{BatchId, ItemState};
use crate::schedule::cursor::Assignment;
use crate::schedule::runner::ScheduleError;

/// An item the accelerator path did not complete, claimed for host reprocessing.
///
/// Like [`Assignment`], it carries the only mutable borrow of its item.
#[derive(Debug)]
pub struct Claim<'a, T> {
    index: usize,
    item: &'a mut T,
}

impl<'a, T> Claim<'a, T> {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn item_mut(&mut self) -> &mut T {
        self.item
    }
}

/// Per-item status shared by all runners and host workers of one phase.
///
/// Slots are written without a lock. Every write goes through an [`Assignment`]
/// or a [`Claim`], and those are issued for disjoint indices, so no two writers
/// ever touch the same slot. Relaxed ordering is enough because readers only look
/// at the board after joining the writers.
#[derive(Debug)]
pub struct StatusBoard {
    slots: Vec<AtomicU8>,
}

impl StatusBoard {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len)
                .map(|_| AtomicU8::new(ItemState::Unprocessed as u8))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn state(&self, index: usize) -> ItemState {
        ItemState::from_u8(self.slots[index].load(Ordering::Relaxed))
    }

    /// Whether either path produced a result for `index`
    #[must_use]
    pub fn succeeded(&self, index: usize) -> bool {
        self.state(index).succeeded()
    }

    pub fn states(&self) -> impl Iterator<Item = ItemState> + '_ {
        self.slots
            .iter()
            .map(|slot| ItemState::from_u8(slot.load(Ordering::Relaxed)))
    }

    fn set(&self, index: usize, state: ItemState) {
        self.slots[index].store(state as u8, Ordering::Relaxed);
    }

    pub(crate) fn mark_assigned<T>(&self, assignment: &Assignment<'_, T>) {
        for index in assignment.range() {
            self.set(index, ItemState::AssignedToBatch);
        }
    }

    /// Copy a batch's per-item flags into the slots of its assignment.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::IntegrityViolation` if the batch reported a different
    /// number of results than items it was assigned; nothing is written then.
    pub fn record<T>(
        &self,
        assignment: &Assignment<'_, T>,
        batch: BatchId,
        results: &[bool],
    ) -> Result<(), ScheduleError> {
        if results.len() != assignment.len() {
            return Err(ScheduleError::IntegrityViolation {
                batch,
                assigned: assignment.len(),
                returned: results.len(),
            });
        }

        for (index, &ok) in assignment.range().zip(results) {
            let state = if ok {
                ItemState::AcceleratorSucceeded
            } else {
                ItemState::AcceleratorFailed
            };
            self.set(index, state);
        }
        Ok(())
    }

    /// Claim every item the accelerator path did not complete.
    ///
    /// `items` must be the collection this board tracks.
    pub(crate) fn claim_failed<'a, T>(&self, items: &'a mut [T]) -> Vec<Claim<'a, T>> {
        debug_assert_eq!(items.len(), self.slots.len());

        items
            .iter_mut()
            .enumerate()
            .filter(|(index, _)| self.state(*index) != ItemState::AcceleratorSucceeded)
            .map(|(index, item)| {
                self.set(index, ItemState::FallbackAssigned);
                Claim { index, item }
            })
            .collect()
    }

    pub fn record_fallback<T>(&self, claim: &Claim<'_, T>, ok: bool) {
        let state = if ok {
            ItemState::FallbackSucceeded
        } else {
            ItemState::FallbackFailed
        };
        self.set(claim.index, state);
    }

    /// First index that has not reached a terminal state, if any
    #[must_use]
    pub fn first_unattempted(&self) -> Option<usize> {
        self.states().position(|state| !state.is_terminal())
    }

    #[must_use]
    pub fn report(&self) -> PhaseReport {
        let mut report = PhaseReport {
            total: self.len(),
            ..PhaseReport::default()
        };
        for state in self.states() {
            match state {
                ItemState::AcceleratorSucceeded => report.accelerated += 1,
                ItemState::FallbackSucceeded => report.fallback_succeeded += 1,
                ItemState::FallbackFailed => report.fallback_failed += 1,
                _ => report.unattempted += 1,
            }
        }
        report
    }
}

/// Outcome counts for one scheduling phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub total: usize,
    /// Completed by an accelerator batch
    pub accelerated: usize,
    /// Reprocessed on the host with a result
    pub fallback_succeeded: usize,
    /// Reprocessed on the host without a result
    pub fallback_failed: usize,
    /// Never reached a terminal state; non-zero only after an aborted run
    pub unattempted: usize,
}

impl PhaseReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.accelerated + self.fallback_succeeded
    }

    #[must_use]
    pub fn fallback(&self) -> usize {
        self.fallback_succeeded + self.fallback_failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::cursor::WorkCursor;
    use crate::testing::{SyntheticBatch, SyntheticWindow};

    fn windows(n: usize) -> Vec<SyntheticWindow> {
        (0..n).map(|i| SyntheticWindow::new(0, i as u32, "ACGT", 4)).collect()
    }

    #[test]
    fn test_record_writes_flags_at_assigned_offsets() {
        let mut items = windows(6);
        let board = StatusBoard::new(6);
        let cursor = WorkCursor::new(&mut items);
        let mut batch = SyntheticBatch::with_capacity(0, 3);

        let _first = cursor.fill(&mut batch);
        let second = cursor.fill(&mut batch);
        board
            .record(&second, BatchId(0), &[true, false, true])
            .unwrap();

        assert_eq!(board.state(0), ItemState::Unprocessed);
        assert_eq!(board.state(3), ItemState::AcceleratorSucceeded);
        assert_eq!(board.state(4), ItemState::AcceleratorFailed);
        assert_eq!(board.state(5), ItemState::AcceleratorSucceeded);
    }

    #[test]
    fn test_record_rejects_short_results() {
        let mut items = windows(4);
        let board = StatusBoard::new(4);
        let cursor = WorkCursor::new(&mut items);
        let mut batch = SyntheticBatch::with_capacity(7, 4);

        let assignment = cursor.fill(&mut batch);
        let err = board
            .record(&assignment, BatchId(7), &[true, true, true])
            .unwrap_err();

        match err {
            ScheduleError::IntegrityViolation {
                batch,
                assigned,
                returned,
            } => {
                assert_eq!(batch, BatchId(7));
                assert_eq!(assigned, 4);
                assert_eq!(returned, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(board.state(0), ItemState::Unprocessed);
    }

    #[test]
    fn test_claim_failed_skips_accelerated_items() {
        let mut items = windows(4);
        let board = StatusBoard::new(4);
        {
            let cursor = WorkCursor::new(&mut items);
            let mut batch = SyntheticBatch::with_capacity(0, 2);
            let assignment = cursor.fill(&mut batch);
            board.record(&assignment, BatchId(0), &[true, false]).unwrap();
        }

        let claims = board.claim_failed(&mut items);
        let indices: Vec<usize> = claims.iter().map(Claim::index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(board.state(1), ItemState::FallbackAssigned);

        for claim in &claims {
            board.record_fallback(claim, claim.index() != 3);
        }
        assert_eq!(board.first_unattempted(), None);

        let report = board.report();
        assert_eq!(report.accelerated, 1);
        assert_eq!(report.fallback_succeeded, 2);
        assert_eq!(report.fallback_failed, 1);
        assert_eq!(report.succeeded(), 3);
    }
}
