use std::ops::Range;

use parking_lot::Mutex;
use tracing::debug;

use crate::batch::BatchUnit;
use crate::schedule::progress::Progress;

/// A contiguous run of items handed to one batch by [`WorkCursor::fill`].
///
/// Holds the only mutable borrow of those items, so two assignments can never
/// overlap. Status writes for the range go through this token.
#[derive(Debug)]
pub struct Assignment<'a, T> {
    start: usize,
    items: &'a mut [T],
}

impl<'a, T> Assignment<'a, T> {
    /// First assigned index
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last assigned index
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.items.len()
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        self.items
    }
}

struct CursorState<'a, T> {
    /// Items not yet handed out
    remaining: &'a mut [T],
    /// Original index of `remaining[0]`
    next: usize,
    /// Set when a runner hit a fatal error; further fills yield nothing
    closed: bool,
    progress: Option<Progress>,
}

/// Shared cursor over an ordered collection of work items.
///
/// Always hands out the lowest unassigned indices first. Concurrent
/// [`fill`](WorkCursor::fill) calls are linearized through one lock that is held
/// only while items are offered to the batch.
pub struct WorkCursor<'a, T> {
    state: Mutex<CursorState<'a, T>>,
    total: usize,
}

impl<'a, T> WorkCursor<'a, T> {
    pub fn new(items: &'a mut [T]) -> Self {
        let total = items.len();
        Self {
            state: Mutex::new(CursorState {
                remaining: items,
                next: 0,
                closed: false,
                progress: None,
            }),
            total,
        }
    }

    /// Attach a progress bar that ticks as work is handed out
    #[must_use]
    pub fn with_progress(self, progress: Progress) -> Self {
        self.state.lock().progress = Some(progress);
        self
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of items handed out so far
    #[must_use]
    pub fn assigned(&self) -> usize {
        self.state.lock().next
    }

    /// Stop handing out work. Runners see empty fills and terminate.
    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Reset `batch`, then offer it the next unassigned items until it refuses one
    /// or the collection is exhausted.
    ///
    /// Returns the items actually inserted; the assignment is empty (and the batch
    /// left empty) once the collection is exhausted or the cursor is closed.
    pub fn fill<B>(&self, batch: &mut B) -> Assignment<'a, T>
    where
        B: BatchUnit<Item = T>,
    {
        batch.reset();

        let mut state = self.state.lock();
        let start = state.next;
        if state.closed {
            return Assignment {
                start,
                items: Default::default(),
            };
        }

        let mut count = 0;
        for item in state.remaining.iter() {
            if !batch.try_add(item) {
                break;
            }
            count += 1;
        }

        let remaining = std::mem::take(&mut state.remaining);
        let (taken, rest) = remaining.split_at_mut(count);
        state.remaining = rest;
        state.next += count;

        if count > 0 {
            debug!(
                "Processing {} {} - {} (of {}) in batch {}",
                batch.flavor(),
                start,
                start + count,
                self.total,
                batch.id()
            );
        }
        if let Some(progress) = state.progress.as_mut() {
            progress.advance(start, count);
        }

        Assignment {
            start,
            items: taken,
        }
    }

    /// Release the items and hand back the progress bar, if one was attached
    pub fn into_progress(self) -> Option<Progress> {
        self.state.into_inner().progress
    }
}
