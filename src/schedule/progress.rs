use tracing::info;

use crate::batch::BatchFlavor;

/// Number of progress bins reported over one phase
pub const PROGRESS_BINS: usize = 20;

/// Progress bar that advances in fixed bins as the cursor hands out work.
///
/// Lives inside the cursor's lock, so it needs no synchronization of its own.
#[derive(Debug)]
pub struct Progress {
    flavor: BatchFlavor,
    /// Items per bin; zero when there are fewer items than bins
    step: usize,
    last_bin: usize,
}

impl Progress {
    #[must_use]
    pub fn new(total: usize, flavor: BatchFlavor) -> Self {
        Self {
            flavor,
            step: total / PROGRESS_BINS,
            last_bin: 0,
        }
    }

    /// Called after every fill. Ticks at most once per call, when the fill started
    /// past a bin that has not been reported yet.
    pub fn advance(&mut self, start: usize, filled: usize) -> bool {
        if self.step == 0 || filled == 0 {
            return false;
        }
        if start / self.step > self.last_bin {
            self.last_bin += 1;
            self.report();
            return true;
        }
        false
    }

    /// Final tick once the phase has completed
    pub fn finish(&self) {
        if self.step == 0 {
            info!("generating {}: done", self.flavor);
        } else {
            info!("generating {} [{}] 100%", self.flavor, "=".repeat(PROGRESS_BINS));
        }
    }

    #[must_use]
    pub fn bins_reported(&self) -> usize {
        self.last_bin
    }

    fn report(&self) {
        let filled = self.last_bin.min(PROGRESS_BINS);
        info!(
            "generating {} [{}{}] {}%",
            self.flavor,
            "=".repeat(filled),
            " ".repeat(PROGRESS_BINS - filled),
            filled * 100 / PROGRESS_BINS,
        );
    }
}
