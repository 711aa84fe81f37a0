use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::output::TargetSummary;
use crate::testing::{SyntheticOverlap, SyntheticWindow};

const BASES: &[u8] = b"ACGT";

/// A seeded, reproducible set of targets with their windows and overlaps
#[derive(Debug, Clone)]
pub struct SyntheticWorkload {
    pub targets: Vec<TargetSummary>,
    pub windows: Vec<SyntheticWindow>,
    pub overlaps: Vec<SyntheticOverlap>,
}

impl SyntheticWorkload {
    /// Generate `targets` targets of `target_length` bases split into windows of
    /// `window_length`. Window depths are drawn from `0..=2 * mean_depth` and each
    /// target gets between 1 and `2 * mean_depth` overlapping queries.
    #[must_use]
    pub fn generate(
        targets: usize,
        target_length: u32,
        window_length: u32,
        mean_depth: u32,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let window_length = window_length.max(1);
        let max_depth = mean_depth.saturating_mul(2);

        let mut workload = Self {
            targets: Vec::with_capacity(targets),
            windows: Vec::new(),
            overlaps: Vec::new(),
        };

        for target_id in 0..targets {
            let coverage = rng.gen_range(1..=max_depth.max(1));
            workload
                .targets
                .push(TargetSummary::new(format!("target_{target_id}"), coverage));

            for rank in 0..target_length.div_ceil(window_length) {
                let start = rank * window_length;
                let length = window_length.min(target_length - start);
                let backbone: String = (0..length)
                    .map(|_| BASES[rng.gen_range(0..BASES.len())] as char)
                    .collect();
                let depth = rng.gen_range(0..=max_depth);
                workload
                    .windows
                    .push(SyntheticWindow::new(target_id, rank, &backbone, depth));
            }

            for _ in 0..coverage {
                let query_id = workload.overlaps.len();
                let length = rng.gen_range(1..=target_length.max(1));
                workload
                    .overlaps
                    .push(SyntheticOverlap::new(query_id, target_id, length));
            }
        }

        workload
    }
}
