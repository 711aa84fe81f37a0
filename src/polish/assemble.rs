use thiserror::Error;
use tracing::warn;

use crate::core::item::Window;
use crate::core::output::{PolishedSequence, TargetSummary};
use crate::core::types::PolisherType;
use crate::schedule::StatusBoard;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("status board tracks {board} windows but {windows} were given")]
    LengthMismatch { board: usize, windows: usize },

    #[error("window {index} never reached a final state")]
    Unattempted { index: usize },

    #[error("window {index} refers to unknown target sequence {sequence_id}")]
    UnknownTarget { index: usize, sequence_id: usize },
}

/// How polished records are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssembleOptions {
    pub polisher_type: PolisherType,
    /// Skip targets for which no window produced a consensus
    pub drop_unpolished_sequences: bool,
}

/// Concatenate window consensus text into one record per target sequence.
///
/// Windows are consumed in order and dropped as soon as their text is appended.
/// A target's run closes when the next window has rank 0 or the input ends; its
/// polished ratio is `succeeded / (rank_of_last_window + 1)`.
///
/// # Errors
///
/// Fails before producing anything if `board` does not track exactly these
/// windows or any window is still unattempted, and fails without output if a
/// window refers to a target missing from `targets`.
pub fn assemble<W: Window>(
    windows: Vec<W>,
    board: &StatusBoard,
    targets: &[TargetSummary],
    options: AssembleOptions,
) -> Result<Vec<PolishedSequence>, AssembleError> {
    if board.len() != windows.len() {
        return Err(AssembleError::LengthMismatch {
            board: board.len(),
            windows: windows.len(),
        });
    }
    if let Some(index) = board.first_unattempted() {
        return Err(AssembleError::Unattempted { index });
    }

    let mut output = Vec::new();
    let mut data = String::new();
    let mut polished_windows = 0u32;
    let mut seen_windows = 0u64;

    let mut windows = windows.into_iter().enumerate().peekable();
    while let Some((index, window)) = windows.next() {
        if board.succeeded(index) {
            polished_windows += 1;
        }
        seen_windows += 1;
        data.push_str(window.consensus());

        let closes_run = windows.peek().map_or(true, |(_, next)| next.rank() == 0);
        if !closes_run {
            continue;
        }

        let rank = window.rank();
        if seen_windows != u64::from(rank) + 1 {
            warn!(
                "target {} closed at rank {} after {} windows",
                window.sequence_id(),
                rank,
                seen_windows
            );
        }
        let polished_ratio = f64::from(polished_windows) / (f64::from(rank) + 1.0);

        if !options.drop_unpolished_sequences || polished_ratio > 0.0 {
            let sequence_id = window.sequence_id();
            let target = targets
                .get(sequence_id)
                .ok_or(AssembleError::UnknownTarget { index, sequence_id })?;
            output.push(PolishedSequence::new(
                target,
                std::mem::take(&mut data),
                polished_ratio,
                options.polisher_type,
            ));
        }

        data.clear();
        polished_windows = 0;
        seen_windows = 0;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BatchId;
    use crate::schedule::{HostPool, WorkCursor};
    use crate::testing::{SyntheticBatch, SyntheticWindow};

    /// Build windows with the given ranks and settle the board so that exactly the
    /// windows flagged in `ok` succeeded.
    fn settled(runs: &[(usize, &[bool])]) -> (Vec<SyntheticWindow>, StatusBoard) {
        let mut windows = Vec::new();
        let mut flags = Vec::new();
        for &(sequence_id, ok) in runs {
            for (rank, &flag) in ok.iter().enumerate() {
                windows.push(SyntheticWindow::with_consensus(
                    sequence_id,
                    rank as u32,
                    &format!("{sequence_id}{rank}"),
                ));
                flags.push(flag);
            }
        }

        let board = StatusBoard::new(windows.len());
        {
            let cursor = WorkCursor::new(&mut windows);
            let mut batch = SyntheticBatch::with_capacity(0, flags.len());
            let assignment = cursor.fill(&mut batch);
            board.record(&assignment, BatchId(0), &flags).unwrap();
        }
        let claims = board.claim_failed(&mut windows);
        let pool = HostPool::new(1, |_| ()).unwrap();
        pool.run_fallback(claims, &board, |_, _| false).unwrap();
        (windows, board)
    }

    fn targets() -> Vec<TargetSummary> {
        vec![
            TargetSummary::new("ctg0", 10),
            TargetSummary::new("ctg1", 20),
        ]
    }

    #[test]
    fn test_rank_zero_starts_a_new_record() {
        let (windows, board) = settled(&[(0, &[true, true, true][..]), (1, &[true, true][..])]);
        let out = assemble(windows, &board, &targets(), AssembleOptions::default()).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].data, "000102");
        assert_eq!(out[1].data, "1011");
        assert_eq!(out[1].name, "ctg1 LN:i:4 RC:i:20 XC:f:1.000000");
    }

    #[test]
    fn test_polished_ratio_counts_succeeded_windows() {
        let (windows, board) = settled(&[(0, &[true, false, true][..])]);
        let out = assemble(windows, &board, &targets(), AssembleOptions::default()).unwrap();

        assert_eq!(out.len(), 1);
        assert!((out[0].polished_ratio - 2.0 / 3.0).abs() < 1e-12);
        assert!(out[0].name.ends_with("XC:f:0.666667"));
    }

    #[test]
    fn test_drop_unpolished_sequences() {
        let options = AssembleOptions {
            drop_unpolished_sequences: true,
            ..AssembleOptions::default()
        };
        let (windows, board) =
            settled(&[(0, &[false, false, false][..]), (1, &[false, true][..])]);
        let out = assemble(windows, &board, &targets(), options).unwrap();

        assert_eq!(out.len(), 1);
        assert!(out[0].name.starts_with("ctg1 "));
    }

    #[test]
    fn test_unpolished_sequences_kept_by_default() {
        let (windows, board) = settled(&[(0, &[false, false][..])]);
        let out = assemble(windows, &board, &targets(), AssembleOptions::default()).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].polished_ratio, 0.0);
    }

    #[test]
    fn test_fragment_records_are_tagged() {
        let options = AssembleOptions {
            polisher_type: PolisherType::Fragment,
            ..AssembleOptions::default()
        };
        let (windows, board) = settled(&[(1, &[true][..])]);
        let out = assemble(windows, &board, &targets(), options).unwrap();
        assert!(out[0].name.starts_with("ctg1r LN:i:2"));
    }

    #[test]
    fn test_unattempted_window_is_fatal() {
        let windows = vec![SyntheticWindow::with_consensus(0, 0, "A")];
        let board = StatusBoard::new(1);
        let err = assemble(windows, &board, &targets(), AssembleOptions::default()).unwrap_err();
        assert!(matches!(err, AssembleError::Unattempted { index: 0 }));
    }

    #[test]
    fn test_unknown_target_is_fatal() {
        let (windows, board) = settled(&[(0, &[true][..]), (5, &[true][..])]);
        let err = assemble(windows, &board, &targets(), AssembleOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            AssembleError::UnknownTarget {
                index: 1,
                sequence_id: 5
            }
        ));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let board = StatusBoard::new(0);
        let out = assemble(
            Vec::<SyntheticWindow>::new(),
            &board,
            &targets(),
            AssembleOptions::default(),
        )
        .unwrap();
        assert!(out.is_empty());
    }
}
