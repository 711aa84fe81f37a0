//! Contracts the scheduler needs from the work items it distributes.
//!
//! Items live in a caller-owned slice. The scheduler reads them by index, lends
//! disjoint mutable sub-slices to batch units for write-back, and never reorders
//! or removes them.

/// A bounded region of a target sequence plus the fragments aligned to it.
///
/// Windows of the same target are stored contiguously; `rank` is `0` for the
/// first window of each target and increases from there.
pub trait Window: Send {
    /// Per-worker reusable alignment engine used for host-side consensus
    type Engine: Send;

    /// Compute the consensus on the host. Returns `false` when no consensus could
    /// be produced (the window keeps its backbone as consensus text).
    fn generate_consensus(&mut self, engine: &mut Self::Engine) -> bool;

    /// Current consensus text
    fn consensus(&self) -> &str;

    /// Position of this window within its target's run of windows
    fn rank(&self) -> u32;

    /// Identifier of the source (target) sequence
    fn sequence_id(&self) -> usize;
}

/// A candidate alignment between a query and a target sequence.
pub trait Overlap: Send {
    /// Per-worker reusable alignment engine used for host-side alignment
    type Engine: Send;

    /// Align on the host and split the alignment at window boundaries.
    /// Returns `false` if no breaking points could be found.
    fn find_breaking_points(&mut self, engine: &mut Self::Engine, window_length: u32) -> bool;

    fn query_id(&self) -> usize;

    fn target_id(&self) -> usize;
}
