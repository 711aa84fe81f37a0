use serde::{Deserialize, Serialize};

/// Identifier of one accelerator batch unit, used for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(pub u32);

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of an accelerator device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub u32);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable index of a host pool worker, assigned when the pool is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerSlot(pub usize);

impl std::fmt::Display for WorkerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a batch unit lives: its id and the device that executes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSlot {
    pub id: BatchId,
    pub device: DeviceId,
}

/// Kind of polishing being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolisherType {
    /// Contig polishing
    #[default]
    Contig,
    /// Fragment (read) error correction; output names carry an `r` prefix tag
    Fragment,
}

impl std::fmt::Display for PolisherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contig => write!(f, "contig"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Lifecycle of a single work item as tracked by the status board.
///
/// `Unprocessed -> AssignedToBatch -> {AcceleratorSucceeded | AcceleratorFailed}`,
/// and failed items continue `-> FallbackAssigned -> FallbackSucceeded | FallbackFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ItemState {
    Unprocessed = 0,
    AssignedToBatch = 1,
    AcceleratorSucceeded = 2,
    AcceleratorFailed = 3,
    FallbackAssigned = 4,
    FallbackSucceeded = 5,
    FallbackFailed = 6,
}

impl ItemState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::AssignedToBatch,
            2 => Self::AcceleratorSucceeded,
            3 => Self::AcceleratorFailed,
            4 => Self::FallbackAssigned,
            5 => Self::FallbackSucceeded,
            6 => Self::FallbackFailed,
            _ => Self::Unprocessed,
        }
    }

    /// True once the item has a definite outcome
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::AcceleratorSucceeded | Self::FallbackSucceeded | Self::FallbackFailed
        )
    }

    /// True if either path produced a result for this item
    #[must_use]
    pub fn succeeded(self) -> bool {
        matches!(self, Self::AcceleratorSucceeded | Self::FallbackSucceeded)
    }
}
