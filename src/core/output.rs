use serde::{Deserialize, Serialize};

use crate::core::types::PolisherType;

/// What the assembler needs to know about one target sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSummary {
    /// Target sequence name
    pub name: String,

    /// Number of query sequences overlapping this target
    pub coverage: u32,
}

impl TargetSummary {
    pub fn new(name: impl Into<String>, coverage: u32) -> Self {
        Self {
            name: name.into(),
            coverage,
        }
    }
}

/// One polished output record per source sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolishedSequence {
    /// Target name followed by the tag suffix
    pub name: String,

    /// Concatenated consensus text of all windows of the target
    pub data: String,

    /// Number of query sequences overlapping the target (RC tag)
    pub coverage: u32,

    /// Fraction of windows for which consensus succeeded (XC tag)
    pub polished_ratio: f64,
}

impl PolishedSequence {
    /// Build a record, rendering the tag suffix onto the target name.
    ///
    /// Tags are `LN:i:<length> RC:i:<coverage> XC:f:<ratio>`, preceded by `r` when
    /// correcting fragments.
    #[must_use]
    pub fn new(
        target: &TargetSummary,
        data: String,
        polished_ratio: f64,
        polisher_type: PolisherType,
    ) -> Self {
        let prefix = match polisher_type {
            PolisherType::Fragment => "r",
            PolisherType::Contig => "",
        };
        let name = format!(
            "{}{prefix} LN:i:{} RC:i:{} XC:f:{polished_ratio:.6}",
            target.name,
            data.len(),
            target.coverage,
        );

        Self {
            name,
            data,
            coverage: target.coverage,
            polished_ratio,
        }
    }

    /// Length of the polished sequence (LN tag)
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
