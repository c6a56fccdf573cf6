use crate::genome::IndividualId;
use crate::map::Position;
use serde::{Deserialize, Serialize};

/// One ancestry interval of a haplotype.
///
/// The half-open physical range `[start, end)` of this chromosome copy is
/// an exact copy of haplotype `copy` of founder `founder`. Blocks reference
/// founders by id only; the founder data itself lives in the `FounderPool`
/// and outlives every individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestryBlock {
    /// Inclusive physical start.
    pub start: Position,
    /// Exclusive physical end.
    pub end: Position,
    /// Id of the founder this segment descends from.
    pub founder: IndividualId,
    /// Which of the founder's haplotype copies.
    pub copy: u16,
}

impl AncestryBlock {
    pub fn new(start: Position, end: Position, founder: IndividualId, copy: u16) -> Self {
        debug_assert!(start < end, "empty ancestry block");
        Self {
            start,
            end,
            founder,
            copy,
        }
    }

    /// Physical length of the block.
    #[inline]
    pub fn len(&self) -> Position {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True if the block covers the physical position.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}
