use crate::genome::{AncestryBlock, IndividualId};
use crate::map::Position;
use serde::{Deserialize, Serialize};

/// One chromosome copy of one individual: an ordered, gap-free sequence of
/// ancestry blocks whose union is exactly `[0, chromosome length)`.
///
/// Adjacent blocks may share the same founder origin without being merged;
/// correctness only requires the tiling to have no gap and no overlap.
/// Haplotypes are write-once: they are built by the meiosis engine (or as
/// trivial founder tilings) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Haplotype {
    blocks: Vec<AncestryBlock>,
}

impl Haplotype {
    /// Trivial haplotype of a founder: a single block spanning the whole
    /// chromosome, referencing the founder's own copy.
    pub fn founder_single(length: Position, founder: IndividualId, copy: u16) -> Self {
        Self {
            blocks: vec![AncestryBlock::new(0, length, founder, copy)],
        }
    }

    /// Build from blocks produced by a segment walk. The caller guarantees
    /// ordering and contiguity; `tiles` checks it in tests.
    pub fn from_blocks(blocks: Vec<AncestryBlock>) -> Self {
        debug_assert!(blocks.windows(2).all(|w| w[0].end == w[1].start));
        Self { blocks }
    }

    #[inline]
    pub fn blocks(&self) -> &[AncestryBlock] {
        &self.blocks
    }

    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Physical length covered, i.e. the end of the last block.
    pub fn length(&self) -> Position {
        self.blocks.last().map_or(0, |b| b.end)
    }

    /// Founder origin covering a physical position. Blocks are sorted, so
    /// this is a binary search over the ordered partition.
    pub fn source_at(&self, pos: Position) -> Option<(IndividualId, u16)> {
        let idx = self.blocks.partition_point(|b| b.end <= pos);
        let block = self.blocks.get(idx)?;
        block.contains(pos).then_some((block.founder, block.copy))
    }

    /// Append the sub-blocks covering `[start, end)` to `out`, splitting
    /// any block that straddles a boundary while keeping its founder
    /// attribution. The segment walk of meiosis is built on this.
    pub fn slice_into(&self, start: Position, end: Position, out: &mut Vec<AncestryBlock>) {
        if start >= end {
            return;
        }
        let mut idx = self.blocks.partition_point(|b| b.end <= start);
        while let Some(block) = self.blocks.get(idx) {
            if block.start >= end {
                break;
            }
            out.push(AncestryBlock::new(
                block.start.max(start),
                block.end.min(end),
                block.founder,
                block.copy,
            ));
            idx += 1;
        }
    }

    /// True if the blocks tile `[0, chr_len)` exactly: sorted, contiguous,
    /// no gap, no overlap.
    pub fn tiles(&self, chr_len: Position) -> bool {
        if self.blocks.is_empty() {
            return chr_len == 0;
        }
        if self.blocks[0].start != 0 || self.length() != chr_len {
            return false;
        }
        self.blocks
            .windows(2)
            .all(|w| w[0].end == w[1].start && w[0].start < w[0].end)
            && self.blocks.last().is_some_and(|b| b.start < b.end)
    }
}
