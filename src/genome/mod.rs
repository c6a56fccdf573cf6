//! Compact genome representation: ancestry blocks, haplotypes and
//! individuals.
//!
//! An individual's genome is a small set of ancestry intervals pointing
//! into the founder pool, not a per-marker allele matrix. Actual alleles
//! are reconstructed on demand by the resolver.

mod block;
mod haplotype;
mod individual;

pub use block::AncestryBlock;
pub use haplotype::Haplotype;
pub use individual::Individual;

/// Registry id of an individual. Ids are assigned in creation order
/// starting at 1; 0 denotes a founder's unknown parent.
pub type IndividualId = u32;
