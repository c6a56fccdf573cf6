//! # genedrop
//!
//! Pedigree gene-dropping: descendant genomes are simulated by propagating
//! founder haplotype segments through meioses, without ever materializing
//! per-individual allele matrices.
//!
//! The crate is organized around five pieces:
//!
//! - [`map`]: static genome description (chromosomes, ploidy, sex-specific
//!   recombination maps),
//! - [`founder`]: the immutable pool of phased founder alleles,
//! - [`genome`]: the compact interval representation of individuals
//!   (ancestry blocks, haplotypes),
//! - [`meiosis`]: gamete construction with crossovers and the special
//!   X/Y/mitochondrial transmission rules,
//! - [`resolve`]: on-demand reconstruction of integer dosage matrices for
//!   arbitrary marker subsets, with [`qtn`] as a thin effect/variance
//!   layer on top and [`simulation`] tying the pedigree together.

pub mod errors;
pub mod founder;
pub mod genome;
pub mod map;
pub mod meiosis;
pub mod prelude;
pub mod qtn;
pub mod resolve;
pub mod simulation;

pub use genome::{AncestryBlock, Haplotype, Individual, IndividualId};
pub use map::{ChromosomeDescriptor, ChromosomeKind, GenomeMap, Position, Sex};
