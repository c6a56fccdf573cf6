//! Static genome description: chromosomes, ploidy and recombination maps.
//!
//! A `GenomeMap` is built once at startup from already-parsed input and is
//! read-only for the lifetime of a simulation run.

mod chromosome;
mod recombination;

pub use chromosome::{ChromosomeDescriptor, ChromosomeKind, Sex};
pub use recombination::{RateSegment, RecombinationMap};

use crate::errors::GenomeMapError;
use serde::{Deserialize, Serialize};

/// Physical base-pair coordinate on a chromosome.
pub type Position = u64;

/// Ordered chromosome descriptors plus the genome-wide ploidy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeMap {
    chromosomes: Vec<ChromosomeDescriptor>,
    ploidy: u16,
}

impl GenomeMap {
    /// Create a genome map.
    ///
    /// # Errors
    /// Rejects empty genomes, odd or zero ploidy (balanced meiosis needs an
    /// even copy number) and sex-linked or mitochondrial chromosomes in
    /// non-diploid genomes.
    pub fn new(
        chromosomes: Vec<ChromosomeDescriptor>,
        ploidy: u16,
    ) -> Result<Self, GenomeMapError> {
        if chromosomes.is_empty() {
            return Err(GenomeMapError::EmptyGenome);
        }
        if ploidy == 0 || ploidy % 2 != 0 {
            return Err(GenomeMapError::UnsupportedPloidy { ploidy });
        }
        if ploidy != 2 {
            if let Some(chr) = chromosomes.iter().find(|c| c.kind().is_sex_dependent()) {
                return Err(GenomeMapError::SexLinkedPloidy {
                    chromosome: chr.id().to_string(),
                    ploidy,
                });
            }
        }
        Ok(Self {
            chromosomes,
            ploidy,
        })
    }

    /// Diploid genome map; the common case.
    pub fn diploid(chromosomes: Vec<ChromosomeDescriptor>) -> Result<Self, GenomeMapError> {
        Self::new(chromosomes, 2)
    }

    #[inline]
    pub fn ploidy(&self) -> u16 {
        self.ploidy
    }

    #[inline]
    pub fn chromosomes(&self) -> &[ChromosomeDescriptor] {
        &self.chromosomes
    }

    #[inline]
    pub fn chromosome(&self, index: usize) -> Option<&ChromosomeDescriptor> {
        self.chromosomes.get(index)
    }

    /// Number of chromosomes.
    #[inline]
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// True if any chromosome's transmission depends on sex. Offspring of
    /// such genomes must have a resolvable sex.
    pub fn has_sex_dependent(&self) -> bool {
        self.chromosomes.iter().any(|c| c.kind().is_sex_dependent())
    }
}
