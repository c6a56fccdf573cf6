//! Immutable store of phased founder allele data.
//!
//! The pool is the single source of truth for actual alleles: every
//! ancestry block of every descendant ultimately dereferences into it.
//! It is built once from already-parsed input and never mutated.

use crate::errors::FounderError;
use crate::genome::IndividualId;
use crate::map::{GenomeMap, Position};
use serde::{Deserialize, Serialize};

/// Phased alleles of one chromosome copy of one founder: parallel arrays
/// of strictly increasing marker positions and their allele codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FounderHaplotype {
    positions: Vec<Position>,
    alleles: Vec<u8>,
}

impl FounderHaplotype {
    /// Build from `(position, allele)` pairs. Positions must be strictly
    /// increasing; validation happens at pool construction.
    pub fn from_pairs(pairs: Vec<(Position, u8)>) -> Self {
        let mut positions = Vec::with_capacity(pairs.len());
        let mut alleles = Vec::with_capacity(pairs.len());
        for (pos, allele) in pairs {
            positions.push(pos);
            alleles.push(allele);
        }
        Self { positions, alleles }
    }

    #[inline]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Allele at an exact marker position, if present.
    pub fn allele_at(&self, pos: Position) -> Option<u8> {
        self.positions
            .binary_search(&pos)
            .ok()
            .map(|i| self.alleles[i])
    }

    fn is_sorted(&self) -> bool {
        self.positions.windows(2).all(|w| w[0] < w[1])
    }
}

/// All chromosome copies of one founder, outer index parallel to the
/// genome map's chromosome order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FounderGenome {
    chromosomes: Vec<Vec<FounderHaplotype>>,
}

impl FounderGenome {
    pub fn new(chromosomes: Vec<Vec<FounderHaplotype>>) -> Self {
        Self { chromosomes }
    }

    #[inline]
    pub fn chromosomes(&self) -> &[Vec<FounderHaplotype>] {
        &self.chromosomes
    }

    /// Copies stored for one chromosome.
    #[inline]
    pub fn copies(&self, chr_index: usize) -> &[FounderHaplotype] {
        &self.chromosomes[chr_index]
    }
}

/// Immutable pool of founder genomes, indexed by founder id (founders are
/// individuals 1..=n of the registry), chromosome index and copy index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FounderPool {
    founders: Vec<FounderGenome>,
}

impl FounderPool {
    /// Build and validate a pool against a genome map.
    ///
    /// Checks chromosome coverage, strictly increasing positions and that
    /// allele codes fit the map's alphabet ({0,1} for diploids,
    /// {0..ploidy-1} for autopolyploids). Per-copy counts against sexes
    /// are checked when founder individuals are created.
    pub fn from_genomes(
        founders: Vec<FounderGenome>,
        genome: &GenomeMap,
    ) -> Result<Self, FounderError> {
        if founders.is_empty() {
            return Err(FounderError::NoFounders);
        }
        let max_allele = if genome.ploidy() == 2 {
            1
        } else {
            (genome.ploidy() - 1) as u8
        };
        for (f, founder) in founders.iter().enumerate() {
            if founder.chromosomes.len() != genome.len() {
                return Err(FounderError::ChromosomeCountMismatch {
                    founder: f + 1,
                    expected: genome.len(),
                    found: founder.chromosomes.len(),
                });
            }
            for (c, copies) in founder.chromosomes.iter().enumerate() {
                for hap in copies {
                    if !hap.is_sorted() {
                        return Err(FounderError::UnsortedPositions {
                            founder: f + 1,
                            chromosome: c,
                        });
                    }
                    if let Some(&allele) = hap.alleles.iter().find(|&&a| a > max_allele) {
                        return Err(FounderError::AlleleOutOfRange {
                            founder: f + 1,
                            chromosome: c,
                            allele,
                        });
                    }
                }
            }
        }
        Ok(Self { founders })
    }

    /// Number of founders in the pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.founders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.founders.is_empty()
    }

    /// Founder genome by id (1-based registry id).
    pub fn genome(&self, founder: IndividualId) -> Option<&FounderGenome> {
        if founder == 0 {
            return None;
        }
        self.founders.get(founder as usize - 1)
    }

    /// Allele carried by one founder copy at an exact marker position.
    pub fn allele_at(
        &self,
        founder: IndividualId,
        chr_index: usize,
        copy: u16,
        pos: Position,
    ) -> Option<u8> {
        self.genome(founder)?
            .chromosomes
            .get(chr_index)?
            .get(copy as usize)?
            .allele_at(pos)
    }

    /// True if every founder copy of the chromosome carries the position.
    /// Marker lists are validated against this during setup.
    pub fn has_marker(&self, chr_index: usize, pos: Position) -> bool {
        let mut seen = false;
        for founder in &self.founders {
            let Some(copies) = founder.chromosomes.get(chr_index) else {
                return false;
            };
            for hap in copies {
                if hap.allele_at(pos).is_none() {
                    return false;
                }
                seen = true;
            }
        }
        seen
    }

    /// Mean allele code over all founder copies at a marker; for biallelic
    /// data this is the frequency of allele 1. Computed once over the full
    /// pool, not per individual.
    pub fn allele_frequency(&self, chr_index: usize, pos: Position) -> Option<f64> {
        let mut total = 0u64;
        let mut count = 0u64;
        for founder in &self.founders {
            for hap in founder.chromosomes.get(chr_index)? {
                total += hap.allele_at(pos)? as u64;
                count += 1;
            }
        }
        (count > 0).then(|| total as f64 / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::ChromosomeDescriptor;

    fn small_map() -> GenomeMap {
        GenomeMap::diploid(vec![
            ChromosomeDescriptor::autosome("chr1", 10_000, 1.0).unwrap()
        ])
        .unwrap()
    }

    fn diploid_founder(a0: u8, a1: u8) -> FounderGenome {
        FounderGenome::new(vec![vec![
            FounderHaplotype::from_pairs(vec![(1000, a0), (2000, a0), (3000, a0)]),
            FounderHaplotype::from_pairs(vec![(1000, a1), (2000, a1), (3000, a1)]),
        ]])
    }

    #[test]
    fn test_pool_construction_and_lookup() {
        let pool =
            FounderPool::from_genomes(vec![diploid_founder(0, 0), diploid_founder(1, 1)], &small_map())
                .unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.allele_at(1, 0, 0, 1000), Some(0));
        assert_eq!(pool.allele_at(2, 0, 1, 3000), Some(1));
        assert_eq!(pool.allele_at(2, 0, 1, 3001), None);
        assert_eq!(pool.allele_at(0, 0, 0, 1000), None);
        assert_eq!(pool.allele_at(3, 0, 0, 1000), None);
    }

    #[test]
    fn test_pool_rejects_empty() {
        assert!(matches!(
            FounderPool::from_genomes(Vec::new(), &small_map()),
            Err(FounderError::NoFounders)
        ));
    }

    #[test]
    fn test_pool_rejects_unsorted_positions() {
        let bad = FounderGenome::new(vec![vec![FounderHaplotype::from_pairs(vec![
            (2000, 0),
            (1000, 1),
        ])]]);
        assert!(matches!(
            FounderPool::from_genomes(vec![bad], &small_map()),
            Err(FounderError::UnsortedPositions {
                founder: 1,
                chromosome: 0
            })
        ));
    }

    #[test]
    fn test_pool_rejects_allele_out_of_alphabet() {
        let bad =
            FounderGenome::new(vec![vec![FounderHaplotype::from_pairs(vec![(1000, 2)])]]);
        assert!(matches!(
            FounderPool::from_genomes(vec![bad], &small_map()),
            Err(FounderError::AlleleOutOfRange { allele: 2, .. })
        ));
    }

    #[test]
    fn test_pool_rejects_chromosome_mismatch() {
        let bad = FounderGenome::new(vec![]);
        assert!(matches!(
            FounderPool::from_genomes(vec![bad], &small_map()),
            Err(FounderError::ChromosomeCountMismatch { .. })
        ));
    }

    #[test]
    fn test_has_marker() {
        let pool =
            FounderPool::from_genomes(vec![diploid_founder(0, 1)], &small_map()).unwrap();
        assert!(pool.has_marker(0, 2000));
        assert!(!pool.has_marker(0, 2500));
        assert!(!pool.has_marker(1, 2000));
    }

    #[test]
    fn test_allele_frequency() {
        // Four copies total: 0,0 and 1,1. Frequency of allele 1 is 0.5.
        let pool =
            FounderPool::from_genomes(vec![diploid_founder(0, 0), diploid_founder(1, 1)], &small_map())
                .unwrap();
        assert_eq!(pool.allele_frequency(0, 1000), Some(0.5));
        assert_eq!(pool.allele_frequency(0, 999), None);
    }

    #[test]
    fn test_tetraploid_alphabet() {
        let map = GenomeMap::new(
            vec![ChromosomeDescriptor::autosome("chr1", 10_000, 1.0).unwrap()],
            4,
        )
        .unwrap();
        let founder = FounderGenome::new(vec![(0..4)
            .map(|i| FounderHaplotype::from_pairs(vec![(1000, i as u8)]))
            .collect()]);
        let pool = FounderPool::from_genomes(vec![founder], &map).unwrap();
        assert_eq!(pool.allele_at(1, 0, 3, 1000), Some(3));
    }
}
