//! Meiosis: building gamete haplotypes from parental ones.
//!
//! The engine dispatches once per chromosome on its inheritance class,
//! samples crossovers from the sex-specific map and walks the breakpoints
//! left to right, slicing ancestry blocks out of the active parental copy.
//! Gap-free output tilings follow by construction: the walk is exhaustive
//! and ordered.

use crate::errors::MeiosisError;
use crate::genome::{AncestryBlock, Haplotype, Individual};
use crate::map::{ChromosomeDescriptor, ChromosomeKind, GenomeMap, Sex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How homologous copies are paired for recombination when ploidy exceeds
/// two. Diploids always pair their two homologs, whatever the rule.
///
/// Autopolyploid pairing is modeled as a random perfect matching with no
/// preferential pairing; the rule is configurable rather than hard-coded
/// because the underlying genetics is not settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PairingRule {
    /// Partition the copies into disjoint pairs uniformly at random each
    /// meiosis.
    #[default]
    UniformRandom,
    /// Always pair `(0,1), (2,3), ...` in copy order. Deterministic;
    /// useful for tests and controlled experiments.
    FirstPair,
}

impl PairingRule {
    /// Disjoint index pairs covering `0..n`. `n` is even by map
    /// construction.
    fn pair_indices<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<(usize, usize)> {
        debug_assert!(n % 2 == 0);
        let mut order: Vec<usize> = (0..n).collect();
        if matches!(self, Self::UniformRandom) && n > 2 {
            order.shuffle(rng);
        }
        order.chunks_exact(2).map(|c| (c[0], c[1])).collect()
    }
}

/// Recombine one pair of homologous copies into a single gamete haplotype.
///
/// Crossover breakpoints come from the chromosome's sex-specific map; the
/// walk alternates which copy is active and splices its blocks, retaining
/// their founder attribution.
pub fn recombine_pair<R: Rng + ?Sized>(
    a: &Haplotype,
    b: &Haplotype,
    chr: &ChromosomeDescriptor,
    parent_sex: Option<Sex>,
    rng: &mut R,
) -> Haplotype {
    let length = chr.length();
    let breaks = chr
        .recombination_map()
        .sample_crossovers(length, parent_sex, rng);
    let mut active_a = rng.random_bool(0.5);
    if breaks.is_empty() {
        return if active_a { a.clone() } else { b.clone() };
    }

    let mut blocks: Vec<AncestryBlock> =
        Vec::with_capacity(a.num_blocks().max(b.num_blocks()) + breaks.len());
    let mut prev = 0;
    for &x in &breaks {
        let src = if active_a { a } else { b };
        src.slice_into(prev, x, &mut blocks);
        active_a = !active_a;
        prev = x;
    }
    let src = if active_a { a } else { b };
    src.slice_into(prev, length, &mut blocks);
    Haplotype::from_blocks(blocks)
}

/// Gamete construction over a fixed genome map.
#[derive(Debug, Clone)]
pub struct MeiosisEngine {
    genome: Arc<GenomeMap>,
    pairing: PairingRule,
}

impl MeiosisEngine {
    pub fn new(genome: Arc<GenomeMap>) -> Self {
        Self {
            genome,
            pairing: PairingRule::default(),
        }
    }

    pub fn with_pairing(genome: Arc<GenomeMap>, pairing: PairingRule) -> Self {
        Self { genome, pairing }
    }

    #[inline]
    pub fn genome(&self) -> &Arc<GenomeMap> {
        &self.genome
    }

    #[inline]
    pub fn pairing(&self) -> PairingRule {
        self.pairing
    }

    /// Build this parent's contribution to one child chromosome.
    ///
    /// Returns the gamete's haplotype copies for that chromosome: one
    /// recombinant per homolog pair for recombining transmissions,
    /// a verbatim copy for the non-recombining ones, and an empty vector
    /// when this parent contributes nothing (father to son X, father to
    /// daughter Y, paternal MT, maternal Y).
    ///
    /// # Errors
    /// `SexMismatch` when an X/Y/MT transmission is requested without a
    /// resolvable parent or child sex; `InvalidPloidy` when the parent's
    /// copy count disagrees with the genome map.
    pub fn make_gamete<R: Rng + ?Sized>(
        &self,
        parent: &Individual,
        chr_index: usize,
        child_sex: Option<Sex>,
        rng: &mut R,
    ) -> Result<Vec<Haplotype>, MeiosisError> {
        let chr = self
            .genome
            .chromosome(chr_index)
            .expect("chromosome index out of range");
        let copies = parent.haplotypes(chr_index);
        let parent_sex = parent.sex();

        let expect_copies = |expected: usize| -> Result<(), MeiosisError> {
            if copies.len() == expected {
                Ok(())
            } else {
                Err(MeiosisError::InvalidPloidy {
                    chromosome: chr.id().to_string(),
                    expected,
                    found: copies.len(),
                })
            }
        };
        let resolve_sex = |sex: Option<Sex>| -> Result<Sex, MeiosisError> {
            sex.ok_or(MeiosisError::SexMismatch { id: parent.id() })
        };

        match chr.kind() {
            ChromosomeKind::Autosome => {
                expect_copies(self.genome.ploidy() as usize)?;
                let pairs = self.pairing.pair_indices(copies.len(), rng);
                Ok(pairs
                    .into_iter()
                    .map(|(i, j)| recombine_pair(&copies[i], &copies[j], chr, parent_sex, rng))
                    .collect())
            }
            ChromosomeKind::X => match resolve_sex(parent_sex)? {
                Sex::Female => {
                    expect_copies(2)?;
                    Ok(vec![recombine_pair(
                        &copies[0], &copies[1], chr, parent_sex, rng,
                    )])
                }
                Sex::Male => {
                    expect_copies(1)?;
                    match resolve_sex(child_sex)? {
                        // The single X goes to daughters unrecombined.
                        Sex::Female => Ok(vec![copies[0].clone()]),
                        Sex::Male => Ok(Vec::new()),
                    }
                }
            },
            ChromosomeKind::Y => match resolve_sex(parent_sex)? {
                Sex::Female => {
                    expect_copies(0)?;
                    Ok(Vec::new())
                }
                Sex::Male => {
                    expect_copies(1)?;
                    match resolve_sex(child_sex)? {
                        Sex::Male => Ok(vec![copies[0].clone()]),
                        Sex::Female => Ok(Vec::new()),
                    }
                }
            },
            ChromosomeKind::Mitochondrial => {
                expect_copies(1)?;
                match resolve_sex(parent_sex)? {
                    Sex::Female => Ok(vec![copies[0].clone()]),
                    Sex::Male => Ok(Vec::new()),
                }
            }
        }
    }
}
