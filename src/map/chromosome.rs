use crate::errors::GenomeMapError;
use crate::map::{Position, RecombinationMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sex of an individual, as far as meiosis is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

/// Inheritance class of a chromosome.
///
/// A small closed enumeration dispatched once per chromosome in the meiosis
/// engine; each variant carries its own transmission rule:
///
/// - `Autosome`: standard recombination between homologous copies.
/// - `X`: recombines in females; males pass their single copy unrecombined
///   to daughters and nothing to sons.
/// - `Y`: father to son only, never recombined.
/// - `Mitochondrial`: mother to all offspring, never recombined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChromosomeKind {
    Autosome,
    X,
    Y,
    Mitochondrial,
}

impl ChromosomeKind {
    /// True for chromosomes whose transmission depends on sex.
    #[inline]
    pub fn is_sex_dependent(&self) -> bool {
        !matches!(self, Self::Autosome)
    }

    /// Number of haplotype copies an individual of the given sex carries.
    ///
    /// Autosomes carry the genome ploidy; X/Y/MT follow the diploid sex
    /// chromosome constitution. `None` when the count cannot be resolved
    /// without a sex.
    pub fn copies(&self, sex: Option<Sex>, ploidy: u16) -> Option<usize> {
        match self {
            Self::Autosome => Some(ploidy as usize),
            Self::Mitochondrial => Some(1),
            Self::X => match sex? {
                Sex::Female => Some(2),
                Sex::Male => Some(1),
            },
            Self::Y => match sex? {
                Sex::Female => Some(0),
                Sex::Male => Some(1),
            },
        }
    }
}

/// Static description of one chromosome: identity, inheritance class,
/// physical length and its sex-specific recombination map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromosomeDescriptor {
    id: Arc<str>,
    kind: ChromosomeKind,
    length: Position,
    map: RecombinationMap,
}

impl ChromosomeDescriptor {
    /// Create a descriptor, validating the map against the length.
    pub fn new(
        id: impl Into<Arc<str>>,
        kind: ChromosomeKind,
        length: Position,
        map: RecombinationMap,
    ) -> Result<Self, GenomeMapError> {
        let id = id.into();
        if length == 0 {
            return Err(GenomeMapError::ZeroLength {
                chromosome: id.to_string(),
            });
        }
        if let Some(end) = map.mapped_end() {
            if end > length {
                return Err(GenomeMapError::MapExceedsLength {
                    chromosome: id.to_string(),
                    end,
                    length,
                });
            }
        }
        Ok(Self {
            id,
            kind,
            length,
            map,
        })
    }

    /// Autosome with a single uniform rate; the common case for synthetic
    /// genomes and tests.
    pub fn autosome(
        id: impl Into<Arc<str>>,
        length: Position,
        rate: f64,
    ) -> Result<Self, GenomeMapError> {
        Self::new(
            id,
            ChromosomeKind::Autosome,
            length,
            RecombinationMap::uniform(rate),
        )
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> ChromosomeKind {
        self.kind
    }

    #[inline]
    pub fn length(&self) -> Position {
        self.length
    }

    #[inline]
    pub fn recombination_map(&self) -> &RecombinationMap {
        &self.map
    }

    /// Genetic length in Morgans for the given meiosis sex.
    pub fn genetic_length(&self, sex: Option<Sex>) -> f64 {
        self.map.genetic_length(self.length, sex)
    }
}
