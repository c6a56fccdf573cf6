//! Commonly used imports for convenience.
//!
//! ```
//! use genedrop::prelude::*;
//!
//! let chr = ChromosomeDescriptor::autosome("chr1", 1_000_000, 1.0).unwrap();
//! let genome = GenomeMap::diploid(vec![chr]).unwrap();
//! assert_eq!(genome.ploidy(), 2);
//! ```

pub use crate::errors::{FounderError, GenomeMapError, MeiosisError, ResolveError};
pub use crate::founder::{FounderGenome, FounderHaplotype, FounderPool};
pub use crate::genome::{AncestryBlock, Haplotype, Individual, IndividualId};
pub use crate::map::{
    ChromosomeDescriptor, ChromosomeKind, GenomeMap, Position, RateSegment, RecombinationMap, Sex,
};
pub use crate::meiosis::{MeiosisEngine, PairingRule};
pub use crate::qtn::{QtnEffect, TraitArchitecture};
pub use crate::resolve::{resolve_genotypes, Marker, MarkerSet};
pub use crate::simulation::Population;
