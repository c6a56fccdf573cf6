//! On-demand genotype reconstruction.
//!
//! Individuals never store per-marker alleles; this module materializes
//! integer dosage matrices for arbitrary marker subsets by resolving, for
//! every (individual, marker) pair, which founder allele each haplotype
//! copy inherits. Lookups are read-only and independent across individuals
//! and markers, so the matrix is filled with one parallel task per
//! individual.

use crate::errors::ResolveError;
use crate::founder::FounderPool;
use crate::genome::Individual;
use crate::map::Position;
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A queried marker site: chromosome index into the genome map plus a
/// physical position that must exist in the founder data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub chromosome: usize,
    pub position: Position,
}

impl Marker {
    pub fn new(chromosome: usize, position: Position) -> Self {
        Self {
            chromosome,
            position,
        }
    }
}

/// An ordered list of markers validated against a founder pool, typically
/// the union of a genotyping-chip definition and QTN positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    /// Validate that every marker exists in the founder data.
    ///
    /// # Errors
    /// `EmptyMarkerSet` for an empty list, `MarkerNotFound` for the first
    /// position absent from the pool. Positions are never silently
    /// zero-filled.
    pub fn new(markers: Vec<Marker>, founders: &FounderPool) -> Result<Self, ResolveError> {
        if markers.is_empty() {
            return Err(ResolveError::EmptyMarkerSet);
        }
        for marker in &markers {
            if !founders.has_marker(marker.chromosome, marker.position) {
                return Err(ResolveError::MarkerNotFound {
                    chromosome: marker.chromosome,
                    position: marker.position,
                });
            }
        }
        Ok(Self { markers })
    }

    /// Setup-time filter: keep the markers present in the pool, return the
    /// dropped ones for diagnostics. The kept set may be empty; the
    /// resolver reports that explicitly.
    pub fn retain_known(markers: Vec<Marker>, founders: &FounderPool) -> (Self, Vec<Marker>) {
        let (known, dropped) = markers
            .into_iter()
            .partition(|m| founders.has_marker(m.chromosome, m.position));
        (Self { markers: known }, dropped)
    }

    #[inline]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// The allele each haplotype copy of `individual` carries at `marker`,
/// in copy order. Length varies with the chromosome's copy count (e.g.
/// one entry for a male X).
pub fn copy_alleles(
    individual: &Individual,
    marker: Marker,
    founders: &FounderPool,
) -> Result<Vec<u8>, ResolveError> {
    let not_found = ResolveError::MarkerNotFound {
        chromosome: marker.chromosome,
        position: marker.position,
    };
    let copies = individual
        .chromosomes()
        .get(marker.chromosome)
        .ok_or_else(|| not_found.clone())?;
    copies
        .iter()
        .map(|hap| {
            let (founder, copy) = hap.source_at(marker.position).ok_or_else(|| not_found.clone())?;
            founders
                .allele_at(founder, marker.chromosome, copy, marker.position)
                .ok_or_else(|| not_found.clone())
        })
        .collect()
}

/// Integer dosage of `individual` at `marker`: the sum of per-copy
/// alleles. Deterministic; repeated queries never resample anything.
pub fn dosage_at(
    individual: &Individual,
    marker: Marker,
    founders: &FounderPool,
) -> Result<u8, ResolveError> {
    Ok(copy_alleles(individual, marker, founders)?
        .into_iter()
        .sum())
}

/// Reconstruct the dosage matrix (markers x individuals) for a validated
/// marker set.
///
/// Columns are resolved in parallel, one task per individual, each
/// scanning its own ordered block lists.
pub fn resolve_genotypes(
    individuals: &[Individual],
    markers: &MarkerSet,
    founders: &FounderPool,
) -> Result<Array2<u8>, ResolveError> {
    if markers.is_empty() {
        return Err(ResolveError::EmptyMarkerSet);
    }
    let columns: Vec<Vec<u8>> = individuals
        .par_iter()
        .map(|ind| {
            markers
                .markers()
                .iter()
                .map(|&m| dosage_at(ind, m, founders))
                .collect::<Result<Vec<u8>, ResolveError>>()
        })
        .collect::<Result<_, _>>()?;

    Ok(Array2::from_shape_fn(
        (markers.len(), individuals.len()),
        |(m, i)| columns[i][m],
    ))
}

/// Founder allele frequency per marker, in marker order. Computed once
/// over the full pool; callers use it for minor-allele-frequency filters
/// after dosages are resolved.
pub fn allele_frequencies(
    markers: &MarkerSet,
    founders: &FounderPool,
) -> Result<Vec<f64>, ResolveError> {
    markers
        .markers()
        .iter()
        .map(|m| {
            founders
                .allele_frequency(m.chromosome, m.position)
                .ok_or(ResolveError::MarkerNotFound {
                    chromosome: m.chromosome,
                    position: m.position,
                })
        })
        .collect()
}
