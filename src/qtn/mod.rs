//! Trait architectures: QTN effects over resolved dosages.
//!
//! A thin consumer of the resolver and the founder allele frequencies.
//! QTN positions are validated like any other marker set; breeding values
//! are plain sums over resolved dosages and the analytic variances are
//! closed-form statistics of the founder frequencies, independent of any
//! sampled population.

use crate::errors::ResolveError;
use crate::founder::FounderPool;
use crate::genome::Individual;
use crate::map::Position;
use crate::resolve::{self, Marker, MarkerSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One quantitative trait nucleotide: a marker site with additive and
/// dominance effects on a trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QtnEffect {
    pub chromosome: usize,
    pub position: Position,
    /// Effect per copy of allele 1.
    pub additive: f64,
    /// Effect of heterozygosity.
    pub dominance: f64,
}

impl QtnEffect {
    #[inline]
    fn marker(&self) -> Marker {
        Marker::new(self.chromosome, self.position)
    }
}

/// A named trait: an ordered QTN list validated against the founder pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitArchitecture {
    name: Arc<str>,
    qtn: Vec<QtnEffect>,
}

impl TraitArchitecture {
    /// Validate QTN positions against the founder data; positions absent
    /// from the pool are a hard error, exactly as for marker sets.
    pub fn new(
        name: impl Into<Arc<str>>,
        qtn: Vec<QtnEffect>,
        founders: &FounderPool,
    ) -> Result<Self, ResolveError> {
        MarkerSet::new(qtn.iter().map(|q| q.marker()).collect(), founders)?;
        Ok(Self {
            name: name.into(),
            qtn,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn qtn(&self) -> &[QtnEffect] {
        &self.qtn
    }

    /// True breeding values of the individuals for this trait, in order.
    ///
    /// Per QTN the contribution is additive effect times the dosage
    /// centered at `copies * p` (founder frequency), plus the dominance
    /// effect when the individual carries both alleles.
    pub fn breeding_values(
        &self,
        individuals: &[Individual],
        founders: &FounderPool,
    ) -> Result<Vec<f64>, ResolveError> {
        let freqs: Vec<f64> = self
            .qtn
            .iter()
            .map(|q| {
                founders
                    .allele_frequency(q.chromosome, q.position)
                    .ok_or(ResolveError::MarkerNotFound {
                        chromosome: q.chromosome,
                        position: q.position,
                    })
            })
            .collect::<Result<_, _>>()?;

        individuals
            .par_iter()
            .map(|ind| {
                let mut value = 0.0;
                for (q, &p) in self.qtn.iter().zip(freqs.iter()) {
                    let copies = ind.haplotypes(q.chromosome).len();
                    let dosage = resolve::dosage_at(ind, q.marker(), founders)? as f64;
                    let het = dosage > 0.0 && dosage < copies as f64;
                    value += q.additive * (dosage - copies as f64 * p);
                    if het {
                        value += q.dominance;
                    }
                }
                Ok(value)
            })
            .collect()
    }

    /// Theoretical additive variance under founder allele frequencies:
    /// the sum over QTNs of `2pq * (a + d(q - p))^2`.
    pub fn additive_variance(&self, founders: &FounderPool) -> Result<f64, ResolveError> {
        self.per_qtn_variance(founders, |p, q, a, d| {
            let alpha = a + d * (q - p);
            2.0 * p * q * alpha * alpha
        })
    }

    /// Theoretical dominance variance under founder allele frequencies:
    /// the sum over QTNs of `(2pq * d)^2`.
    pub fn dominance_variance(&self, founders: &FounderPool) -> Result<f64, ResolveError> {
        self.per_qtn_variance(founders, |p, q, _a, d| {
            let v = 2.0 * p * q * d;
            v * v
        })
    }

    fn per_qtn_variance(
        &self,
        founders: &FounderPool,
        term: impl Fn(f64, f64, f64, f64) -> f64,
    ) -> Result<f64, ResolveError> {
        let mut total = 0.0;
        for qtn in &self.qtn {
            let p = founders
                .allele_frequency(qtn.chromosome, qtn.position)
                .ok_or(ResolveError::MarkerNotFound {
                    chromosome: qtn.chromosome,
                    position: qtn.position,
                })?;
            total += term(p, 1.0 - p, qtn.additive, qtn.dominance);
        }
        Ok(total)
    }
}
