use crate::errors::GenomeMapError;
use crate::map::{Position, Sex};
use rand::Rng;
use rand_distr::Poisson;
use serde::{Deserialize, Serialize};

/// One piece of a piecewise-constant recombination rate map.
///
/// The rates apply to the region from the previous segment's `end` (or the
/// start of the chromosome) up to, but not including, this segment's `end`.
/// Rates are in cM/Mb, kept separately for male and female meioses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSegment {
    /// Exclusive physical end of the region this rate applies to.
    pub end: Position,
    /// Male recombination rate in cM/Mb.
    pub male: f64,
    /// Female recombination rate in cM/Mb.
    pub female: f64,
}

impl RateSegment {
    /// Rate for the given meiosis sex; unknown sex averages the two maps.
    #[inline]
    fn rate(&self, sex: Option<Sex>) -> f64 {
        match sex {
            Some(Sex::Male) => self.male,
            Some(Sex::Female) => self.female,
            None => 0.5 * (self.male + self.female),
        }
    }
}

/// Sex-specific recombination map for one chromosome.
///
/// Segments cover a prefix of the chromosome; any remainder up to the
/// physical length uses `default_rate` for both sexes. The map converts
/// physical distance into genetic distance and drives crossover placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecombinationMap {
    segments: Vec<RateSegment>,
    default_rate: f64,
}

// cM/Mb to Morgans per base pair.
const MORGANS_PER_BP: f64 = 1e-8;

impl RecombinationMap {
    /// Create a map from ordered rate segments plus a fill rate for the
    /// unmapped tail.
    ///
    /// # Errors
    /// Segment ends must be strictly increasing and every rate finite and
    /// non-negative; `chromosome` only labels the error.
    pub fn new(
        segments: Vec<RateSegment>,
        default_rate: f64,
        chromosome: &str,
    ) -> Result<Self, GenomeMapError> {
        let mut prev: Option<Position> = None;
        for seg in &segments {
            if prev.is_some_and(|p| seg.end <= p) {
                return Err(GenomeMapError::NonIncreasingBreakpoints {
                    chromosome: chromosome.to_string(),
                });
            }
            prev = Some(seg.end);
            for rate in [seg.male, seg.female] {
                if !rate.is_finite() || rate < 0.0 {
                    return Err(GenomeMapError::InvalidRate {
                        chromosome: chromosome.to_string(),
                        rate,
                    });
                }
            }
        }
        if !default_rate.is_finite() || default_rate < 0.0 {
            return Err(GenomeMapError::InvalidRate {
                chromosome: chromosome.to_string(),
                rate: default_rate,
            });
        }
        Ok(Self {
            segments,
            default_rate,
        })
    }

    /// Map with a single rate over the whole chromosome, same for both
    /// sexes. Common in tests and synthetic genomes.
    pub fn uniform(rate: f64) -> Self {
        Self {
            segments: Vec::new(),
            default_rate: rate,
        }
    }

    /// Map with zero rate everywhere (no crossovers ever).
    pub fn none() -> Self {
        Self::uniform(0.0)
    }

    /// Physical end of the last mapped segment, if any.
    pub fn mapped_end(&self) -> Option<Position> {
        self.segments.last().map(|s| s.end)
    }

    /// Recombination rate (cM/Mb) at a physical position.
    pub fn rate_at(&self, pos: Position, sex: Option<Sex>) -> f64 {
        let idx = self.segments.partition_point(|s| s.end <= pos);
        match self.segments.get(idx) {
            Some(seg) => seg.rate(sex),
            None => self.default_rate,
        }
    }

    /// Piecewise-constant rate regions covering `[0, length)`. A segment
    /// straddling `length` is clamped; the tail past the last segment uses
    /// the default rate.
    fn pieces(&self, length: Position, sex: Option<Sex>) -> Vec<(Position, Position, f64)> {
        let mut out = Vec::with_capacity(self.segments.len() + 1);
        let mut prev = 0;
        for seg in &self.segments {
            if prev >= length {
                break;
            }
            let end = seg.end.min(length);
            if end > prev {
                out.push((prev, end, seg.rate(sex)));
            }
            prev = seg.end;
        }
        if prev < length {
            out.push((prev, length, self.default_rate));
        }
        out
    }

    /// Genetic length of `[0, length)` in Morgans for the given sex.
    pub fn genetic_length(&self, length: Position, sex: Option<Sex>) -> f64 {
        self.pieces(length, sex)
            .iter()
            .map(|&(start, end, rate)| rate * (end - start) as f64 * MORGANS_PER_BP)
            .sum()
    }

    /// Sample crossover positions along `[0, length)` as an inhomogeneous
    /// Poisson point process whose local intensity is the sex-specific
    /// rate. The expected count equals `genetic_length(length, sex)`.
    ///
    /// Positions are returned sorted and deduplicated.
    pub fn sample_crossovers<R: Rng + ?Sized>(
        &self,
        length: Position,
        sex: Option<Sex>,
        rng: &mut R,
    ) -> Vec<Position> {
        let mut breaks = Vec::new();
        for (start, end, rate) in self.pieces(length, sex) {
            let morgans = rate * (end - start) as f64 * MORGANS_PER_BP;
            if morgans <= 0.0 {
                continue;
            }
            let poisson = Poisson::new(morgans).expect("positive intensity");
            let count = rng.sample(poisson) as usize;
            for _ in 0..count {
                breaks.push(start + rng.random_range(0..end - start));
            }
        }
        breaks.sort_unstable();
        breaks.dedup();
        breaks
    }
}
