//! Population registry and pedigree extension.
//!
//! Individuals live in a flat, insertion-ordered registry indexed by
//! integer id; parent references are ids into that registry. Creation
//! order is topological order by construction: offspring can only
//! reference parents that already exist, which the registry enforces as a
//! hard error rather than a runtime graph traversal.

use crate::errors::MeiosisError;
use crate::founder::FounderPool;
use crate::genome::{Individual, IndividualId};
use crate::map::{GenomeMap, Sex};
use crate::meiosis::{MeiosisEngine, PairingRule};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use std::sync::Arc;

/// A growing pedigree over a fixed genome map and founder pool.
///
/// The registry is appended to only by the single-threaded extension
/// step; parallel workers (gamete construction, genotype resolution) read
/// a stable snapshot. The founder pool and genome map are shared
/// read-only for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct Population {
    genome: Arc<GenomeMap>,
    founders: Arc<FounderPool>,
    engine: MeiosisEngine,
    individuals: Vec<Individual>,
    /// Master RNG; parallel steps draw per-offspring seeds from it so the
    /// run is reproducible regardless of worker scheduling.
    rng: Xoshiro256PlusPlus,
}

impl Population {
    /// Create a population whose generation 0 is the founder pool.
    ///
    /// `sexes` assigns one sex per founder, in pool order. Founder
    /// individuals get trivial single-block haplotypes referencing their
    /// own pool entries.
    ///
    /// # Errors
    /// `SexMismatch` if the genome needs sexes that are missing;
    /// `InvalidPloidy` if a founder's stored copy counts disagree with
    /// the chromosome kind and sex.
    pub fn with_founders(
        genome: Arc<GenomeMap>,
        founders: Arc<FounderPool>,
        sexes: &[Option<Sex>],
        seed: Option<u64>,
    ) -> Result<Self, MeiosisError> {
        Self::with_founders_and_pairing(genome, founders, sexes, seed, PairingRule::default())
    }

    /// Same as `with_founders` with an explicit copy-pairing rule for
    /// autopolyploid meiosis.
    pub fn with_founders_and_pairing(
        genome: Arc<GenomeMap>,
        founders: Arc<FounderPool>,
        sexes: &[Option<Sex>],
        seed: Option<u64>,
        pairing: PairingRule,
    ) -> Result<Self, MeiosisError> {
        assert_eq!(sexes.len(), founders.len(), "one sex per founder");

        let rng = match seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
        };

        let mut individuals = Vec::with_capacity(founders.len());
        for (index, &sex) in sexes.iter().enumerate() {
            let id = index as IndividualId + 1;
            let individual = Individual::founder(id, sex, &genome)?;
            // The pool must store exactly the copies the individual
            // carries, or block lookups would dangle later.
            let stored = founders.genome(id).expect("founder ids are 1..=len");
            for (c, chr) in genome.chromosomes().iter().enumerate() {
                let expected = individual.haplotypes(c).len();
                let found = stored.copies(c).len();
                if expected != found {
                    return Err(MeiosisError::InvalidPloidy {
                        chromosome: chr.id().to_string(),
                        expected,
                        found,
                    });
                }
            }
            individuals.push(individual);
        }

        Ok(Self {
            engine: MeiosisEngine::with_pairing(genome.clone(), pairing),
            genome,
            founders,
            individuals,
            rng,
        })
    }

    #[inline]
    pub fn genome(&self) -> &Arc<GenomeMap> {
        &self.genome
    }

    #[inline]
    pub fn founder_pool(&self) -> &Arc<FounderPool> {
        &self.founders
    }

    /// Number of individuals created so far, founders included.
    #[inline]
    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// All individuals in creation (= topological) order.
    #[inline]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Individual by registry id (1-based).
    pub fn individual(&self, id: IndividualId) -> Option<&Individual> {
        if id == 0 {
            return None;
        }
        self.individuals.get(id as usize - 1)
    }

    /// Highest generation label present in the registry.
    pub fn current_generation(&self) -> u32 {
        self.individuals
            .iter()
            .map(|i| i.generation())
            .max()
            .unwrap_or(0)
    }

    /// Ids of all members of one generation, in creation order.
    pub fn generation_members(&self, generation: u32) -> Vec<IndividualId> {
        self.individuals
            .iter()
            .filter(|i| i.generation() == generation)
            .map(|i| i.id())
            .collect()
    }

    /// Create one offspring of the given parents, drawing its sex when
    /// the genome requires one.
    pub fn create_offspring(
        &mut self,
        father: IndividualId,
        mother: IndividualId,
    ) -> Result<IndividualId, MeiosisError> {
        let sex = self.draw_sex();
        self.create_offspring_as(father, mother, sex)
    }

    /// Create one offspring with an explicit sex.
    pub fn create_offspring_as(
        &mut self,
        father: IndividualId,
        mother: IndividualId,
        sex: Option<Sex>,
    ) -> Result<IndividualId, MeiosisError> {
        let id = self.individuals.len() as IndividualId + 1;
        let child = conceive(
            &self.engine,
            &self.individuals,
            father,
            mother,
            sex,
            id,
            &mut self.rng,
        )?;
        self.individuals.push(child);
        Ok(id)
    }

    /// Create a whole batch of offspring in parallel over a stable
    /// snapshot of the registry, then append them in order.
    ///
    /// Matings may only reference individuals that already exist; pairs
    /// referencing ids from the same batch fail with `InvalidPedigree`,
    /// which keeps generations causally ordered. Each offspring gets its
    /// own seed drawn from the master RNG, so results are independent of
    /// worker scheduling.
    pub fn extend_generation(
        &mut self,
        matings: &[(IndividualId, IndividualId)],
    ) -> Result<Vec<IndividualId>, MeiosisError> {
        let seeds: Vec<u64> = matings.iter().map(|_| self.rng.random()).collect();
        let sexes: Vec<Option<Sex>> = matings.iter().map(|_| self.draw_sex()).collect();
        let base = self.individuals.len() as IndividualId;

        let engine = &self.engine;
        let snapshot = &self.individuals;
        let children: Vec<Individual> = matings
            .par_iter()
            .zip(seeds.par_iter())
            .enumerate()
            .map(|(k, (&(father, mother), &seed))| {
                let mut local_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                conceive(
                    engine,
                    snapshot,
                    father,
                    mother,
                    sexes[k],
                    base + k as IndividualId + 1,
                    &mut local_rng,
                )
            })
            .collect::<Result<_, _>>()?;

        let ids = children.iter().map(|c| c.id()).collect();
        self.individuals.extend(children);
        Ok(ids)
    }

    /// Draw `n` random father/mother pairs from the current generation,
    /// uniformly and with replacement across pairs.
    ///
    /// On sexed genomes fathers are drawn from the males and mothers from
    /// the females of that generation; returns an empty list when either
    /// side is missing. On unsexed genomes any two distinct members pair.
    pub fn random_matings(&mut self, n: usize) -> Vec<(IndividualId, IndividualId)> {
        let members = self.generation_members(self.current_generation());
        if self.genome.has_sex_dependent() {
            let males: Vec<IndividualId> = members
                .iter()
                .copied()
                .filter(|&id| self.individual(id).and_then(|i| i.sex()) == Some(Sex::Male))
                .collect();
            let females: Vec<IndividualId> = members
                .iter()
                .copied()
                .filter(|&id| self.individual(id).and_then(|i| i.sex()) == Some(Sex::Female))
                .collect();
            if males.is_empty() || females.is_empty() {
                return Vec::new();
            }
            (0..n)
                .map(|_| {
                    (
                        males[self.rng.random_range(0..males.len())],
                        females[self.rng.random_range(0..females.len())],
                    )
                })
                .collect()
        } else {
            if members.len() < 2 {
                return Vec::new();
            }
            (0..n)
                .map(|_| {
                    let a = members[self.rng.random_range(0..members.len())];
                    let mut b = a;
                    while b == a {
                        b = members[self.rng.random_range(0..members.len())];
                    }
                    (a, b)
                })
                .collect()
        }
    }

    fn draw_sex(&mut self) -> Option<Sex> {
        if self.genome.has_sex_dependent() {
            Some(if self.rng.random_bool(0.5) {
                Sex::Male
            } else {
                Sex::Female
            })
        } else {
            None
        }
    }
}

/// Assemble one offspring from freshly drawn parental gametes.
fn conceive<R: Rng + ?Sized>(
    engine: &MeiosisEngine,
    individuals: &[Individual],
    father_id: IndividualId,
    mother_id: IndividualId,
    child_sex: Option<Sex>,
    id: IndividualId,
    rng: &mut R,
) -> Result<Individual, MeiosisError> {
    let genome = engine.genome();
    let father = fetch(individuals, father_id)?;
    let mother = fetch(individuals, mother_id)?;

    if genome.has_sex_dependent() {
        if father.sex() != Some(Sex::Male) {
            return Err(MeiosisError::SexMismatch { id: father_id });
        }
        if mother.sex() != Some(Sex::Female) {
            return Err(MeiosisError::SexMismatch { id: mother_id });
        }
        if child_sex.is_none() {
            return Err(MeiosisError::SexMismatch { id });
        }
    }

    let generation = father.generation().max(mother.generation()) + 1;
    let mut chromosomes = Vec::with_capacity(genome.len());
    for c in 0..genome.len() {
        // Maternal gamete copies first, then paternal ones.
        let mut copies = engine.make_gamete(mother, c, child_sex, rng)?;
        copies.extend(engine.make_gamete(father, c, child_sex, rng)?);
        chromosomes.push(copies);
    }

    Ok(Individual::new(
        id,
        father_id,
        mother_id,
        child_sex,
        generation,
        chromosomes,
    ))
}

fn fetch(individuals: &[Individual], id: IndividualId) -> Result<&Individual, MeiosisError> {
    if id == 0 {
        return Err(MeiosisError::InvalidPedigree { id });
    }
    individuals
        .get(id as usize - 1)
        .ok_or(MeiosisError::InvalidPedigree { id })
}
