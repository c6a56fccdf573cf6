use crate::errors::MeiosisError;
use crate::genome::{Haplotype, IndividualId};
use crate::map::{GenomeMap, Sex};
use serde::{Deserialize, Serialize};

/// One individual of the pedigree.
///
/// Parent ids of 0 mark a founder (or unknown parent). Per chromosome the
/// individual owns one `Haplotype` per copy it carries; the copy count
/// follows the chromosome kind and the individual's sex (autosomes carry
/// the genome ploidy, X/Y/MT follow the diploid sex constitution).
///
/// Individuals are write-once: breeding appends new individuals to the
/// population, it never edits existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    id: IndividualId,
    father: IndividualId,
    mother: IndividualId,
    sex: Option<Sex>,
    generation: u32,
    /// Haplotypes per chromosome, parallel to the genome map's order.
    /// Maternal gamete copies precede paternal ones.
    chromosomes: Vec<Vec<Haplotype>>,
}

impl Individual {
    /// Generation-0 individual whose haplotypes are trivial single-block
    /// tilings referencing its own founder data.
    ///
    /// # Errors
    /// `SexMismatch` if the genome carries sex-dependent chromosomes and
    /// `sex` is `None`.
    pub fn founder(
        id: IndividualId,
        sex: Option<Sex>,
        genome: &GenomeMap,
    ) -> Result<Self, MeiosisError> {
        let mut chromosomes = Vec::with_capacity(genome.len());
        for chr in genome.chromosomes() {
            let copies = chr
                .kind()
                .copies(sex, genome.ploidy())
                .ok_or(MeiosisError::SexMismatch { id })?;
            chromosomes.push(
                (0..copies)
                    .map(|h| Haplotype::founder_single(chr.length(), id, h as u16))
                    .collect(),
            );
        }
        Ok(Self {
            id,
            father: 0,
            mother: 0,
            sex,
            generation: 0,
            chromosomes,
        })
    }

    /// Assemble an offspring from gamete haplotypes. Used by the
    /// population's offspring step; invariants are established there.
    pub(crate) fn new(
        id: IndividualId,
        father: IndividualId,
        mother: IndividualId,
        sex: Option<Sex>,
        generation: u32,
        chromosomes: Vec<Vec<Haplotype>>,
    ) -> Self {
        Self {
            id,
            father,
            mother,
            sex,
            generation,
            chromosomes,
        }
    }

    #[inline]
    pub fn id(&self) -> IndividualId {
        self.id
    }

    #[inline]
    pub fn father(&self) -> IndividualId {
        self.father
    }

    #[inline]
    pub fn mother(&self) -> IndividualId {
        self.mother
    }

    #[inline]
    pub fn sex(&self) -> Option<Sex> {
        self.sex
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// True for generation-0 individuals taken directly from input data.
    #[inline]
    pub fn is_founder(&self) -> bool {
        self.father == 0 && self.mother == 0
    }

    /// Haplotype copies of one chromosome, by map index.
    #[inline]
    pub fn haplotypes(&self, chr_index: usize) -> &[Haplotype] {
        &self.chromosomes[chr_index]
    }

    /// All haplotypes, outer index parallel to the genome map.
    #[inline]
    pub fn chromosomes(&self) -> &[Vec<Haplotype>] {
        &self.chromosomes
    }
}
