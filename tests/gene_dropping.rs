//! End-to-end gene-dropping workflows: inheritance rules, structural
//! invariants and genotype resolution across multiple generations.

use genedrop::prelude::*;
use std::sync::Arc;

const AUTOSOME_LEN: Position = 50_000_000;
const X_LEN: Position = 40_000_000;
const Y_LEN: Position = 10_000_000;
const MT_LEN: Position = 16_000;
const MARKER_STEP: Position = 1_000_000;

fn sexed_genome() -> Arc<GenomeMap> {
    Arc::new(
        GenomeMap::diploid(vec![
            ChromosomeDescriptor::autosome("chr1", AUTOSOME_LEN, 1.5).unwrap(),
            ChromosomeDescriptor::new(
                "chrX",
                ChromosomeKind::X,
                X_LEN,
                RecombinationMap::uniform(1.0),
            )
            .unwrap(),
            ChromosomeDescriptor::new("chrY", ChromosomeKind::Y, Y_LEN, RecombinationMap::none())
                .unwrap(),
            ChromosomeDescriptor::new(
                "chrMT",
                ChromosomeKind::Mitochondrial,
                MT_LEN,
                RecombinationMap::none(),
            )
            .unwrap(),
        ])
        .unwrap(),
    )
}

fn marker_positions(length: Position) -> Vec<Position> {
    (1..)
        .map(|i| i * MARKER_STEP)
        .take_while(|&p| p < length)
        .collect()
}

/// Founders with distinguishable haplotypes: founder f carries allele
/// `f % 2` on every copy, so parity identifies the source founder.
fn founder_pool(genome: &GenomeMap, sexes: &[Option<Sex>]) -> FounderPool {
    let genomes = sexes
        .iter()
        .enumerate()
        .map(|(index, &sex)| {
            let allele = ((index + 1) % 2) as u8;
            let chromosomes = genome
                .chromosomes()
                .iter()
                .map(|chr| {
                    let copies = chr.kind().copies(sex, genome.ploidy()).unwrap();
                    let positions = if chr.length() > MARKER_STEP {
                        marker_positions(chr.length())
                    } else {
                        vec![chr.length() / 2]
                    };
                    (0..copies)
                        .map(|_| {
                            FounderHaplotype::from_pairs(
                                positions.iter().map(|&p| (p, allele)).collect(),
                            )
                        })
                        .collect()
                })
                .collect();
            FounderGenome::new(chromosomes)
        })
        .collect();
    FounderPool::from_genomes(genomes, genome).unwrap()
}

fn sexed_population(n_founders: usize, seed: u64) -> Population {
    let genome = sexed_genome();
    let sexes: Vec<Option<Sex>> = (0..n_founders)
        .map(|i| Some(if i % 2 == 0 { Sex::Male } else { Sex::Female }))
        .collect();
    let pool = Arc::new(founder_pool(&genome, &sexes));
    Population::with_founders(genome, pool, &sexes, Some(seed)).unwrap()
}

fn run_generations(population: &mut Population, generations: usize, offspring: usize) {
    for _ in 0..generations {
        let matings = population.random_matings(offspring);
        assert!(!matings.is_empty(), "generation lost a sex entirely");
        population.extend_generation(&matings).unwrap();
    }
}

#[test]
fn test_tiling_invariant_over_generations() {
    let mut population = sexed_population(6, 42);
    run_generations(&mut population, 6, 24);

    for ind in population.individuals() {
        for (c, chr) in population.genome().chromosomes().iter().enumerate() {
            for hap in ind.haplotypes(c) {
                assert!(
                    hap.tiles(chr.length()),
                    "individual {} chromosome {} violates the tiling invariant",
                    ind.id(),
                    chr.id()
                );
            }
        }
    }
}

#[test]
fn test_founder_conservation() {
    let mut population = sexed_population(6, 43);
    run_generations(&mut population, 6, 24);

    // Every block must terminate at a generation-0 individual.
    for ind in population.individuals() {
        for copies in ind.chromosomes() {
            for hap in copies {
                for block in hap.blocks() {
                    let origin = population.individual(block.founder).unwrap();
                    assert!(
                        origin.is_founder(),
                        "block of individual {} traces to non-founder {}",
                        ind.id(),
                        block.founder
                    );
                }
            }
        }
    }
}

#[test]
fn test_mitochondrial_identity_down_the_matriline() {
    let mut population = sexed_population(6, 44);
    run_generations(&mut population, 8, 24);

    // MT is chromosome index 3. Every non-founder's MT haplotype must be
    // byte-identical to its mother's, at any depth.
    for ind in population.individuals() {
        if ind.is_founder() {
            continue;
        }
        let mother = population.individual(ind.mother()).unwrap();
        assert_eq!(
            ind.haplotypes(3),
            mother.haplotypes(3),
            "individual {} mitochondria differ from mother {}",
            ind.id(),
            mother.id()
        );
    }
}

#[test]
fn test_x_and_y_routing_in_first_generation() {
    let mut population = sexed_population(2, 45);
    // Parents are founders 1 (male) and 2 (female).
    let mut sons = Vec::new();
    let mut daughters = Vec::new();
    while sons.is_empty() || daughters.is_empty() {
        let id = population.create_offspring(1, 2).unwrap();
        match population.individual(id).unwrap().sex().unwrap() {
            Sex::Male => sons.push(id),
            Sex::Female => daughters.push(id),
        }
    }

    let father = population.individual(1).unwrap().clone();
    for &id in &sons {
        let son = population.individual(id).unwrap();
        // Sons carry one X, entirely maternal, and the paternal Y verbatim.
        assert_eq!(son.haplotypes(1).len(), 1);
        for block in son.haplotypes(1)[0].blocks() {
            assert_eq!(block.founder, 2);
        }
        assert_eq!(son.haplotypes(2), father.haplotypes(2));
    }
    for &id in &daughters {
        let daughter = population.individual(id).unwrap();
        // Daughters carry a maternal recombinant and the paternal X verbatim.
        assert_eq!(daughter.haplotypes(1).len(), 2);
        for block in daughter.haplotypes(1)[0].blocks() {
            assert_eq!(block.founder, 2);
        }
        assert_eq!(&daughter.haplotypes(1)[1], &father.haplotypes(1)[0]);
        assert!(daughter.haplotypes(2).is_empty());
    }
}

#[test]
fn test_resolver_roundtrip_for_founders() {
    let population = sexed_population(6, 46);
    let pool = population.founder_pool().clone();

    let chip = MarkerSet::new(
        marker_positions(AUTOSOME_LEN)
            .into_iter()
            .map(|p| Marker::new(0, p))
            .collect(),
        &pool,
    )
    .unwrap();

    let founders: Vec<Individual> = population.individuals().to_vec();
    let dosages = resolve_genotypes(&founders, &chip, &pool).unwrap();

    // Founder f is homozygous for allele (f % 2): dosage 2 * (f % 2).
    for (i, ind) in founders.iter().enumerate() {
        let expected = 2 * (ind.id() % 2) as u8;
        for m in 0..chip.len() {
            assert_eq!(dosages[[m, i]], expected);
        }
    }
}

#[test]
fn test_two_founder_dosage_scenario() {
    // Founder 1 (male) is 1/1 at every site, founder 2 (female) is 0/0.
    // Their child inherits exactly one allele from each parent's
    // contributing copy, so autosomal dosage is exactly 1, and repeated
    // resolution never changes it.
    let mut population = sexed_population(2, 47);
    let child = population.create_offspring(1, 2).unwrap();
    let pool = population.founder_pool().clone();

    let marker = Marker::new(0, 1_000_000);
    let ind = population.individual(child).unwrap().clone();

    let first = genedrop::resolve::dosage_at(&ind, marker, &pool).unwrap();
    assert_eq!(first, 1);
    for _ in 0..10 {
        assert_eq!(
            genedrop::resolve::dosage_at(&ind, marker, &pool).unwrap(),
            first
        );
    }
}

#[test]
fn test_fixed_markers_stay_fixed() {
    // With every founder homozygous for the same allele at a site, gene
    // dropping can never change its dosage.
    let genome = sexed_genome();
    let sexes = vec![Some(Sex::Male), Some(Sex::Female), Some(Sex::Female)];
    let genomes = sexes
        .iter()
        .map(|&sex| {
            let chromosomes = genome
                .chromosomes()
                .iter()
                .map(|chr| {
                    let copies = chr.kind().copies(sex, genome.ploidy()).unwrap();
                    (0..copies)
                        .map(|_| FounderHaplotype::from_pairs(vec![(chr.length() / 2, 1)]))
                        .collect()
                })
                .collect();
            FounderGenome::new(chromosomes)
        })
        .collect();
    let pool = Arc::new(FounderPool::from_genomes(genomes, &genome).unwrap());
    let mut population =
        Population::with_founders(genome.clone(), pool.clone(), &sexes, Some(48)).unwrap();
    run_generations(&mut population, 5, 16);

    let chip = MarkerSet::new(vec![Marker::new(0, AUTOSOME_LEN / 2)], &pool).unwrap();
    let individuals: Vec<Individual> = population.individuals().to_vec();
    let dosages = resolve_genotypes(&individuals, &chip, &pool).unwrap();
    assert!(dosages.iter().all(|&d| d == 2));
}

#[test]
fn test_qtn_layer_over_dropped_population() {
    let mut population = sexed_population(6, 49);
    run_generations(&mut population, 4, 20);
    let pool = population.founder_pool().clone();

    let arch = TraitArchitecture::new(
        "trait1",
        vec![
            QtnEffect {
                chromosome: 0,
                position: 1_000_000,
                additive: 1.0,
                dominance: 0.25,
            },
            QtnEffect {
                chromosome: 0,
                position: 2_000_000,
                additive: -0.5,
                dominance: 0.0,
            },
        ],
        &pool,
    )
    .unwrap();

    let individuals: Vec<Individual> = population.individuals().to_vec();
    let values = arch.breeding_values(&individuals, &pool).unwrap();
    assert_eq!(values.len(), individuals.len());
    assert!(values.iter().all(|v| v.is_finite()));

    // Half the founder copies carry allele 1 at every site, so p = 0.5
    // and the closed-form additive variance is strictly positive.
    let va = arch.additive_variance(&pool).unwrap();
    assert!(va > 0.0);
}

#[test]
fn test_marker_filtering_against_pool() {
    let population = sexed_population(4, 50);
    let pool = population.founder_pool();

    let (chip, dropped) = MarkerSet::retain_known(
        vec![
            Marker::new(0, 1_000_000),
            Marker::new(0, 1_234_567), // not a marker site
            Marker::new(0, 2_000_000),
        ],
        pool,
    );
    assert_eq!(chip.len(), 2);
    assert_eq!(dropped, vec![Marker::new(0, 1_234_567)]);

    // The strict constructor refuses the same list outright.
    assert!(matches!(
        MarkerSet::new(vec![Marker::new(0, 1_234_567)], pool),
        Err(ResolveError::MarkerNotFound { .. })
    ));
}
