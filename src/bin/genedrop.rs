use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;
use std::time::Instant;

use genedrop::prelude::*;

/// genedrop: a pedigree gene-dropping simulator.
///
/// Synthesizes a founder population, drops founder haplotype segments
/// through random-mating generations and reconstructs genotype dosages
/// for a marker chip. All data is generated in-process; file import is
/// handled by surrounding tooling.
#[derive(Parser, Debug)]
#[command(name = "genedrop")]
#[command(author, version, about = "Simulates gene dropping through a pedigree", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a gene-dropping experiment on a synthetic founder population.
    Drop {
        /// Number of founder individuals
        #[arg(long, default_value = "50")]
        founders: usize,

        /// Autosome count
        #[arg(long, default_value = "3")]
        chromosomes: usize,

        /// Marker sites per chromosome
        #[arg(long, default_value = "200")]
        markers: usize,

        /// Generations of random mating to simulate
        #[arg(short, long, default_value = "10")]
        generations: usize,

        /// Offspring per generation
        #[arg(short, long, default_value = "100")]
        offspring: usize,

        /// Genome-wide ploidy (even; sex chromosomes require 2)
        #[arg(long, default_value = "2")]
        ploidy: u16,

        /// Add X, Y and mitochondrial chromosomes with sexed inheritance
        #[arg(long)]
        sexed: bool,

        /// Recombination rate in cM/Mb applied uniformly
        #[arg(long, default_value = "1.0")]
        rate: f64,

        /// Random seed (default: nondeterministic)
        #[arg(long)]
        seed: Option<u64>,

        /// Show progress bar
        #[arg(long, default_value = "true")]
        progress: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Drop {
            founders,
            chromosomes,
            markers,
            generations,
            offspring,
            ploidy,
            sexed,
            rate,
            seed,
            progress,
        } => run_drop(
            founders,
            chromosomes,
            markers,
            generations,
            offspring,
            ploidy,
            sexed,
            rate,
            seed,
            progress,
        ),
    }
}

const AUTOSOME_LENGTH: Position = 100_000_000;

#[allow(clippy::too_many_arguments)]
fn run_drop(
    n_founders: usize,
    n_chromosomes: usize,
    markers_per_chr: usize,
    generations: usize,
    offspring: usize,
    ploidy: u16,
    sexed: bool,
    rate: f64,
    seed: Option<u64>,
    progress: bool,
) -> Result<()> {
    if n_founders < 2 {
        bail!("need at least two founders");
    }

    let genome = Arc::new(build_genome(n_chromosomes, ploidy, sexed, rate)?);
    let sexes: Vec<Option<Sex>> = (0..n_founders)
        .map(|i| {
            if genome.has_sex_dependent() {
                Some(if i % 2 == 0 { Sex::Male } else { Sex::Female })
            } else {
                None
            }
        })
        .collect();

    let mut seed_rng = match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
    };
    let pool = Arc::new(synthesize_founders(
        &genome,
        &sexes,
        markers_per_chr,
        &mut seed_rng,
    )?);

    let mut population = Population::with_founders(
        genome.clone(),
        pool.clone(),
        &sexes,
        Some(seed_rng.random()),
    )
    .context("founder setup failed")?;

    println!(
        "Dropping genes: {n_founders} founders, {} chromosomes, ploidy {ploidy}, {generations} generations x {offspring} offspring",
        genome.len()
    );

    let bar = if progress {
        let bar = ProgressBar::new(generations as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} generations ({eta})",
        )?);
        Some(bar)
    } else {
        None
    };

    let drop_start = Instant::now();
    for _ in 0..generations {
        let matings = population.random_matings(offspring);
        if matings.is_empty() {
            bail!("current generation cannot be mated (missing a sex?)");
        }
        population.extend_generation(&matings)?;
        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }
    if let Some(bar) = bar {
        bar.finish();
    }
    let drop_elapsed = drop_start.elapsed();

    // Resolve a chip of every autosomal marker for the last generation.
    let chip: Vec<Marker> = genome
        .chromosomes()
        .iter()
        .enumerate()
        .filter(|(_, chr)| chr.kind() == ChromosomeKind::Autosome)
        .flat_map(|(c, chr)| {
            marker_positions(chr.length(), markers_per_chr)
                .into_iter()
                .map(move |pos| Marker::new(c, pos))
        })
        .collect();
    let chip = MarkerSet::new(chip, &pool)?;

    let last: Vec<Individual> = population
        .generation_members(population.current_generation())
        .into_iter()
        .filter_map(|id| population.individual(id).cloned())
        .collect();

    let resolve_start = Instant::now();
    let dosages = resolve_genotypes(&last, &chip, &pool)?;
    let resolve_elapsed = resolve_start.elapsed();

    let freqs = genedrop::resolve::allele_frequencies(&chip, &pool)?;
    let mean_founder_freq = freqs.iter().sum::<f64>() / freqs.len() as f64;
    let mean_dosage =
        dosages.iter().map(|&d| d as f64).sum::<f64>() / dosages.len() as f64;
    let blocks: usize = last
        .iter()
        .flat_map(|ind| ind.chromosomes().iter().flatten())
        .map(|hap| hap.num_blocks())
        .sum();
    let haplotypes: usize = last
        .iter()
        .flat_map(|ind| ind.chromosomes().iter())
        .map(|copies| copies.len())
        .sum();

    println!(
        "Dropped {} individuals in {:.2?}",
        population.size(),
        drop_elapsed
    );
    println!(
        "Resolved {} x {} dosage matrix in {:.2?}",
        dosages.nrows(),
        dosages.ncols(),
        resolve_elapsed
    );
    println!(
        "Mean dosage {:.4} (founder expectation {:.4})",
        mean_dosage,
        mean_founder_freq * f64::from(ploidy)
    );
    println!(
        "Ancestry blocks per haplotype: {:.1}",
        blocks as f64 / haplotypes as f64
    );

    Ok(())
}

fn build_genome(n_chromosomes: usize, ploidy: u16, sexed: bool, rate: f64) -> Result<GenomeMap> {
    let mut chromosomes = Vec::new();
    for i in 0..n_chromosomes {
        chromosomes.push(ChromosomeDescriptor::autosome(
            format!("chr{}", i + 1),
            AUTOSOME_LENGTH,
            rate,
        )?);
    }
    if sexed {
        chromosomes.push(ChromosomeDescriptor::new(
            "chrX",
            ChromosomeKind::X,
            80_000_000,
            RecombinationMap::uniform(rate),
        )?);
        chromosomes.push(ChromosomeDescriptor::new(
            "chrY",
            ChromosomeKind::Y,
            20_000_000,
            RecombinationMap::none(),
        )?);
        chromosomes.push(ChromosomeDescriptor::new(
            "chrMT",
            ChromosomeKind::Mitochondrial,
            16_000,
            RecombinationMap::none(),
        )?);
    }
    Ok(GenomeMap::new(chromosomes, ploidy)?)
}

fn marker_positions(length: Position, count: usize) -> Vec<Position> {
    let step = length / (count as Position + 1);
    (1..=count as Position).map(|i| i * step).collect()
}

/// Random phased founder alleles at evenly spaced marker sites.
fn synthesize_founders(
    genome: &GenomeMap,
    sexes: &[Option<Sex>],
    markers_per_chr: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<FounderPool> {
    let max_allele = if genome.ploidy() == 2 {
        1u8
    } else {
        (genome.ploidy() - 1) as u8
    };

    let mut genomes = Vec::with_capacity(sexes.len());
    for &sex in sexes {
        let mut chromosomes = Vec::with_capacity(genome.len());
        for chr in genome.chromosomes() {
            let copies = chr
                .kind()
                .copies(sex, genome.ploidy())
                .context("sexed genome needs sexed founders")?;
            if chr.length() <= markers_per_chr as Position {
                bail!(
                    "chromosome {} is too short for {markers_per_chr} marker sites",
                    chr.id()
                );
            }
            let positions = marker_positions(chr.length(), markers_per_chr);
            chromosomes.push(
                (0..copies)
                    .map(|_| {
                        FounderHaplotype::from_pairs(
                            positions
                                .iter()
                                .map(|&pos| (pos, rng.random_range(0..=max_allele)))
                                .collect(),
                        )
                    })
                    .collect(),
            );
        }
        genomes.push(FounderGenome::new(chromosomes));
    }
    Ok(FounderPool::from_genomes(genomes, genome)?)
}
