//! Held-Karp TSP Solver - Command Line Interface
//!
//! Exact TSP over 2-D points using the Held-Karp dynamic program.

use clap::{Parser, Subcommand, ValueEnum};
use held_karp_tsp::benchmark::{Benchmark, BenchmarkConfig};
use held_karp_tsp::exact::{BruteForceSolver, HeldKarpConfig, HeldKarpSolver, TspSolver};
use held_karp_tsp::generator::{sample_instance, GeneratorConfig, PointGenerator};
use held_karp_tsp::instance::TspInstance;
use held_karp_tsp::solution::costs_agree;

use std::time::Instant;

#[derive(Parser)]
#[command(name = "held-karp-tsp")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Exact Travelling Salesman solver using the Held-Karp algorithm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one instance and print the optimal tour
    Solve {
        /// Point source
        #[arg(short, long, value_enum, default_value = "sample")]
        dataset: Dataset,

        /// Number of random cities besides the origin
        #[arg(short, long, default_value = "15")]
        cities: usize,

        /// Grid extent along x for random cities
        #[arg(long, default_value = "100.0")]
        grid_x: f64,

        /// Grid extent along y for random cities
        #[arg(long, default_value = "100.0")]
        grid_y: f64,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Fill the DP table one popcount layer at a time in parallel
        #[arg(long)]
        parallel: bool,

        /// Refuse instances with more cities than this
        #[arg(long, default_value = "22")]
        max_cities: usize,

        /// Print the solution as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Time the solver on random instances of growing size
    Benchmark {
        /// Smallest city count (including the origin)
        #[arg(long, default_value = "4")]
        min_cities: usize,

        /// Largest city count (including the origin)
        #[arg(long, default_value = "16")]
        max_cities: usize,

        /// Instances per city count
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Seed of the first instance
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Use the parallel table fill
        #[arg(long)]
        parallel: bool,
    },

    /// Cross-check Held-Karp against exhaustive search
    Verify {
        /// Largest city count to check (including the origin)
        #[arg(short, long, default_value = "8")]
        cities: usize,

        /// Instances per city count
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Seed of the first instance
        #[arg(short, long, default_value = "0")]
        seed: u64,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Dataset {
    /// The fixed sixteen-city dataset
    Sample,
    /// Uniform random cities plus a random origin
    Random,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { dataset, cities, grid_x, grid_y, seed, parallel, max_cities, json, verbose } => {
            let generator = GeneratorConfig { grid_x, grid_y, num_cities: cities, seed };
            let config = HeldKarpConfig { max_cities, parallel };
            solve_instance(dataset, generator, config, json, verbose);
        }

        Commands::Benchmark { min_cities, max_cities, runs, seed, parallel } => {
            let config = BenchmarkConfig {
                min_cities,
                max_cities,
                num_runs: runs,
                seed,
                parallel,
                ..Default::default()
            };
            run_benchmark(config);
        }

        Commands::Verify { cities, runs, seed } => {
            verify(cities, runs, seed);
        }
    }
}

fn load_instance(dataset: Dataset, generator: GeneratorConfig) -> TspInstance {
    let loaded = match dataset {
        Dataset::Sample => sample_instance(),
        Dataset::Random => PointGenerator::new(generator).and_then(|g| g.generate_instance()),
    };

    match loaded {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error building instance: {}", e);
            std::process::exit(1);
        }
    }
}

fn solve_instance(
    dataset: Dataset,
    generator: GeneratorConfig,
    config: HeldKarpConfig,
    json: bool,
    verbose: bool,
) {
    let instance = load_instance(dataset, generator);

    if verbose {
        println!("{}", instance.statistics());
    }

    let solver = HeldKarpSolver::new(config);
    let start = Instant::now();
    let result = match solver.solve(&instance) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Solver error: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if json {
        match serde_json::to_string_pretty(&result.solution) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize solution: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let path: Vec<String> = result
        .solution
        .points(&instance)
        .iter()
        .map(|p| p.to_string())
        .collect();

    println!("Optimal Path:");
    println!("{}", path.join(" -> "));
    println!("Minimum Tour Cost: {}", result.solution.cost);
    println!("Execution Time: {} nanoseconds", elapsed.as_nanos());
    println!("Table Memory: {} bytes", result.table_bytes);

    if verbose {
        println!("\nTour: {:?}", result.solution.tour);
        println!("Last city before origin: {}", result.last_city);
        println!("States evaluated: {}", result.states_evaluated);
    }
}

fn run_benchmark(config: BenchmarkConfig) {
    println!(
        "Benchmarking Held-Karp on n={}..={} ({} runs each)...",
        config.min_cities, config.max_cities, config.num_runs
    );

    let mut benchmark = match Benchmark::new(config) {
        Ok(benchmark) => benchmark,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = benchmark.run() {
        eprintln!("Benchmark failed: {}", e);
        std::process::exit(1);
    }

    println!("\n{}", benchmark.generate_report());
}

fn verify(max_cities: usize, runs: usize, seed: u64) {
    let held_karp = HeldKarpSolver::default();
    let brute_force = BruteForceSolver::new();
    let mut mismatches = 0usize;
    let mut checked = 0usize;

    println!(
        "Checking {} against {} for n=1..={}...",
        held_karp.name(),
        brute_force.name(),
        max_cities
    );

    for cities in 1..=max_cities {
        for run in 0..runs as u64 {
            let config = GeneratorConfig {
                num_cities: cities - 1,
                seed: seed.wrapping_add(run),
                ..Default::default()
            };
            let instance = load_instance(Dataset::Random, config);

            let outcome = held_karp
                .run(&instance)
                .and_then(|exact| brute_force.run(&instance).map(|reference| (exact, reference)));
            let (exact, reference) = match outcome {
                Ok(pair) => pair,
                Err(e) => {
                    eprintln!("Error on {}: {}", instance.name, e);
                    std::process::exit(1);
                }
            };

            checked += 1;
            if !costs_agree(exact.cost, reference.cost) {
                mismatches += 1;
                println!(
                    "MISMATCH {}: held-karp {:.9} vs brute force {:.9}",
                    instance.name, exact.cost, reference.cost
                );
            }
        }
    }

    println!("{} instances checked, {} mismatches", checked, mismatches);
    if mismatches > 0 {
        std::process::exit(1);
    }
}
