//! Benchmarking module for the Held-Karp solver.
//!
//! Times the solver on seeded random instances across a range of city
//! counts and aggregates wall-clock time, cost and table footprint.

use crate::error::{Result, TspError};
use crate::exact::{HeldKarpConfig, HeldKarpSolver};
use crate::generator::{GeneratorConfig, PointGenerator};

use indicatif::{ProgressBar, ProgressStyle};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Result of a single timed solve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Number of cities including the origin
    pub cities: usize,
    /// Seed used to generate the instance
    pub seed: u64,
    /// Optimal tour cost
    pub cost: f64,
    /// Computation time in seconds
    pub time: f64,
    /// DP entries filled
    pub states: u64,
    /// Table footprint in bytes
    pub table_bytes: usize,
}

/// Aggregated statistics for one city count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeStatistics {
    pub cities: usize,
    pub runs: usize,
    pub avg_cost: f64,
    pub avg_time: f64,
    pub std_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub table_bytes: usize,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Smallest city count (including the origin)
    pub min_cities: usize,
    /// Largest city count (including the origin)
    pub max_cities: usize,
    /// Instances per city count
    pub num_runs: usize,
    /// Seed of the first instance; run `r` uses `seed + r`, wrapping at `u64::MAX`
    pub seed: u64,
    pub grid_x: f64,
    pub grid_y: f64,
    /// Use the layer-parallel table fill
    pub parallel: bool,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            min_cities: 4,
            max_cities: 16,
            num_runs: 5,
            seed: 42,
            grid_x: 100.0,
            grid_y: 100.0,
            parallel: false,
            show_progress: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<BenchmarkResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        if config.min_cities == 0 || config.min_cities > config.max_cities {
            return Err(TspError::invalid_config(format!(
                "city range {}..={} is empty",
                config.min_cities, config.max_cities
            )));
        }
        if config.num_runs == 0 {
            return Err(TspError::invalid_config("at least one run is required"));
        }
        Ok(Benchmark {
            config,
            results: Vec::new(),
        })
    }

    /// Run every (city count, seed) combination
    pub fn run(&mut self) -> Result<()> {
        let solver = HeldKarpSolver::new(HeldKarpConfig {
            max_cities: self.config.max_cities,
            parallel: self.config.parallel,
        });

        let sizes = self.config.max_cities - self.config.min_cities + 1;
        let total = (sizes * self.config.num_runs) as u64;
        let progress = if self.config.show_progress {
            ProgressBar::new(total)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for cities in self.config.min_cities..=self.config.max_cities {
            progress.set_message(format!("n={}", cities));
            for run in 0..self.config.num_runs {
                let seed = self.config.seed.wrapping_add(run as u64);
                let generator = PointGenerator::new(GeneratorConfig {
                    grid_x: self.config.grid_x,
                    grid_y: self.config.grid_y,
                    num_cities: cities - 1,
                    seed,
                })?;
                let instance = generator.generate_instance()?;
                let result = solver.solve(&instance)?;

                self.results.push(BenchmarkResult {
                    cities,
                    seed,
                    cost: result.solution.cost,
                    time: result.solution.computation_time,
                    states: result.states_evaluated,
                    table_bytes: result.table_bytes,
                });
                progress.inc(1);
            }
            log::info!("benchmark: finished n={}", cities);
        }

        progress.finish_and_clear();
        Ok(())
    }

    /// Compute statistics for each city count
    pub fn compute_statistics(&self) -> Vec<SizeStatistics> {
        let mut by_size: BTreeMap<usize, Vec<&BenchmarkResult>> = BTreeMap::new();
        for result in &self.results {
            by_size.entry(result.cities).or_default().push(result);
        }

        by_size
            .into_iter()
            .map(|(cities, results)| {
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();
                let costs: Vec<f64> = results.iter().map(|r| r.cost).collect();
                let min_time = times.iter().copied().map(OrderedFloat).min().map_or(0.0, |t| t.0);
                let max_time = times.iter().copied().map(OrderedFloat).max().map_or(0.0, |t| t.0);
                let std_time = if times.len() > 1 { times.iter().std_dev() } else { 0.0 };

                SizeStatistics {
                    cities,
                    runs: results.len(),
                    avg_cost: costs.iter().mean(),
                    avg_time: times.iter().mean(),
                    std_time,
                    min_time,
                    max_time,
                    table_bytes: results[0].table_bytes,
                }
            })
            .collect()
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       Held-Karp Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        report.push_str(&format!(
            "Grid: {} x {}, runs per size: {}, parallel: {}\n\n",
            self.config.grid_x, self.config.grid_y, self.config.num_runs, self.config.parallel
        ));

        report.push_str("-".repeat(84).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
            "Cities", "Avg Cost", "Avg Time", "Std Time", "Min Time", "Max Time", "Table KiB"
        ));
        report.push_str("-".repeat(84).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:>6} {:>12.2} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.1}\n",
                stat.cities,
                stat.avg_cost,
                stat.avg_time,
                stat.std_time,
                stat.min_time,
                stat.max_time,
                stat.table_bytes as f64 / 1024.0
            ));
        }

        report.push_str("-".repeat(84).as_str());
        report.push('\n');
        report
    }

    /// Get all results
    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }
}
