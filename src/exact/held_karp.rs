//! Held-Karp dynamic program over bitmask subsets.
//!
//! `cost[mask][i]` is the shortest path that leaves city 0, visits exactly
//! the cities of `mask` and stops at city `i`. Every useful mask contains
//! city 0, so the table keeps one row per odd mask: row `mask >> 1`.

use super::TspSolver;
use crate::error::{Result, TspError};
use crate::instance::{Point, TspInstance};
use crate::solution::Solution;
use rayon::prelude::*;
use std::time::Instant;

/// Upper bound on `max_cities`. At 26 cities the tables already take about
/// 14 GiB, so this only keeps masks and table sizes from overflowing; the
/// configured `max_cities` is the practical memory guard.
pub const HARD_CITY_LIMIT: usize = 26;

/// City counts above this log a memory warning before the table is built
const LARGE_INSTANCE_WARNING: usize = 20;

/// Held-Karp solver configuration
#[derive(Debug, Clone)]
pub struct HeldKarpConfig {
    /// Reject instances with more cities than this (capped at [`HARD_CITY_LIMIT`])
    pub max_cities: usize,
    /// Fill each popcount layer of the table in parallel
    pub parallel: bool,
}

impl Default for HeldKarpConfig {
    fn default() -> Self {
        HeldKarpConfig {
            max_cities: 22,
            parallel: false,
        }
    }
}

/// Result of an exact solve
#[derive(Debug, Clone)]
pub struct ExactResult {
    pub solution: Solution,
    /// Optimal cycle cost read from the table
    pub optimal_cost: f64,
    /// Last city visited before returning to the origin
    pub last_city: usize,
    /// Number of (mask, city) entries filled
    pub states_evaluated: u64,
    /// Size of the cost and predecessor tables
    pub table_bytes: usize,
}

/// Dense cost/predecessor tables indexed by (mask, city)
struct DpTable {
    n: usize,
    cost: Vec<Option<f64>>,
    pred: Vec<u8>,
}

impl DpTable {
    fn new(n: usize) -> Self {
        let entries = (1usize << (n - 1)) * n;
        let mut table = DpTable {
            n,
            cost: vec![None; entries],
            pred: vec![0; entries],
        };
        // The trivial path: only the origin.
        let origin = table.index(1, 0);
        table.cost[origin] = Some(0.0);
        table
    }

    #[inline]
    fn index(&self, mask: usize, city: usize) -> usize {
        debug_assert!(mask & 1 == 1, "mask {mask:#b} lacks the origin");
        (mask >> 1) * self.n + city
    }

    #[inline]
    fn cost(&self, mask: usize, city: usize) -> Option<f64> {
        self.cost[self.index(mask, city)]
    }

    #[inline]
    fn pred(&self, mask: usize, city: usize) -> usize {
        self.pred[self.index(mask, city)] as usize
    }

    #[inline]
    fn set(&mut self, mask: usize, city: usize, cost: f64, pred: usize) {
        let idx = self.index(mask, city);
        self.cost[idx] = Some(cost);
        self.pred[idx] = pred as u8;
    }

    /// Cheapest way to end at `city` having visited `mask`.
    ///
    /// Predecessors are scanned in ascending order and only a strictly
    /// smaller cost replaces the incumbent, so the lowest index wins ties.
    fn best_predecessor(&self, instance: &TspInstance, mask: usize, city: usize) -> Option<(f64, usize)> {
        let prev_mask = mask ^ (1 << city);
        let mut best: Option<(f64, usize)> = None;

        for j in 0..self.n {
            if j == city || prev_mask & (1 << j) == 0 {
                continue;
            }
            let Some(base) = self.cost(prev_mask, j) else {
                continue;
            };
            let candidate = base + instance.distance(j, city);
            if best.map_or(true, |(c, _)| candidate < c) {
                best = Some((candidate, j));
            }
        }

        best
    }

    /// Row of best predecessors for every non-origin city in `mask`
    fn compute_row(&self, instance: &TspInstance, mask: usize) -> Vec<Option<(f64, usize)>> {
        (0..self.n)
            .map(|city| {
                if city == 0 || mask & (1 << city) == 0 {
                    None
                } else {
                    self.best_predecessor(instance, mask, city)
                }
            })
            .collect()
    }
}

/// Exact TSP solver based on the Held-Karp dynamic program
pub struct HeldKarpSolver {
    pub config: HeldKarpConfig,
}

impl HeldKarpSolver {
    pub fn new(config: HeldKarpConfig) -> Self {
        HeldKarpSolver { config }
    }

    /// Bytes held by the cost and predecessor tables for `n` cities
    pub fn table_bytes(n: usize) -> usize {
        if n == 0 || n > HARD_CITY_LIMIT {
            return 0;
        }
        let entries = (1usize << (n - 1)) * n;
        entries * (std::mem::size_of::<Option<f64>>() + std::mem::size_of::<u8>())
    }

    fn check_size(&self, n: usize) -> Result<()> {
        let limit = self.config.max_cities.min(HARD_CITY_LIMIT);
        if n > limit {
            return Err(TspError::TooManyCities { cities: n, limit });
        }
        if n > LARGE_INSTANCE_WARNING {
            log::warn!(
                "{} cities need {:.1} MiB of DP tables",
                n,
                Self::table_bytes(n) as f64 / (1024.0 * 1024.0)
            );
        }
        Ok(())
    }

    /// Solve an instance to optimality
    pub fn solve(&self, instance: &TspInstance) -> Result<ExactResult> {
        let n = instance.dimension;
        if n == 0 {
            return Err(TspError::EmptyInput);
        }
        self.check_size(n)?;

        let start = Instant::now();
        log::info!(
            "Held-Karp: solving {} ({} cities, parallel={})",
            instance.name,
            n,
            self.config.parallel
        );

        let mut table = DpTable::new(n);
        let states_evaluated = if self.config.parallel {
            self.fill_layered(instance, &mut table)
        } else {
            self.fill_sequential(instance, &mut table)
        };
        log::debug!("filled {} states in {:.4}s", states_evaluated, start.elapsed().as_secs_f64());

        let (last_city, optimal_cost) = Self::closing_city(instance, &table)?;
        let tour = Self::reconstruct(&table, last_city)?;

        let mut solution = Solution::from_tour(instance, tour, "HeldKarp");
        solution.validate(instance, optimal_cost)?;
        solution.states_evaluated = Some(states_evaluated);
        solution.computation_time = start.elapsed().as_secs_f64();

        log::info!(
            "Held-Karp: cost {:.6} in {:.4}s",
            solution.cost,
            solution.computation_time
        );

        Ok(ExactResult {
            solution,
            optimal_cost,
            last_city,
            states_evaluated,
            table_bytes: Self::table_bytes(n),
        })
    }

    /// Fill masks in ascending numeric order; every sub-mask is smaller
    /// than its mask and therefore already final.
    fn fill_sequential(&self, instance: &TspInstance, table: &mut DpTable) -> u64 {
        let n = table.n;
        let full = (1usize << n) - 1;
        let mut states = 0u64;

        for mask in (3..=full).step_by(2) {
            for city in 1..n {
                if mask & (1 << city) == 0 {
                    continue;
                }
                if let Some((cost, pred)) = table.best_predecessor(instance, mask, city) {
                    table.set(mask, city, cost, pred);
                }
                states += 1;
            }
        }

        states
    }

    /// Fill one popcount layer at a time. A layer only reads the previous
    /// one, so its rows are computed in parallel and written back after.
    fn fill_layered(&self, instance: &TspInstance, table: &mut DpTable) -> u64 {
        let n = table.n;
        let full = (1usize << n) - 1;

        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); n + 1];
        for mask in (3..=full).step_by(2) {
            layers[mask.count_ones() as usize].push(mask);
        }

        let mut states = 0u64;
        for (size, layer) in layers.iter().enumerate().skip(2) {
            let shared: &DpTable = table;
            let rows: Vec<(usize, Vec<Option<(f64, usize)>>)> = layer
                .par_iter()
                .map(|&mask| (mask, shared.compute_row(instance, mask)))
                .collect();

            for (mask, row) in rows {
                for (city, entry) in row.into_iter().enumerate() {
                    if let Some((cost, pred)) = entry {
                        table.set(mask, city, cost, pred);
                    }
                }
            }
            states += (layer.len() * (size - 1)) as u64;
        }

        states
    }

    /// Pick the city that closes the cheapest cycle. Smallest index wins ties.
    fn closing_city(instance: &TspInstance, table: &DpTable) -> Result<(usize, f64)> {
        let n = table.n;
        if n == 1 {
            return Ok((0, 0.0));
        }

        let full = (1usize << n) - 1;
        let mut best: Option<(usize, f64)> = None;
        for city in 1..n {
            let Some(path) = table.cost(full, city) else {
                continue;
            };
            let total = path + instance.distance(city, 0);
            if best.map_or(true, |(_, b)| total < b) {
                best = Some((city, total));
            }
        }

        best.ok_or_else(|| TspError::invalid_data("no path covers every city"))
    }

    /// Walk predecessors back from (full, last_city) and close the cycle
    fn reconstruct(table: &DpTable, last_city: usize) -> Result<Vec<usize>> {
        let n = table.n;
        let mut mask = (1usize << n) - 1;
        let mut city = last_city;
        let mut backwards = Vec::with_capacity(n.saturating_sub(1));

        while mask != 1 {
            if city == 0 || mask & (1 << city) == 0 || backwards.len() >= n {
                return Err(TspError::invalid_data(format!(
                    "broken predecessor chain at city {} (mask {:#b})",
                    city, mask
                )));
            }
            backwards.push(city);
            let prev = table.pred(mask, city);
            mask ^= 1 << city;
            city = prev;
        }

        let mut tour = Vec::with_capacity(n + 1);
        tour.push(0);
        tour.extend(backwards.into_iter().rev());
        tour.push(0);
        Ok(tour)
    }
}

impl Default for HeldKarpSolver {
    fn default() -> Self {
        Self::new(HeldKarpConfig::default())
    }
}

impl TspSolver for HeldKarpSolver {
    fn run(&self, instance: &TspInstance) -> Result<Solution> {
        self.solve(instance).map(|result| result.solution)
    }

    fn name(&self) -> &str {
        if self.config.parallel {
            "HeldKarp-Parallel"
        } else {
            "HeldKarp"
        }
    }
}

/// Solve the TSP over the first `n` points, starting and ending at `points[0]`.
///
/// Returns the closed tour (`n + 1` points) and its cost.
pub fn solve(points: &[Point], n: usize) -> Result<(Vec<Point>, f64)> {
    let instance = TspInstance::with_cities("points", points, n)?;
    let result = HeldKarpSolver::default().solve(&instance)?;
    let tour = result.solution.points(&instance);
    Ok((tour, result.solution.cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::brute_force::BruteForceSolver;
    use crate::generator::{sample_instance, GeneratorConfig, PointGenerator};
    use crate::instance::{distance, path_length};
    use crate::solution::costs_agree;

    fn square_points() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ]
    }

    fn random_instance(cities: usize, seed: u64) -> TspInstance {
        let config = GeneratorConfig {
            num_cities: cities - 1,
            seed,
            ..Default::default()
        };
        PointGenerator::new(config).unwrap().generate_instance().unwrap()
    }

    #[test]
    fn test_square_perimeter() {
        let points = square_points();
        let (tour, cost) = solve(&points, 4).unwrap();

        assert!((cost - 4.0).abs() < 1e-12);
        assert_eq!(tour.len(), 5);
        assert_eq!(tour[0], points[0]);
        assert_eq!(tour[4], points[0]);
        // Every edge of a perimeter tour is a side of the square.
        for w in tour.windows(2) {
            assert!((distance(&w[0], &w[1]) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_square_tie_break_prefers_smallest_closing_city() {
        let instance = TspInstance::new("square", square_points()).unwrap();
        let result = HeldKarpSolver::default().solve(&instance).unwrap();

        assert_eq!(result.last_city, 1);
        assert_eq!(result.solution.tour, vec![0, 3, 2, 1, 0]);
    }

    #[test]
    fn test_equal_cost_predecessors_keep_lowest_index() {
        // 0->1->2->3 and 0->2->1->3 both cost 2 + 2*sqrt(2).
        let instance = TspInstance::new(
            "rhombus",
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(1.0, -1.0),
                Point::new(2.0, 0.0),
            ],
        )
        .unwrap();
        let solver = HeldKarpSolver::default();

        let mut sequential = DpTable::new(4);
        solver.fill_sequential(&instance, &mut sequential);
        let mut layered = DpTable::new(4);
        solver.fill_layered(&instance, &mut layered);

        for table in [&sequential, &layered] {
            assert_eq!(table.cost(0b0111, 1), table.cost(0b0111, 2));
            assert_eq!(table.pred(0b1111, 3), 1);
            assert_eq!(table.pred(0b0111, 1), 2);
            assert_eq!(table.pred(0b0111, 2), 1);
        }
    }

    #[test]
    fn test_single_city() {
        let p0 = Point::new(3.0, -7.0);
        let (tour, cost) = solve(&[p0], 1).unwrap();

        assert_eq!(tour, vec![p0, p0]);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_two_cities() {
        let points = vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
        let (tour, cost) = solve(&points, 2).unwrap();

        assert_eq!(tour, vec![points[0], points[1], points[0]]);
        assert!((cost - 2.0 * distance(&points[0], &points[1])).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_cities() {
        let points: Vec<Point> = (0..6).map(|i| Point::new(i as f64, 0.0)).collect();
        let (_, cost) = solve(&points, 6).unwrap();
        assert!((cost - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_extra_points_are_ignored() {
        let mut points = square_points();
        points.push(Point::new(100.0, 100.0));
        let (tour, cost) = solve(&points, 4).unwrap();

        assert_eq!(tour.len(), 5);
        assert!((cost - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let instance = sample_instance().unwrap();
        let solver = HeldKarpSolver::default();
        let a = solver.solve(&instance).unwrap();
        let b = solver.solve(&instance).unwrap();

        assert_eq!(a.solution.tour, b.solution.tour);
        assert_eq!(a.solution.cost, b.solution.cost);
    }

    #[test]
    fn test_sample_tour_is_complete_and_consistent() {
        let instance = sample_instance().unwrap();
        let result = HeldKarpSolver::default().solve(&instance).unwrap();
        let solution = &result.solution;

        assert!(solution.is_complete(&instance));
        assert_eq!(solution.tour.len(), instance.dimension + 1);
        assert!(costs_agree(result.optimal_cost, solution.cost));
        assert!(costs_agree(path_length(&solution.points(&instance)), solution.cost));
        assert_eq!(solution.states_evaluated, Some(result.states_evaluated));
    }

    #[test]
    fn test_matches_brute_force_on_small_instances() {
        let brute = BruteForceSolver::new();
        let solver = HeldKarpSolver::default();

        for cities in 1..=8 {
            for seed in 0..4 {
                let instance = random_instance(cities, seed);
                let exact = solver.solve(&instance).unwrap();
                let reference = brute.run(&instance).unwrap();

                assert!(
                    costs_agree(exact.solution.cost, reference.cost),
                    "n={} seed={}: held-karp {} vs brute force {}",
                    cities,
                    seed,
                    exact.solution.cost,
                    reference.cost
                );
            }
        }
    }

    #[test]
    fn test_parallel_fill_matches_sequential() {
        let sequential = HeldKarpSolver::default();
        let parallel = HeldKarpSolver::new(HeldKarpConfig {
            parallel: true,
            ..Default::default()
        });

        let mut instances = vec![sample_instance().unwrap(), TspInstance::new("square", square_points()).unwrap()];
        instances.extend((1..=9).map(|n| random_instance(n, 11)));

        for instance in &instances {
            let a = sequential.solve(instance).unwrap();
            let b = parallel.solve(instance).unwrap();

            assert_eq!(a.solution.tour, b.solution.tour, "{}", instance.name);
            assert_eq!(a.optimal_cost, b.optimal_cost, "{}", instance.name);
            assert_eq!(a.states_evaluated, b.states_evaluated, "{}", instance.name);
        }
    }

    #[test]
    fn test_state_count() {
        // Each odd mask with k cities besides the origin contributes k states.
        let instance = random_instance(5, 1);
        let result = HeldKarpSolver::default().solve(&instance).unwrap();
        // sum_{k=1}^{4} C(4, k) * k = 4 * 2^3
        assert_eq!(result.states_evaluated, 32);
    }

    #[test]
    fn test_too_many_cities_rejected() {
        let solver = HeldKarpSolver::new(HeldKarpConfig {
            max_cities: 6,
            ..Default::default()
        });
        let instance = random_instance(7, 0);

        assert_eq!(
            solver.solve(&instance).unwrap_err(),
            TspError::TooManyCities { cities: 7, limit: 6 }
        );
    }

    #[test]
    fn test_limit_is_capped() {
        let solver = HeldKarpSolver::new(HeldKarpConfig {
            max_cities: 64,
            ..Default::default()
        });
        let instance = random_instance(31, 0);

        assert_eq!(
            solver.solve(&instance).unwrap_err(),
            TspError::TooManyCities { cities: 31, limit: HARD_CITY_LIMIT }
        );
    }

    #[test]
    fn test_precondition_violations() {
        let points = square_points();
        assert_eq!(
            solve(&points, 5).unwrap_err(),
            TspError::CityCountMismatch { requested: 5, available: 4 }
        );
        assert_eq!(solve(&points, 0).unwrap_err(), TspError::EmptyInput);
        assert_eq!(solve(&[], 1).unwrap_err(), TspError::EmptyInput);
    }

    #[test]
    fn test_table_bytes() {
        let entry = std::mem::size_of::<Option<f64>>() + 1;
        assert_eq!(HeldKarpSolver::table_bytes(1), entry);
        assert_eq!(HeldKarpSolver::table_bytes(4), 8 * 4 * entry);
        assert_eq!(HeldKarpSolver::table_bytes(0), 0);
    }
}
