//! Exhaustive search over all orderings of the non-origin cities.
//!
//! Runs in O((n-1)!) and only exists as a reference to check the dynamic
//! program against on small instances.

use super::TspSolver;
use crate::error::{Result, TspError};
use crate::instance::TspInstance;
use crate::solution::Solution;
use std::time::Instant;

/// Largest instance the enumeration accepts
pub const BRUTE_FORCE_LIMIT: usize = 11;

pub struct BruteForceSolver {
    pub max_cities: usize,
}

struct Search<'a> {
    instance: &'a TspInstance,
    path: Vec<usize>,
    visited: Vec<bool>,
    best_cost: f64,
    best_path: Vec<usize>,
    permutations: u64,
}

impl Search<'_> {
    /// Permutations are generated in lexicographic order and only a strictly
    /// cheaper cycle replaces the incumbent.
    fn extend(&mut self, last: usize, cost: f64) {
        let n = self.instance.dimension;
        if self.path.len() == n {
            self.permutations += 1;
            let total = cost + self.instance.distance(last, 0);
            if total < self.best_cost {
                self.best_cost = total;
                self.best_path.clone_from(&self.path);
            }
            return;
        }

        for next in 1..n {
            if self.visited[next] {
                continue;
            }
            self.visited[next] = true;
            self.path.push(next);
            self.extend(next, cost + self.instance.distance(last, next));
            self.path.pop();
            self.visited[next] = false;
        }
    }
}

impl BruteForceSolver {
    pub fn new() -> Self {
        BruteForceSolver {
            max_cities: BRUTE_FORCE_LIMIT,
        }
    }
}

impl Default for BruteForceSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TspSolver for BruteForceSolver {
    fn run(&self, instance: &TspInstance) -> Result<Solution> {
        let n = instance.dimension;
        if n == 0 {
            return Err(TspError::EmptyInput);
        }
        if n > self.max_cities {
            return Err(TspError::TooManyCities {
                cities: n,
                limit: self.max_cities,
            });
        }

        let start = Instant::now();
        let mut visited = vec![false; n];
        visited[0] = true;
        let mut search = Search {
            instance,
            path: vec![0],
            visited,
            best_cost: f64::INFINITY,
            best_path: Vec::new(),
            permutations: 0,
        };
        search.extend(0, 0.0);

        let mut tour = search.best_path;
        tour.push(0);

        let mut solution = Solution::from_tour(instance, tour, self.name());
        solution.states_evaluated = Some(search.permutations);
        solution.computation_time = start.elapsed().as_secs_f64();
        log::debug!(
            "brute force: {} permutations, cost {:.6}",
            search.permutations,
            solution.cost
        );
        Ok(solution)
    }

    fn name(&self) -> &str {
        "BruteForce"
    }
}
