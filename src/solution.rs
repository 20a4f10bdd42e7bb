//! Solution representation and validation for the TSP.
//!
//! A solution stores a closed tour of city indices: the origin appears at
//! both ends and every other city exactly once in between.

use crate::error::{Result, TspError};
use crate::instance::{Point, TspInstance};
use serde::{Deserialize, Serialize};

/// Relative tolerance used when comparing recomputed tour costs
pub const COST_TOLERANCE: f64 = 1e-9;

/// Represents a solution to the TSP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of city indices (starting and ending at 0)
    pub tour: Vec<usize>,
    /// Sum of edge distances along the tour
    pub cost: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of DP states or permutations evaluated (if applicable)
    pub states_evaluated: Option<u64>,
}

impl Solution {
    /// Create a solution from a closed tour, computing its cost
    pub fn from_tour(instance: &TspInstance, tour: Vec<usize>, algorithm: &str) -> Self {
        let cost = instance.tour_length(&tour);
        Solution {
            tour,
            cost,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            states_evaluated: None,
        }
    }

    /// Check the tour is closed at the origin and visits every city exactly once
    pub fn is_complete(&self, instance: &TspInstance) -> bool {
        let n = instance.dimension;
        if self.tour.len() != n + 1 || self.tour[0] != 0 || self.tour[n] != 0 {
            return false;
        }

        let mut seen = vec![false; n];
        seen[0] = true;
        for &city in &self.tour[1..n] {
            if city == 0 || city >= n || seen[city] {
                return false;
            }
            seen[city] = true;
        }
        true
    }

    /// Recompute the cost from the tour and check it against `expected_cost`.
    ///
    /// Fails if the tour is not a complete cycle or the costs disagree beyond
    /// [`COST_TOLERANCE`] (relative).
    pub fn validate(&mut self, instance: &TspInstance, expected_cost: f64) -> Result<()> {
        if !self.is_complete(instance) {
            return Err(TspError::invalid_data(format!(
                "tour {:?} is not a Hamiltonian cycle over {} cities",
                self.tour, instance.dimension
            )));
        }

        self.cost = instance.tour_length(&self.tour);
        if !costs_agree(self.cost, expected_cost) {
            return Err(TspError::invalid_data(format!(
                "tour length {} disagrees with expected cost {}",
                self.cost, expected_cost
            )));
        }
        Ok(())
    }

    /// The tour as points
    pub fn points(&self, instance: &TspInstance) -> Vec<Point> {
        instance.tour_points(&self.tour)
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.6}", self.cost)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(states) = self.states_evaluated {
            writeln!(f, "  States: {}", states)?;
        }
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

/// Whether two costs are equal within [`COST_TOLERANCE`] relative error
pub fn costs_agree(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= COST_TOLERANCE * scale
}
