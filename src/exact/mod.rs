//! Exact solvers module.

pub mod brute_force;
pub mod held_karp;

pub use brute_force::*;
pub use held_karp::*;

use crate::error::Result;
use crate::instance::TspInstance;
use crate::solution::Solution;

/// A solver that returns an optimal closed tour
pub trait TspSolver {
    fn run(&self, instance: &TspInstance) -> Result<Solution>;
    fn name(&self) -> &str;
}
