//! Held-Karp TSP Solver Library
//!
//! Exact minimum-cost Hamiltonian cycles over 2-D points, computed with the
//! Held-Karp dynamic program over bitmask subsets of cities.
//!
//! # Features
//!
//! - Held-Karp solver with deterministic tie-breaking and tour validation
//! - Optional layer-parallel table fill (rayon)
//! - Brute-force reference solver for cross-checking small instances
//! - Fixed and seeded random point sources
//! - Benchmarking over a range of city counts
//!
//! # Example
//!
//! ```
//! use held_karp_tsp::instance::Point;
//! use held_karp_tsp::exact::solve;
//!
//! let points = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(0.0, 1.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(1.0, 0.0),
//! ];
//! let (tour, cost) = solve(&points, points.len()).unwrap();
//!
//! assert_eq!(tour.len(), 5);
//! assert!((cost - 4.0).abs() < 1e-9);
//! ```

pub mod benchmark;
pub mod error;
pub mod exact;
pub mod generator;
pub mod instance;
pub mod solution;

pub use error::{Result, TspError};
pub use instance::{Point, TspInstance};
pub use solution::Solution;
