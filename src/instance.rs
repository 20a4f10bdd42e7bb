//! Module for representing TSP instances over 2-D points.
//!
//! An instance is an ordered list of points where city `i` is the `i`-th point
//! and city 0 is the fixed start/end of every tour. Euclidean distances are
//! precomputed into a dense matrix once per instance.

use crate::error::{Result, TspError};
use serde::{Deserialize, Serialize};

/// A city location in the plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Sum of edge distances between consecutive points of a path.
///
/// The path is not closed implicitly: pass `[p0, ..., p0]` for a cycle.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// A complete TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Number of cities (including the origin)
    pub dimension: usize,
    /// City coordinates, origin first
    pub points: Vec<Point>,
    /// Precomputed distance matrix
    #[serde(skip)]
    pub distance_matrix: Vec<Vec<f64>>,
}

impl TspInstance {
    /// Build an instance from all supplied points
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Result<Self> {
        let n = points.len();
        Self::with_cities(name, &points, n)
    }

    /// Build an instance over the first `n` points.
    ///
    /// Fails when `n` is zero, when fewer than `n` points are given, or when a
    /// used coordinate is NaN or infinite.
    pub fn with_cities(name: impl Into<String>, points: &[Point], n: usize) -> Result<Self> {
        if n == 0 || points.is_empty() {
            return Err(TspError::EmptyInput);
        }
        if points.len() < n {
            return Err(TspError::CityCountMismatch {
                requested: n,
                available: points.len(),
            });
        }
        if let Some(index) = points[..n].iter().position(|p| !p.is_finite()) {
            return Err(TspError::NonFiniteCoordinate { index });
        }

        let points = points[..n].to_vec();
        let distance_matrix = Self::compute_distance_matrix(&points);

        Ok(TspInstance {
            name: name.into(),
            dimension: n,
            points,
            distance_matrix,
        })
    }

    /// Compute Euclidean distance matrix
    fn compute_distance_matrix(points: &[Point]) -> Vec<Vec<f64>> {
        let n = points.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in i + 1..n {
                let d = distance(&points[i], &points[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        matrix
    }

    /// Get the distance between two cities
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix[i][j]
    }

    /// The fixed start/end point
    pub fn origin(&self) -> Point {
        self.points[0]
    }

    /// Sum of consecutive edge distances along a tour of city indices.
    /// A closed tour lists the origin at both ends.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        tour.windows(2).map(|w| self.distance(w[0], w[1])).sum()
    }

    /// Map a tour of city indices to its points
    pub fn tour_points(&self, tour: &[usize]) -> Vec<Point> {
        tour.iter().map(|&c| self.points[c]).collect()
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                distances.push(self.distance(i, j));
            }
        }
        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);

        let min_x = self.points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = self.points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = self.points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = self.points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            origin: self.origin(),
            avg_distance,
            max_distance,
            bounds: (min_x, max_x, min_y, max_y),
        }
    }
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub origin: Point,
    pub avg_distance: f64,
    pub max_distance: f64,
    /// (min_x, max_x, min_y, max_y)
    pub bounds: (f64, f64, f64, f64),
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {} (origin + {} others)", self.dimension, self.dimension - 1)?;
        writeln!(f, "  Origin: {}", self.origin)?;
        writeln!(
            f,
            "  Bounds: x in [{:.2}, {:.2}], y in [{:.2}, {:.2}]",
            self.bounds.0, self.bounds.1, self.bounds.2, self.bounds.3
        )?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_calculation() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);

        assert!((distance(&a, &b) - 5.0).abs() < 1e-10);
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn test_distance_matrix_is_symmetric() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(-1.0, 2.5),
        ];
        let instance = TspInstance::new("tri", points).unwrap();

        for i in 0..3 {
            assert_eq!(instance.distance(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(instance.distance(i, j), instance.distance(j, i));
            }
        }
        assert!((instance.distance(0, 1) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_with_cities_uses_prefix() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(5.0, 5.0),
        ];
        let instance = TspInstance::with_cities("prefix", &points, 2).unwrap();

        assert_eq!(instance.dimension, 2);
        assert_eq!(instance.points, vec![points[0], points[1]]);
    }

    #[test]
    fn test_precondition_errors() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];

        assert_eq!(
            TspInstance::with_cities("empty", &points, 0).unwrap_err(),
            TspError::EmptyInput
        );
        assert_eq!(TspInstance::new("none", Vec::new()).unwrap_err(), TspError::EmptyInput);
        assert_eq!(
            TspInstance::with_cities("short", &points, 3).unwrap_err(),
            TspError::CityCountMismatch { requested: 3, available: 2 }
        );

        let bad = vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)];
        assert_eq!(
            TspInstance::new("nan", bad).unwrap_err(),
            TspError::NonFiniteCoordinate { index: 1 }
        );
    }

    #[test]
    fn test_tour_length_and_path_length_agree() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ];
        let instance = TspInstance::new("square", points).unwrap();
        let tour = [0, 1, 2, 3, 0];

        assert!((instance.tour_length(&tour) - 4.0).abs() < 1e-12);
        assert!((path_length(&instance.tour_points(&tour)) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(1.5, -2.0).to_string(), "(1.5, -2)");
    }
}
