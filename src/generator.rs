//! Point sources feeding the solver.
//!
//! Two datasets are available: a fixed set of sixteen cities and a seeded
//! uniform generator over a rectangular grid.

use crate::error::{Result, TspError};
use crate::instance::{Point, TspInstance};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Origin of the fixed sample dataset
pub const SAMPLE_ORIGIN: Point = Point {
    x: 82.32547314252422,
    y: 86.52371506977595,
};

const SAMPLE_CITIES: [(f64, f64); 15] = [
    (5.62197706436568, 50.43553223887989),
    (73.69001370749064, 13.126699134586694),
    (5.683407576617205, 19.19880990529429),
    (94.53768262203981, 63.66857631372882),
    (81.42885384544759, 65.49545511132014),
    (76.32035414534141, 99.14674007307472),
    (51.39574229380559, 1.1652895313832623),
    (25.859614551298026, 57.39669295697078),
    (67.58113008138884, 10.102475685008605),
    (0.35138532294655134, 10.398404434718655),
    (61.94415359823191, 96.03503559449332),
    (8.587973090377176, 39.7662397016992),
    (95.8176557640272, 83.27844094904448),
    (87.97900622388883, 16.288664488529335),
    (1.978158686562137, 51.93598153615081),
];

/// The fixed sixteen-city dataset, origin first
pub fn sample_cities() -> Vec<Point> {
    let mut points = Vec::with_capacity(SAMPLE_CITIES.len() + 1);
    points.push(SAMPLE_ORIGIN);
    points.extend(SAMPLE_CITIES.iter().map(|&(x, y)| Point::new(x, y)));
    points
}

/// The fixed dataset wrapped as an instance
pub fn sample_instance() -> Result<TspInstance> {
    TspInstance::new("sample-16", sample_cities())
}

/// Random generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Grid extent along x
    pub grid_x: f64,
    /// Grid extent along y
    pub grid_y: f64,
    /// Number of cities besides the origin
    pub num_cities: usize,
    /// Random seed
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            grid_x: 100.0,
            grid_y: 100.0,
            num_cities: 15,
            seed: 42,
        }
    }
}

/// Uniform random point generator over `[0, grid_x) x [0, grid_y)`
pub struct PointGenerator {
    pub config: GeneratorConfig,
}

impl PointGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(config.grid_x) || !valid(config.grid_y) {
            return Err(TspError::invalid_config(format!(
                "grid extent must be positive, got {} x {}",
                config.grid_x, config.grid_y
            )));
        }
        Ok(PointGenerator { config })
    }

    /// Generate `num_cities` cities, then a random origin placed at index 0.
    /// The result has `num_cities + 1` points.
    pub fn generate(&self) -> Vec<Point> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut points: Vec<Point> = (0..self.config.num_cities)
            .map(|_| self.random_point(&mut rng))
            .collect();
        let origin = self.random_point(&mut rng);
        points.insert(0, origin);

        log::debug!(
            "generated {} points on a {}x{} grid (seed {})",
            points.len(),
            self.config.grid_x,
            self.config.grid_y,
            self.config.seed
        );
        points
    }

    /// Generate points and wrap them as an instance
    pub fn generate_instance(&self) -> Result<TspInstance> {
        let name = format!("random-{}-s{}", self.config.num_cities + 1, self.config.seed);
        TspInstance::new(name, self.generate())
    }

    fn random_point(&self, rng: &mut ChaCha8Rng) -> Point {
        let x = rng.gen::<f64>() * self.config.grid_x;
        let y = rng.gen::<f64>() * self.config.grid_y;
        Point::new(x, y)
    }
}
