//! Reconstruction configuration.

use crate::error::ReconstructionError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Inclusive band of plausible sample heights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightBand {
    pub lo: f64,
    pub hi: f64,
}

impl HeightBand {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, height: f64) -> bool {
        (self.lo..=self.hi).contains(&height)
    }
}

impl Default for HeightBand {
    fn default() -> Self {
        Self { lo: -0.02, hi: 0.52 }
    }
}

/// Parameters for every pipeline stage.
///
/// Distances are in tracker units (meters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Samples outside this band are dropped before anything else.
    pub height_band: HeightBand,
    /// Drop samples that exactly repeat an earlier position.
    pub drop_duplicates: bool,
    /// Neighborhood size for normal estimation, the point itself included.
    pub neighbors: usize,
    /// Points whose nearest neighbor is farther than this get no normal.
    pub min_neighbor_distance: f64,
    /// Largest explained-variance ratio of the third principal axis for a
    /// neighborhood to count as planar.
    pub planarity_threshold: f64,
    /// Number of planar clusters to extract, floor included. The cluster
    /// whose normal is closest to vertical becomes the floor, so a
    /// rectangular room needs 5.
    pub wall_count: usize,
    /// Maximum normal distance from the seed for a point to join a cluster.
    pub normal_threshold: f64,
    /// Maximum distance from the seed's local plane for a point to join a cluster.
    pub plane_distance_threshold: f64,
    /// Cluster points beyond this many standard deviations off the fitted
    /// plane are discarded before the final fit.
    pub outlier_std: f64,
    /// Smallest number of points a cluster may be seeded from or fitted to.
    pub min_cluster_points: usize,
    /// Height of the synthesized ceiling plane; no ceiling samples exist.
    pub ceiling_height: f64,
    /// Name written to the mesh's object line.
    pub object_name: String,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            height_band: HeightBand::default(),
            drop_duplicates: true,
            neighbors: 40,
            min_neighbor_distance: 0.04,
            planarity_threshold: 0.005,
            wall_count: 5,
            normal_threshold: 0.5,
            plane_distance_threshold: 0.1,
            outlier_std: 1.5,
            min_cluster_points: 3,
            ceiling_height: 0.6,
            object_name: "Arena".to_string(),
        }
    }
}

impl ReconstructionConfig {
    /// Load a configuration from JSON. Missing fields keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReconstructionError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(arena_data::DataError::from)?;
        let config: Self = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            arena_data::DataError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ReconstructionError> {
        let invalid = |msg: String| Err(ReconstructionError::InvalidConfig(msg));

        if !(self.height_band.lo < self.height_band.hi) {
            return invalid(format!(
                "height band [{}, {}] is empty",
                self.height_band.lo, self.height_band.hi
            ));
        }
        if self.neighbors < 3 {
            return invalid(format!("neighbors must be at least 3, got {}", self.neighbors));
        }
        // Three walls plus the floor is the smallest closed room.
        if self.wall_count < 4 {
            return invalid(format!(
                "wall_count must be at least 4 (three walls and the floor), got {}",
                self.wall_count
            ));
        }
        if self.min_cluster_points < 3 {
            return invalid(format!(
                "min_cluster_points must be at least 3, got {}",
                self.min_cluster_points
            ));
        }
        for (name, value) in [
            ("min_neighbor_distance", self.min_neighbor_distance),
            ("planarity_threshold", self.planarity_threshold),
            ("normal_threshold", self.normal_threshold),
            ("plane_distance_threshold", self.plane_distance_threshold),
            ("outlier_std", self.outlier_std),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return invalid(format!("{name} must be positive, got {value}"));
            }
        }
        if !self.ceiling_height.is_finite() {
            return invalid("ceiling_height must be finite".to_string());
        }
        if self.object_name.trim().is_empty() || self.object_name.contains('\n') {
            return invalid("object_name must be a single non-empty line".to_string());
        }
        Ok(())
    }
}
