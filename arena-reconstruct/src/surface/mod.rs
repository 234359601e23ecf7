//! Surface analysis
//!
//! Local normals from nearest-neighbor neighborhoods, and grouping of the
//! surviving points into planar wall clusters.

pub mod cluster;
pub mod normals;
pub mod pca;

pub use cluster::{WallCluster, cluster_walls, normal_distance};
pub use normals::{NormalEstimates, NormalStats, apply_normals, estimate_normals};
pub use pca::{PrincipalAxes, orient_up};
