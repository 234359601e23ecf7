//! Room reconstruction from fitted planes
//!
//! Intersects walls with the floor and ceiling, assembles the mesh, and runs
//! the whole pipeline from a capture session.

pub mod intersect;
pub mod mesh;
pub mod pipeline;

pub use intersect::{RoomCorners, RoomPlanes, SINGULAR_TOLERANCE, intersect_three, solve_corners};
pub use mesh::build_mesh;
pub use pipeline::{Reconstruction, Reconstructor, StageReport};
