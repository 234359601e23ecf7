//! Arena Reconstruction Crate
//!
//! Turns a cloud of wand samples taken along the walls and floor of an arena
//! into a closed-top room mesh. The pipeline runs once, offline, after
//! capture:
//!
//! - [`ingest`]: point set with explicit index mappings, height and duplicate filters
//! - [`surface`]: local normal estimation and wall clustering
//! - [`reconstruction`]: plane intersection, mesh assembly and the end-to-end runner

pub mod config;
pub mod error;
pub mod ingest;
pub mod reconstruction;
pub mod surface;

#[cfg(test)]
pub(crate) mod test_data;

pub use config::{HeightBand, ReconstructionConfig};
pub use error::{ReconstructionError, Surface};
pub use ingest::{IndexMapping, PointSet};
pub use reconstruction::{Reconstruction, Reconstructor, StageReport};
