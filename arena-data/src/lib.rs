//! Arena Data Crate
//!
//! Record types and file formats for arena scans: captured wand samples,
//! fitted planes, and the polygon mesh written at the end of a reconstruction.
//! This crate holds no reconstruction logic.

pub mod error;
pub mod obj;
pub mod session;
pub mod types;

pub use error::DataError;
pub use obj::{save_obj, write_obj};
pub use session::{BoundingBox, ScanSession};
pub use types::{ArenaMesh, Face, MeshVertex, Plane, SamplePoint, WallPlane};
