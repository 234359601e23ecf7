//! Wavefront OBJ output for the reconstructed arena.

mod writer;

pub use writer::{save_obj, write_obj};
