//! Error types for the reconstruction pipeline.

use arena_data::DataError;
use std::fmt;
use thiserror::Error;

/// Which horizontal plane closes a corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Floor,
    Ceiling,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Floor => write!(f, "floor"),
            Surface::Ceiling => write!(f, "ceiling"),
        }
    }
}

/// Errors that stop a reconstruction. Each message names the failing stage.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("config: {0}")]
    InvalidConfig(String),

    #[error("ingest: session contains no marker samples")]
    EmptySession,

    #[error("{stage}: only {remaining} usable points remain, need at least {required}")]
    InsufficientPoints {
        stage: &'static str,
        remaining: usize,
        required: usize,
    },

    #[error(
        "wall clustering: cannot seed wall {wall}, {remaining} unassigned points left but {required} needed; \
         the room has fewer usable walls than configured"
    )]
    ClusterUnderflow {
        wall: usize,
        remaining: usize,
        required: usize,
    },

    #[error("wall clustering: wall {wall} kept only {inliers} points after outlier removal")]
    DegenerateCluster { wall: usize, inliers: usize },

    #[error("plane intersection: found {found} walls, need at least {required}")]
    TooFewWalls { found: usize, required: usize },

    #[error("plane intersection: wall {wall} has no unique counter-clockwise neighbor (non-convex room?)")]
    AmbiguousAdjacency { wall: usize },

    #[error("plane intersection: walking from wall {wall} revisits wall {revisited} before closing the room")]
    OpenWallCycle { wall: usize, revisited: usize },

    #[error(
        "plane intersection: walls {wall} and {adjacent} with the {surface} form a singular system \
         (determinant {determinant:e})"
    )]
    SingularSystem {
        wall: usize,
        adjacent: usize,
        surface: Surface,
        determinant: f64,
    },

    #[error(transparent)]
    Data(#[from] DataError),
}
