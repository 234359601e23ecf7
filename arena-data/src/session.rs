//! Capture session records.
//!
//! A session is what the capture loop records while the dot stimulus moves
//! across the arena: one unidentified marker position per frame together
//! with the pose of the arena's reference rigid body.

use crate::error::DataError;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

/// Raw samples from one scanning session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSession {
    /// Wand marker positions, one per captured frame.
    #[serde(rename = "markerPos")]
    pub marker_positions: Vec<DVec3>,
    /// Reference body position for each frame.
    #[serde(rename = "bodyPos", default)]
    pub body_positions: Vec<DVec3>,
    /// Reference body rotation quaternion (x, y, z, w) for each frame.
    #[serde(rename = "bodyRot", default)]
    pub body_rotations: Vec<[f64; 4]>,
}

/// Axis-aligned bounds of a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }
}

impl ScanSession {
    pub fn new(marker_positions: Vec<DVec3>, body_positions: Vec<DVec3>) -> Self {
        Self {
            marker_positions,
            body_positions,
            body_rotations: Vec::new(),
        }
    }

    /// Load a session from a JSON file.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let session: ScanSession =
            serde_json::from_reader(reader).map_err(|source| DataError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        session.validate()?;
        info!(
            "Loaded session: {} marker samples, {} body samples",
            session.len(),
            session.body_positions.len()
        );
        Ok(session)
    }

    /// Write the session as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Saved {} samples to {}", self.len(), path.display());
        Ok(())
    }

    /// Body samples are optional, but when present there must be one per marker.
    pub fn validate(&self) -> Result<(), DataError> {
        let bodies = self.body_positions.len();
        if bodies != 0 && bodies != self.marker_positions.len() {
            return Err(DataError::LengthMismatch {
                markers: self.marker_positions.len(),
                bodies,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.marker_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marker_positions.is_empty()
    }

    /// Mean reference body position; the arena mesh is centered on it.
    pub fn mean_body_position(&self) -> Option<DVec3> {
        if self.body_positions.is_empty() {
            return None;
        }
        let sum: DVec3 = self.body_positions.iter().copied().sum();
        Some(sum / self.body_positions.len() as f64)
    }

    pub fn marker_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.marker_positions)
    }
}
