//! Point set and index mappings.
//!
//! Stages never rely on positional correspondence between a filtered subset
//! and the full point list. Any subset handed to a stage travels with an
//! [`IndexMapping`] that records, for each subset row, the index of the point
//! it came from.

use arena_data::{SamplePoint, ScanSession};
use glam::DVec3;

/// Maps rows of a subset back to indices in the owning [`PointSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMapping {
    source: Vec<usize>,
}

impl IndexMapping {
    pub fn new(source: Vec<usize>) -> Self {
        Self { source }
    }

    /// Index in the point set for subset row `row`.
    pub fn source_index(&self, row: usize) -> usize {
        self.source[row]
    }

    pub fn source_indices(&self) -> &[usize] {
        &self.source
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows(&self, mut keep: impl FnMut(usize) -> bool) -> Self {
        let source = self
            .source
            .iter()
            .enumerate()
            .filter(|&(row, _)| keep(row))
            .map(|(_, &index)| index)
            .collect();
        Self { source }
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// All samples of a session, with the per-point mask and labels each stage updates.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: Vec<SamplePoint>,
}

impl PointSet {
    pub fn new(positions: impl IntoIterator<Item = DVec3>) -> Self {
        Self {
            points: positions.into_iter().map(SamplePoint::new).collect(),
        }
    }

    pub fn from_session(session: &ScanSession) -> Self {
        Self::new(session.marker_positions.iter().copied())
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> &SamplePoint {
        &self.points[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut SamplePoint {
        &mut self.points[index]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exclude a point from further analysis.
    pub fn exclude(&mut self, index: usize) {
        self.points[index].included = false;
    }

    pub fn included_count(&self) -> usize {
        self.points.iter().filter(|p| p.included).count()
    }

    /// Mapping over every point matching `predicate`, in point order.
    pub fn select(&self, predicate: impl Fn(&SamplePoint) -> bool) -> IndexMapping {
        IndexMapping::new(
            self.points
                .iter()
                .enumerate()
                .filter(|(_, p)| predicate(p))
                .map(|(i, _)| i)
                .collect(),
        )
    }

    /// Mapping over every included point.
    pub fn included(&self) -> IndexMapping {
        self.select(|p| p.included)
    }

    /// Positions of the mapped points, row-aligned with `mapping`.
    pub fn positions(&self, mapping: &IndexMapping) -> Vec<DVec3> {
        mapping
            .source_indices()
            .iter()
            .map(|&i| self.points[i].position)
            .collect()
    }
}
