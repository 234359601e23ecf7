//! Sample filters applied before any geometry is estimated.

use crate::config::HeightBand;
use crate::ingest::PointSet;
use std::collections::HashSet;
use tracing::debug;

/// Exclude every included point whose height lies outside `band`.
///
/// Both band edges are inclusive. Returns the number of points excluded.
pub fn filter_height(points: &mut PointSet, band: HeightBand) -> usize {
    let outside = points.select(|p| p.included && !band.contains(p.height()));
    for &index in outside.source_indices() {
        points.exclude(index);
    }
    debug!(
        "Height band [{}, {}] excluded {} points",
        band.lo,
        band.hi,
        outside.len()
    );
    outside.len()
}

/// Exclude included points that exactly repeat the position of an earlier
/// included point. A stalled marker produces runs of these.
pub fn filter_duplicates(points: &mut PointSet) -> usize {
    let mut seen = HashSet::new();
    let mut removed = 0;
    for index in points.included().source_indices().iter().copied() {
        let p = points.get(index).position;
        if !seen.insert([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]) {
            points.exclude(index);
            removed += 1;
        }
    }
    debug!("Excluded {} duplicate samples", removed);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_filter_height_boundaries() {
        let band = HeightBand::new(-0.02, 0.52);
        let heights = [-0.5, -0.02, 0.0, 0.25, 0.52, 0.53, 1.0];
        let mut points = PointSet::new(heights.iter().map(|&y| DVec3::new(0.0, y, 0.0)));

        let removed = filter_height(&mut points, band);
        assert_eq!(removed, 3);

        for p in points.points() {
            assert_eq!(p.included, band.contains(p.height()), "height {}", p.height());
        }
        // Exactly on the edges stays in.
        assert!(points.get(1).included);
        assert!(points.get(4).included);
    }

    #[test]
    fn test_filter_height_leaves_excluded_alone() {
        let mut points = PointSet::new([DVec3::new(0.0, 5.0, 0.0), DVec3::new(0.0, 0.1, 0.0)]);
        points.exclude(0);
        assert_eq!(filter_height(&mut points, HeightBand::default()), 0);
        assert_eq!(points.included_count(), 1);
    }

    #[test]
    fn test_filter_duplicates() {
        let a = DVec3::new(0.1, 0.2, 0.3);
        let b = DVec3::new(0.4, 0.2, 0.3);
        let mut points = PointSet::new([a, b, a, a, b]);
        assert_eq!(filter_duplicates(&mut points), 3);
        assert!(points.get(0).included);
        assert!(points.get(1).included);
        assert_eq!(points.included_count(), 2);
    }
}
