//! Local surface normals from k-nearest-neighbor neighborhoods.

use crate::ingest::{IndexMapping, PointSet};
use crate::surface::pca::PrincipalAxes;
use glam::DVec3;
use kiddo::{KdTree, SquaredEuclidean};
use tracing::{debug, info, warn};

/// Normal estimates for the points that had a usable neighborhood.
///
/// Rows are aligned with `mapping`, not with the point set: a point with no
/// valid neighborhood simply has no row.
#[derive(Debug, Clone, Default)]
pub struct NormalEstimates {
    pub mapping: IndexMapping,
    pub normals: Vec<DVec3>,
    /// Explained-variance ratio of the three principal axes of each neighborhood.
    pub explained_variance: Vec<[f64; 3]>,
}

impl NormalEstimates {
    /// Iterate `(point index, normal, explained variance)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, DVec3, [f64; 3])> + '_ {
        self.mapping
            .source_indices()
            .iter()
            .zip(self.normals.iter().zip(&self.explained_variance))
            .map(|(&index, (&normal, &ratio))| (index, normal, ratio))
    }

    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }
}

/// Counts from applying estimates to a point set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalStats {
    /// Points excluded because they had no valid neighborhood.
    pub without_neighborhood: usize,
    /// Points excluded because their neighborhood was not planar.
    pub non_planar: usize,
}

/// Build a KD-tree over the subset rows.
fn build_kdtree(positions: &[DVec3]) -> KdTree<f64, 3> {
    let mut kdtree = KdTree::with_capacity(positions.len());
    for (row, p) in positions.iter().enumerate() {
        kdtree.add(&[p.x, p.y, p.z], row as u64);
    }
    kdtree
}

/// Estimate a surface normal for every point of `subset`.
///
/// Each neighborhood holds the `k` nearest points, the point itself
/// included. A point whose closest other point is farther than
/// `min_neighbor_distance`, or whose neighborhood is degenerate, produces no
/// estimate. Normals are the least-variance principal axis with a
/// non-negative vertical component.
#[tracing::instrument(skip_all, fields(points = subset.len(), k = k))]
pub fn estimate_normals(
    points: &PointSet,
    subset: &IndexMapping,
    k: usize,
    min_neighbor_distance: f64,
) -> NormalEstimates {
    let positions = points.positions(subset);
    if positions.len() < k {
        warn!(
            "Only {} points available, fewer than the {} needed for a neighborhood",
            positions.len(),
            k
        );
        return NormalEstimates::default();
    }

    let kdtree = build_kdtree(&positions);
    let mut kept_rows = Vec::with_capacity(positions.len());
    let mut normals = Vec::with_capacity(positions.len());
    let mut explained_variance = Vec::with_capacity(positions.len());
    let mut isolated = 0;
    let mut degenerate = 0;
    let mut neighborhood = Vec::with_capacity(k);

    for (row, p) in positions.iter().enumerate() {
        let neighbors = kdtree.nearest_n::<SquaredEuclidean>(&[p.x, p.y, p.z], k);

        let closest = neighbors
            .iter()
            .find(|n| n.item as usize != row)
            .map(|n| n.distance.sqrt());
        if closest.is_none_or(|d| d > min_neighbor_distance) {
            isolated += 1;
            continue;
        }

        neighborhood.clear();
        neighborhood.extend(neighbors.iter().map(|n| positions[n.item as usize]));
        let Some(axes) = PrincipalAxes::fit(&neighborhood) else {
            degenerate += 1;
            continue;
        };

        kept_rows.push(row);
        normals.push(axes.normal());
        explained_variance.push(axes.explained_variance_ratio());
    }

    debug!(
        "{} isolated points, {} degenerate neighborhoods",
        isolated, degenerate
    );

    let kept: std::collections::HashSet<usize> = kept_rows.into_iter().collect();
    NormalEstimates {
        mapping: subset.retain_rows(|row| kept.contains(&row)),
        normals,
        explained_variance,
    }
}

/// Store estimated normals on the point set and mask out the points that
/// have none or whose neighborhood is not planar.
///
/// `subset` must be the mapping the estimates were computed from.
pub fn apply_normals(
    points: &mut PointSet,
    subset: &IndexMapping,
    estimates: &NormalEstimates,
    planarity_threshold: f64,
) -> NormalStats {
    let mut stats = NormalStats::default();
    let mut estimated = vec![false; points.len()];

    for (index, normal, ratio) in estimates.iter() {
        estimated[index] = true;
        let point = points.get_mut(index);
        point.normal = Some(normal);
        if ratio[2] >= planarity_threshold {
            point.included = false;
            stats.non_planar += 1;
        }
    }
    for &index in subset.source_indices() {
        if !estimated[index] {
            points.exclude(index);
            stats.without_neighborhood += 1;
        }
    }

    info!(
        "Normals: {} estimated, {} without neighborhood, {} non-planar",
        estimates.len(),
        stats.without_neighborhood,
        stats.non_planar
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_planar_neighborhood_recovers_normal() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = DVec3::new(1.0, 2.0, -0.5).normalize();
        let positions =
            test_data::plane_patch(&mut rng, normal, DVec3::new(0.2, 0.1, 0.3), 0.5, 300, 0.0);
        let points = PointSet::new(positions);
        let subset = points.included();

        let estimates = estimate_normals(&points, &subset, 20, 0.2);
        assert_eq!(estimates.len(), 300);
        for (_, estimated, ratio) in estimates.iter() {
            assert!(estimated.y >= 0.0);
            assert!((estimated - normal).length() < 1e-6, "{estimated} vs {normal}");
            assert!(ratio[2] < 1e-12);
        }
    }

    #[test]
    fn test_isolated_point_has_no_row() {
        let mut rng = StdRng::seed_from_u64(11);
        let normal = DVec3::new(0.3, 1.0, 0.2).normalize();
        let mut positions = test_data::plane_patch(&mut rng, normal, DVec3::ZERO, 0.3, 100, 0.0);
        // Far from everything else.
        positions.insert(40, DVec3::new(5.0, 5.0, 5.0));
        let points = PointSet::new(positions);
        let subset = points.included();

        let estimates = estimate_normals(&points, &subset, 10, 0.3);
        assert_eq!(estimates.len(), 100);
        assert!(!estimates.mapping.source_indices().contains(&40));
        // Rows after the isolated point still map to their own points.
        for (index, estimated, _) in estimates.iter() {
            assert!(points.get(index).position.length() < 1.0);
            assert!((estimated - normal).length() < 1e-6);
        }
    }

    #[test]
    fn test_too_few_points_for_neighborhood() {
        let points = PointSet::new([DVec3::ZERO, DVec3::X, DVec3::Z]);
        let subset = points.included();
        assert!(estimate_normals(&points, &subset, 5, 1.0).is_empty());
    }

    #[test]
    fn test_apply_normals_masks_points() {
        let mut rng = StdRng::seed_from_u64(3);
        let normal = DVec3::new(-0.2, 1.0, 0.4).normalize();
        let mut positions = test_data::plane_patch(&mut rng, normal, DVec3::ZERO, 0.3, 60, 0.0);
        positions.push(DVec3::new(9.0, 0.0, 9.0));
        let mut points = PointSet::new(positions);
        // Excluded before estimation: must be left untouched.
        points.exclude(0);
        let subset = points.included();

        let estimates = estimate_normals(&points, &subset, 10, 0.3);
        let stats = apply_normals(&mut points, &subset, &estimates, 0.005);

        assert_eq!(stats.without_neighborhood, 1);
        assert_eq!(stats.non_planar, 0);
        assert!(!points.get(60).included);
        assert!(points.get(60).normal.is_none());
        assert!(points.get(0).normal.is_none());
        assert_eq!(points.included_count(), 59);
        for p in points.points().iter().filter(|p| p.included) {
            assert!((p.normal.unwrap() - normal).length() < 1e-6);
        }
    }

    #[test]
    fn test_apply_normals_rejects_corner() {
        // Two perpendicular patches meeting at x = 0: points near the crease
        // see both planes.
        let mut rng = StdRng::seed_from_u64(5);
        let mut positions =
            test_data::plane_patch(&mut rng, DVec3::Y, DVec3::new(0.5, 0.0, 0.0), 0.5, 200, 1e-3);
        positions.extend(test_data::plane_patch(
            &mut rng,
            DVec3::X,
            DVec3::new(0.0, 0.5, 0.0),
            0.5,
            200,
            1e-3,
        ));
        let mut points = PointSet::new(positions);
        let subset = points.included();

        let estimates = estimate_normals(&points, &subset, 20, 0.2);
        let stats = apply_normals(&mut points, &subset, &estimates, 0.005);
        assert!(stats.non_planar > 0);
        assert!(points.included_count() < 400);
    }
}
