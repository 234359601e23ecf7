//! Wall clustering by normal direction and plane proximity.

use crate::config::ReconstructionConfig;
use crate::error::ReconstructionError;
use crate::ingest::PointSet;
use crate::surface::pca::PrincipalAxes;
use arena_data::{Plane, WallPlane};
use glam::DVec3;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// One extracted planar cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallCluster {
    /// Label stored on the member points.
    pub label: usize,
    pub wall: WallPlane,
    /// Points assigned to the cluster before outlier removal.
    pub members: usize,
}

/// Distance between two unit normals, ignoring their sign.
///
/// Horizontal wall normals have no reliable vertical sign, so `n` and `-n`
/// count as the same direction.
pub fn normal_distance(a: DVec3, b: DVec3) -> f64 {
    (a - b).length().min((a + b).length())
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    position: DVec3,
    normal: DVec3,
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Group included points with normals into `config.wall_count` planar clusters.
///
/// Each round seeds a cluster from a random unassigned point drawn from
/// `rng`, takes every unassigned point whose normal is within
/// `normal_threshold` of the seed's and which lies within
/// `plane_distance_threshold` of the seed's local plane, then gathers once
/// more against the plane fitted to that first pass.
/// Members farther than `outlier_std` standard deviations from the cluster
/// mean along the fitted normal are excluded from the point set and the
/// plane is refitted on the rest.
///
/// Member points keep their wall label even when excluded as outliers.
#[tracing::instrument(skip_all, fields(walls = config.wall_count))]
pub fn cluster_walls<R: Rng + ?Sized>(
    points: &mut PointSet,
    config: &ReconstructionConfig,
    rng: &mut R,
) -> Result<Vec<WallCluster>, ReconstructionError> {
    let mut clusters = Vec::with_capacity(config.wall_count);

    for label in 0..config.wall_count {
        let candidates: Vec<Candidate> = points
            .points()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.included && p.wall.is_none())
            .filter_map(|(index, p)| {
                p.normal.map(|normal| Candidate {
                    index,
                    position: p.position,
                    normal,
                })
            })
            .collect();

        info!(
            "Making wall {}. Points left to assign: {}",
            label,
            candidates.len()
        );
        if candidates.len() < config.min_cluster_points {
            return Err(ReconstructionError::ClusterUnderflow {
                wall: label,
                remaining: candidates.len(),
                required: config.min_cluster_points,
            });
        }
        let Some(&seed) = candidates.choose(rng) else {
            return Err(ReconstructionError::ClusterUnderflow {
                wall: label,
                remaining: 0,
                required: config.min_cluster_points,
            });
        };

        let near = |plane: &Plane, c: &Candidate| {
            normal_distance(c.normal, seed.normal) < config.normal_threshold
                && plane.signed_distance(c.position).abs() < config.plane_distance_threshold
        };
        let seed_plane = Plane::from_point_normal(seed.position, seed.normal);
        let grown: Vec<DVec3> = candidates
            .iter()
            .filter(|c| near(&seed_plane, *c))
            .map(|c| c.position)
            .collect();
        // Gather again against the plane of the first pass; one seed normal
        // drifts too far over a long wall.
        let plane = PrincipalAxes::fit(&grown).map_or(seed_plane, |axes| {
            Plane::from_point_normal(axes.centroid, axes.normal())
        });
        let members: Vec<Candidate> = candidates.into_iter().filter(|c| near(&plane, c)).collect();
        for member in &members {
            points.get_mut(member.index).wall = Some(label);
        }

        let positions: Vec<DVec3> = members.iter().map(|m| m.position).collect();
        let degenerate = |inliers| ReconstructionError::DegenerateCluster {
            wall: label,
            inliers,
        };
        let axes = PrincipalAxes::fit(&positions).ok_or_else(|| degenerate(members.len()))?;

        // Second pass: drop members far off the plane.
        let offsets: Vec<f64> = positions.iter().map(|&p| axes.project(p, 2)).collect();
        let (mean, std) = mean_and_std(&offsets);
        let limit = config.outlier_std * std;
        let mut inliers = Vec::with_capacity(members.len());
        for (member, offset) in members.iter().zip(&offsets) {
            if std <= f64::EPSILON || (offset - mean).abs() < limit {
                inliers.push(member.position);
            } else {
                points.exclude(member.index);
            }
        }
        debug!(
            "Wall {}: {} members, {} outliers beyond {:.4}",
            label,
            members.len(),
            members.len() - inliers.len(),
            limit
        );

        if inliers.len() < config.min_cluster_points {
            return Err(degenerate(inliers.len()));
        }
        let refit = PrincipalAxes::fit(&inliers).ok_or_else(|| degenerate(inliers.len()))?;
        let wall = WallPlane::new(refit.normal(), refit.centroid, inliers.len());
        info!(
            "Wall {}: normal {:.3}, offset {:.3}, {} inliers",
            label,
            wall.normal(),
            wall.offset,
            wall.inliers
        );

        clusters.push(WallCluster {
            label,
            wall,
            members: members.len(),
        });
    }

    Ok(clusters)
}
