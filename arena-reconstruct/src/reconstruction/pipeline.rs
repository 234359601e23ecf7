//! End-to-end reconstruction from a capture session to a room mesh.

use crate::config::ReconstructionConfig;
use crate::error::ReconstructionError;
use crate::ingest::{PointSet, filter_duplicates, filter_height};
use crate::reconstruction::intersect::{RoomCorners, RoomPlanes, solve_corners};
use crate::reconstruction::mesh::build_mesh;
use crate::surface::{WallCluster, apply_normals, cluster_walls, estimate_normals};
use arena_data::{ArenaMesh, ScanSession};
use glam::DVec3;
use rand::Rng;
use tracing::{info, warn};

/// Point counts and choices made by each stage of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    pub total_samples: usize,
    pub height_excluded: usize,
    pub duplicates_excluded: usize,
    pub without_neighborhood: usize,
    pub non_planar: usize,
    /// Points left for clustering after the normal stage.
    pub clustered_from: usize,
    /// Final inlier count of each cluster, in extraction order.
    pub cluster_inliers: Vec<usize>,
    pub floor_cluster: Option<usize>,
    pub corners: usize,
    /// Mean tracked-body position subtracted from the mesh, if the session had one.
    pub origin: Option<DVec3>,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub mesh: ArenaMesh,
    pub points: PointSet,
    pub clusters: Vec<WallCluster>,
    pub planes: RoomPlanes,
    pub corners: RoomCorners,
    pub report: StageReport,
}

/// Runs the reconstruction stages with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    config: ReconstructionConfig,
}

impl Reconstructor {
    pub fn new(config: ReconstructionConfig) -> Result<Self, ReconstructionError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Reconstruct the room sampled in `session`.
    ///
    /// `rng` drives cluster seeding, so a seeded generator makes the run
    /// reproducible.
    #[tracing::instrument(skip_all, fields(samples = session.len()))]
    pub fn run<R: Rng + ?Sized>(
        &self,
        session: &ScanSession,
        rng: &mut R,
    ) -> Result<Reconstruction, ReconstructionError> {
        let config = &self.config;
        session.validate()?;
        if session.is_empty() {
            return Err(ReconstructionError::EmptySession);
        }

        let mut report = StageReport {
            total_samples: session.len(),
            ..Default::default()
        };
        let mut points = PointSet::from_session(session);
        info!("Loaded {} samples", report.total_samples);

        report.height_excluded = filter_height(&mut points, config.height_band);
        if config.drop_duplicates {
            report.duplicates_excluded = filter_duplicates(&mut points);
        }
        info!(
            "Filtering: {} outside height band, {} duplicates, {} remaining",
            report.height_excluded,
            report.duplicates_excluded,
            points.included_count()
        );

        let subset = points.included();
        if subset.len() < config.neighbors {
            return Err(ReconstructionError::InsufficientPoints {
                stage: "normal estimation",
                remaining: subset.len(),
                required: config.neighbors,
            });
        }
        let estimates =
            estimate_normals(&points, &subset, config.neighbors, config.min_neighbor_distance);
        let stats = apply_normals(&mut points, &subset, &estimates, config.planarity_threshold);
        report.without_neighborhood = stats.without_neighborhood;
        report.non_planar = stats.non_planar;

        report.clustered_from = points.included_count();
        let required = config.wall_count * config.min_cluster_points;
        if report.clustered_from < required {
            return Err(ReconstructionError::InsufficientPoints {
                stage: "wall clustering",
                remaining: report.clustered_from,
                required,
            });
        }
        let clusters = cluster_walls(&mut points, config, rng)?;
        report.cluster_inliers = clusters.iter().map(|c| c.wall.inliers).collect();

        let planes = RoomPlanes::from_clusters(&clusters, config.ceiling_height)?;
        report.floor_cluster = clusters
            .iter()
            .find(|c| c.wall == planes.floor)
            .map(|c| c.label);
        let corners = solve_corners(&planes)?;
        report.corners = corners.floor.len();

        report.origin = session.mean_body_position();
        let origin = match report.origin {
            Some(origin) => {
                info!("Recentering on mean body position {:.3}", origin);
                origin
            }
            None => {
                warn!("Session has no body positions; mesh stays in tracker space");
                DVec3::ZERO
            }
        };
        let mesh = build_mesh(&planes, &corners, origin, &config.object_name);
        info!(
            "Reconstructed {} walls into {} vertices and {} faces",
            planes.walls.len(),
            mesh.vertices.len(),
            mesh.faces.len()
        );

        Ok(Reconstruction {
            mesh,
            points,
            clusters,
            planes,
            corners,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data;
    use arena_data::{DataError, save_obj};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TRUE_CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)];

    fn run_room(seed: u64, body: DVec3) -> Reconstruction {
        let mut rng = StdRng::seed_from_u64(seed);
        let session = test_data::room_session(&mut rng, 600, 0.003, body);
        let reconstructor = Reconstructor::new(ReconstructionConfig::default()).unwrap();
        reconstructor.run(&session, &mut rng).unwrap()
    }

    #[test]
    fn test_rectangular_room_end_to_end() {
        let result = run_room(2024, DVec3::ZERO);
        let mesh = &result.mesh;

        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.normals.len(), 5);
        assert_eq!(mesh.faces.len(), 5);

        for (ring, height) in [(&mesh.vertices[..4], 0.0), (&mesh.vertices[4..], 0.6)] {
            for &(x, z) in &TRUE_CORNERS {
                let expected = DVec3::new(x, height, z);
                let matches = ring
                    .iter()
                    .filter(|v| (**v - expected).length() < 0.05)
                    .count();
                assert_eq!(matches, 1, "corner {expected} in {ring:?}");
            }
        }

        assert!(mesh.normals[0].dot(DVec3::Y) > 0.99);
        for normal in &mesh.normals[1..] {
            assert!(normal.y.abs() < 0.05);
        }

        let report = &result.report;
        assert_eq!(report.total_samples, 4800);
        assert_eq!(report.height_excluded, 0);
        assert_eq!(report.duplicates_excluded, 0);
        assert_eq!(report.cluster_inliers.len(), 5);
        assert_eq!(report.corners, 4);
        assert_eq!(report.origin, Some(DVec3::ZERO));
        let floor = report.floor_cluster.unwrap();
        assert!(result.clusters[floor].wall.normal().y > 0.99);
    }

    #[test]
    fn test_reconstruction_writes_obj() {
        let result = run_room(2024, DVec3::ZERO);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena_unprocessed.obj");
        save_obj(&result.mesh, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.lines().any(|l| l == "o Arena"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 5);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 5);
    }

    #[test]
    fn test_mesh_recentered_on_body() {
        let body = DVec3::new(0.2, 0.05, -0.3);
        let centered = run_room(77, DVec3::ZERO);
        let shifted = run_room(77, body);

        assert!((shifted.report.origin.unwrap() - body).length() < 1e-12);
        for (a, b) in centered.mesh.vertices.iter().zip(&shifted.mesh.vertices) {
            assert!((*a - *b - body).length() < 1e-9);
        }
    }

    #[test]
    fn test_empty_session() {
        let reconstructor = Reconstructor::new(ReconstructionConfig::default()).unwrap();
        let session = ScanSession::new(Vec::new(), Vec::new());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            reconstructor.run(&session, &mut rng),
            Err(ReconstructionError::EmptySession)
        ));
    }

    #[test]
    fn test_too_few_points_for_neighborhoods() {
        let reconstructor = Reconstructor::new(ReconstructionConfig::default()).unwrap();
        let markers: Vec<DVec3> = (0..10).map(|i| DVec3::new(i as f64 * 0.01, 0.1, 0.0)).collect();
        let session = ScanSession::new(markers, Vec::new());
        let mut rng = StdRng::seed_from_u64(0);
        match reconstructor.run(&session, &mut rng) {
            Err(ReconstructionError::InsufficientPoints {
                stage,
                remaining,
                required,
            }) => {
                assert_eq!(stage, "normal estimation");
                assert_eq!(remaining, 10);
                assert_eq!(required, 40);
            }
            other => panic!("expected insufficient points, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_session_rejected() {
        let reconstructor = Reconstructor::new(ReconstructionConfig::default()).unwrap();
        let session = ScanSession::new(vec![DVec3::ZERO; 3], vec![DVec3::ZERO; 2]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            reconstructor.run(&session, &mut rng),
            Err(ReconstructionError::Data(DataError::LengthMismatch {
                markers: 3,
                bodies: 2
            }))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ReconstructionConfig {
            wall_count: 2,
            ..Default::default()
        };
        assert!(matches!(
            Reconstructor::new(config),
            Err(ReconstructionError::InvalidConfig(_))
        ));
    }
}
