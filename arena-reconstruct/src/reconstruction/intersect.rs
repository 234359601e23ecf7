//! Room corners from wall, floor and ceiling plane intersections.

use crate::error::{ReconstructionError, Surface};
use crate::surface::WallCluster;
use arena_data::{MeshVertex, Plane, WallPlane};
use glam::DVec3;
use ordered_float::OrderedFloat;
use thiserror::Error;
use tracing::{debug, info};

/// Systems whose determinant is smaller than this (for unit normals) are
/// treated as singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-3;

/// Three planes that do not meet in a single point.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("planes do not meet in a single point (determinant {determinant:e})")]
pub struct SingularSystem {
    pub determinant: f64,
}

/// Solve `n_i · x = d_i` for the point shared by three planes.
pub fn intersect_three(a: &Plane, b: &Plane, c: &Plane) -> Result<DVec3, SingularSystem> {
    let bc = b.normal.cross(c.normal);
    let determinant = a.normal.dot(bc);
    if !(determinant.abs() >= SINGULAR_TOLERANCE) {
        return Err(SingularSystem { determinant });
    }
    let ca = c.normal.cross(a.normal);
    let ab = a.normal.cross(b.normal);
    let point = (bc * a.distance + ca * b.distance + ab * c.distance) / determinant;
    if !point.is_finite() {
        return Err(SingularSystem { determinant });
    }
    Ok(point)
}

/// The planes bounding the room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomPlanes {
    pub floor: WallPlane,
    pub ceiling: Plane,
    /// Walls with normals facing the room interior.
    pub walls: Vec<WallPlane>,
}

impl RoomPlanes {
    /// Split clusters into floor and walls and add the ceiling.
    ///
    /// The cluster whose normal has the largest vertical component is the
    /// floor. Walls are flipped to face the mean of their offset points.
    pub fn from_clusters(
        clusters: &[WallCluster],
        ceiling_height: f64,
    ) -> Result<Self, ReconstructionError> {
        let floor_position = clusters
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| OrderedFloat(c.wall.normal().y))
            .map(|(i, _)| i)
            .ok_or(ReconstructionError::TooFewWalls {
                found: 0,
                required: 3,
            })?;
        let floor = clusters[floor_position].wall;
        let walls: Vec<WallPlane> = clusters
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != floor_position)
            .map(|(_, c)| c.wall)
            .collect();
        info!(
            "Floor is cluster {} with normal {:.3}",
            clusters[floor_position].label,
            floor.normal()
        );
        Self::new(floor, Plane::horizontal(ceiling_height), walls)
    }

    pub fn new(
        floor: WallPlane,
        ceiling: Plane,
        walls: Vec<WallPlane>,
    ) -> Result<Self, ReconstructionError> {
        if walls.len() < 3 {
            return Err(ReconstructionError::TooFewWalls {
                found: walls.len(),
                required: 3,
            });
        }
        let center = walls.iter().map(|w| w.offset).sum::<DVec3>() / walls.len() as f64;
        let walls = walls.iter().map(|w| w.facing(center)).collect();
        Ok(Self {
            floor,
            ceiling,
            walls,
        })
    }
}

/// Corners of the room, in the order the walls were walked.
///
/// Corner `i` is where wall `wall_order[i]` meets wall `wall_order[i + 1]`
/// (wrapping around).
#[derive(Debug, Clone, PartialEq)]
pub struct RoomCorners {
    pub wall_order: Vec<usize>,
    pub floor: Vec<MeshVertex>,
    pub ceiling: Vec<MeshVertex>,
}

/// Pick the wall to the counter-clockwise side of `current`: of the two walls
/// with the closest normals, the one whose cross product with the current
/// normal points up.
fn counter_clockwise_neighbor(
    walls: &[WallPlane],
    current: usize,
) -> Result<usize, ReconstructionError> {
    let normal = walls[current].normal();
    let mut others: Vec<usize> = (0..walls.len()).filter(|&i| i != current).collect();
    others.sort_by_key(|&i| OrderedFloat((walls[i].normal() - normal).length()));

    let candidates: Vec<usize> = others
        .into_iter()
        .take(2)
        .filter(|&i| normal.cross(walls[i].normal()).y > 0.0)
        .collect();
    match candidates.as_slice() {
        [next] => Ok(*next),
        _ => Err(ReconstructionError::AmbiguousAdjacency { wall: current }),
    }
}

/// Walk the walls counter-clockwise and intersect each adjacent pair with
/// the floor and the ceiling.
///
/// Floor vertex normals average the two walls and the floor; ceiling vertex
/// normals average the two walls.
#[tracing::instrument(skip_all, fields(walls = planes.walls.len()))]
pub fn solve_corners(planes: &RoomPlanes) -> Result<RoomCorners, ReconstructionError> {
    let walls = &planes.walls;
    let count = walls.len();
    let floor = &planes.floor.plane;
    let ceiling = &planes.ceiling;

    let mut visited = vec![false; count];
    visited[0] = true;
    let mut corners = RoomCorners {
        wall_order: vec![0],
        floor: Vec::with_capacity(count),
        ceiling: Vec::with_capacity(count),
    };

    let mut current = 0;
    for step in 0..count {
        let next = counter_clockwise_neighbor(walls, current)?;
        let closing = step + 1 == count;
        if (closing && next != corners.wall_order[0]) || (!closing && visited[next]) {
            return Err(ReconstructionError::OpenWallCycle {
                wall: current,
                revisited: next,
            });
        }

        let wall = &walls[current].plane;
        let adjacent = &walls[next].plane;
        let singular = |surface, e: SingularSystem| ReconstructionError::SingularSystem {
            wall: current,
            adjacent: next,
            surface,
            determinant: e.determinant,
        };
        let floor_point = intersect_three(wall, adjacent, floor)
            .map_err(|e| singular(Surface::Floor, e))?;
        let ceiling_point = intersect_three(wall, adjacent, ceiling)
            .map_err(|e| singular(Surface::Ceiling, e))?;
        debug!(
            "Walls {} and {} meet the floor at {:.3}",
            current, next, floor_point
        );

        corners.floor.push(MeshVertex::from_planes(
            floor_point,
            &[wall.normal, adjacent.normal, floor.normal],
        ));
        corners.ceiling.push(MeshVertex::from_planes(
            ceiling_point,
            &[wall.normal, adjacent.normal],
        ));

        if !closing {
            visited[next] = true;
            corners.wall_order.push(next);
        }
        current = next;
    }

    info!("Solved {} room corners", corners.floor.len());
    Ok(corners)
}
