//! Mesh assembly from solved room corners.

use crate::reconstruction::intersect::{RoomCorners, RoomPlanes};
use arena_data::{ArenaMesh, Face};
use glam::DVec3;
use tracing::debug;

/// Assemble the room mesh.
///
/// Vertices are the floor corners followed by the ceiling corners, shifted by
/// `-origin`. Normal 0 is the floor normal and normal `j + 1` belongs to the
/// wall between corners `j` and `j + 1`. Face 0 is the floor polygon; face
/// `j + 1` is the quad of that wall. Every face winds counter-clockwise
/// around its normal.
pub fn build_mesh(
    planes: &RoomPlanes,
    corners: &RoomCorners,
    origin: DVec3,
    name: &str,
) -> ArenaMesh {
    let n = corners.floor.len();
    let mut mesh = ArenaMesh::new(name);

    mesh.vertices = corners
        .floor
        .iter()
        .chain(&corners.ceiling)
        .map(|v| v.position)
        .collect();
    mesh.recenter(origin);

    mesh.normals.push(planes.floor.normal());
    for j in 0..n {
        // Corner j closes wall_order[j]; the next wall in the walk runs to corner j + 1.
        let wall = corners.wall_order[(j + 1) % n];
        mesh.normals.push(planes.walls[wall].normal());
    }

    mesh.faces.push(Face::new((0..n).collect(), 0));
    for j in 0..n {
        let k = (j + 1) % n;
        mesh.faces.push(Face::quad([k, j, n + j, n + k], j + 1));
    }

    debug!(
        "Mesh has {} vertices, {} normals, {} faces",
        mesh.vertices.len(),
        mesh.normals.len(),
        mesh.faces.len()
    );
    mesh
}
