//! Core data types for arena samples, planes and meshes.
//!
//! Positions are in tracker space (meters, y up) and stored as `f64` so plane
//! intersections stay well conditioned.

use glam::DVec3;

/// A single wand sample as it moves through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Marker position in tracker space.
    pub position: DVec3,
    /// Whether the point is still used by the analysis.
    pub included: bool,
    /// Local surface normal, once estimated.
    pub normal: Option<DVec3>,
    /// Index of the wall cluster the point was assigned to.
    pub wall: Option<usize>,
}

impl SamplePoint {
    /// Create an included point with no normal or wall label yet.
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            included: true,
            normal: None,
            wall: None,
        }
    }

    /// Height coordinate (tracker y).
    pub fn height(&self) -> f64 {
        self.position.y
    }
}

/// A plane in equation form `normal · x = distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: DVec3,
    /// Signed offset along the normal.
    pub distance: f64,
}

impl Plane {
    /// Create a plane from a normal and offset. The normal is normalized.
    pub fn new(normal: DVec3, distance: f64) -> Self {
        let length = normal.length();
        Self {
            normal: normal / length,
            distance: distance / length,
        }
    }

    /// Plane through `point` with the given normal.
    pub fn from_point_normal(point: DVec3, normal: DVec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    /// Horizontal plane at height `y`, normal pointing up.
    pub fn horizontal(y: f64) -> Self {
        Self {
            normal: DVec3::Y,
            distance: y,
        }
    }

    /// Signed distance from `point` to the plane.
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.distance
    }

    /// The same plane with its normal reversed.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }
}

/// A fitted wall: its plane plus the mean of the points that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPlane {
    pub plane: Plane,
    /// Mean position of the cluster inliers; the plane passes through it.
    pub offset: DVec3,
    /// Number of points the final fit used.
    pub inliers: usize,
}

impl WallPlane {
    pub fn new(normal: DVec3, offset: DVec3, inliers: usize) -> Self {
        Self {
            plane: Plane::from_point_normal(offset, normal),
            offset,
            inliers,
        }
    }

    pub fn normal(&self) -> DVec3 {
        self.plane.normal
    }

    /// Reorient the wall so its normal points towards `target`.
    pub fn facing(&self, target: DVec3) -> Self {
        if self.plane.normal.dot(target - self.offset) < 0.0 {
            Self {
                plane: self.plane.flipped(),
                ..*self
            }
        } else {
            *self
        }
    }
}

/// A room corner with the averaged normal of the planes meeting there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: DVec3,
    pub normal: DVec3,
}

impl MeshVertex {
    /// Build a vertex whose normal is the normalized sum of `normals`.
    pub fn from_planes(position: DVec3, normals: &[DVec3]) -> Self {
        let sum: DVec3 = normals.iter().copied().sum();
        Self {
            position,
            normal: sum.normalize_or_zero(),
        }
    }
}

/// A planar polygon face: vertex indices in winding order and one normal
/// index, all 0-based. Wall faces are quads; the floor has one corner per wall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub vertices: Vec<usize>,
    pub normal: usize,
}

impl Face {
    pub fn new(vertices: Vec<usize>, normal: usize) -> Self {
        Self { vertices, normal }
    }

    pub fn quad(vertices: [usize; 4], normal: usize) -> Self {
        Self {
            vertices: vertices.to_vec(),
            normal,
        }
    }
}

/// The reconstructed arena: a named polygon mesh with per-face normals.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaMesh {
    /// Object name written to the `o` line.
    pub name: String,
    pub vertices: Vec<DVec3>,
    pub normals: Vec<DVec3>,
    pub faces: Vec<Face>,
}

impl ArenaMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            normals: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Translate every vertex by `-origin`.
    pub fn recenter(&mut self, origin: DVec3) {
        for vertex in &mut self.vertices {
            *vertex -= origin;
        }
    }
}
