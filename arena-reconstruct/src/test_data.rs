//! Synthetic scan data for tests.

use arena_data::ScanSession;
use glam::DVec3;
use rand::Rng;

/// Standard normal sample (Box-Muller).
pub fn gaussian(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Uniform samples over the parallelogram `corner + s * edge_u + t * edge_v`,
/// `s, t` in `[0, 1]`, displaced along its normal by Gaussian noise.
pub fn rectangle(
    rng: &mut impl Rng,
    corner: DVec3,
    edge_u: DVec3,
    edge_v: DVec3,
    count: usize,
    noise: f64,
) -> Vec<DVec3> {
    let normal = edge_u.cross(edge_v).normalize();
    (0..count)
        .map(|_| {
            let s: f64 = rng.gen_range(0.0..1.0);
            let t: f64 = rng.gen_range(0.0..1.0);
            corner + edge_u * s + edge_v * t + normal * (noise * gaussian(rng))
        })
        .collect()
}

/// Square patch of half-width `half_size` centered on `center`, lying in the
/// plane with the given normal.
pub fn plane_patch(
    rng: &mut impl Rng,
    normal: DVec3,
    center: DVec3,
    half_size: f64,
    count: usize,
    noise: f64,
) -> Vec<DVec3> {
    let (u, v) = normal.normalize().any_orthonormal_pair();
    let corner = center - (u + v) * half_size;
    rectangle(rng, corner, u * 2.0 * half_size, v * 2.0 * half_size, count, noise)
}

/// Wall heights sampled by the synthetic rooms.
pub const WALL_TOP: f64 = 0.5;

/// The four walls of the room spanning `[-1, 1]` in x and z, each sampled
/// from the floor up to [`WALL_TOP`]. Returned in the order x = -1, z = 1,
/// x = 1, z = -1.
pub fn room_walls(rng: &mut impl Rng, per_wall: usize, noise: f64) -> Vec<Vec<DVec3>> {
    let up = DVec3::new(0.0, WALL_TOP, 0.0);
    vec![
        rectangle(rng, DVec3::new(-1.0, 0.0, -1.0), DVec3::new(0.0, 0.0, 2.0), up, per_wall, noise),
        rectangle(rng, DVec3::new(-1.0, 0.0, 1.0), DVec3::new(2.0, 0.0, 0.0), up, per_wall, noise),
        rectangle(rng, DVec3::new(1.0, 0.0, -1.0), DVec3::new(0.0, 0.0, 2.0), up, per_wall, noise),
        rectangle(rng, DVec3::new(-1.0, 0.0, -1.0), DVec3::new(2.0, 0.0, 0.0), up, per_wall, noise),
    ]
}

/// A rectangular room: four walls at x = ±1 and z = ±1 plus the floor at y = 0.
pub fn rectangular_room(rng: &mut impl Rng, per_wall: usize, noise: f64) -> Vec<DVec3> {
    let mut points: Vec<DVec3> = room_walls(rng, per_wall, noise).into_iter().flatten().collect();
    points.extend(rectangle(
        rng,
        DVec3::new(-1.0, 0.0, -1.0),
        DVec3::new(0.0, 0.0, 2.0),
        DVec3::new(2.0, 0.0, 0.0),
        per_wall * 4,
        noise,
    ));
    points
}

/// A capture session of [`rectangular_room`] with the reference body at `body`.
pub fn room_session(rng: &mut impl Rng, per_wall: usize, noise: f64, body: DVec3) -> ScanSession {
    let markers = rectangular_room(rng, per_wall, noise);
    let bodies = vec![body; markers.len()];
    ScanSession::new(markers, bodies)
}
