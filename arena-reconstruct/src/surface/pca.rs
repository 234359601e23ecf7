//! Principal-axis decomposition of small point sets.

use glam::DVec3;
use nalgebra::{Matrix3, Vector3};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Principal axes of a point set, ordered by decreasing variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalAxes {
    pub centroid: DVec3,
    /// Unit axes; `axes[2]` is the direction of least variance.
    pub axes: [DVec3; 3],
    /// Variance along each axis.
    pub variances: [f64; 3],
}

impl PrincipalAxes {
    /// Fit the principal axes of `points`.
    ///
    /// Returns `None` for fewer than three points or when all points coincide.
    pub fn fit(points: &[DVec3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let n = points.len() as f64;
        let centroid = points.iter().copied().sum::<DVec3>() / n;

        let mut cov = Matrix3::<f64>::zeros();
        for p in points {
            let d = *p - centroid;
            let d = Vector3::new(d.x, d.y, d.z);
            cov += d * d.transpose();
        }
        cov /= n;

        let eig = cov.symmetric_eigen();
        let mut order = [0usize, 1, 2];
        order.sort_by_key(|&i| Reverse(OrderedFloat(eig.eigenvalues[i])));

        let mut axes = [DVec3::ZERO; 3];
        let mut variances = [0.0; 3];
        for (slot, &i) in order.iter().enumerate() {
            let column = eig.eigenvectors.column(i);
            axes[slot] = DVec3::new(column[0], column[1], column[2]).normalize_or_zero();
            // Round-off can leave tiny negative eigenvalues.
            variances[slot] = eig.eigenvalues[i].max(0.0);
        }

        if variances.iter().sum::<f64>() <= f64::EPSILON * f64::EPSILON {
            return None;
        }
        Some(Self {
            centroid,
            axes,
            variances,
        })
    }

    /// Share of the total variance carried by each axis.
    pub fn explained_variance_ratio(&self) -> [f64; 3] {
        let total: f64 = self.variances.iter().sum();
        self.variances.map(|v| v / total)
    }

    /// Least-variance axis, flipped so its vertical component is non-negative.
    pub fn normal(&self) -> DVec3 {
        orient_up(self.axes[2])
    }

    /// Coordinate of `point` along axis `axis`, relative to the centroid.
    pub fn project(&self, point: DVec3, axis: usize) -> f64 {
        (point - self.centroid).dot(self.axes[axis])
    }
}

/// Flip `normal` if its vertical component is negative.
pub fn orient_up(normal: DVec3) -> DVec3 {
    if normal.y < 0.0 { -normal } else { normal }
}
