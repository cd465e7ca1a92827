//! Rigid transform type backing the transformation-matrix entity
//!
//! An IGES transformation is a 3x3 rotation (or general linear) block `r`
//! and a translation vector `t`; a point maps as `r * p + t`.

use super::Point3;
use std::ops::Mul;

/// Rotation + translation transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Row-major 3x3 linear block
    pub r: [[f64; 3]; 3],
    /// Translation vector
    pub t: Point3,
}

impl Transform {
    /// The identity transform
    pub const IDENTITY: Transform = Transform {
        r: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        t: Point3::ZERO,
    };

    /// Create from a row-major rotation block and a translation
    pub const fn new(r: [[f64; 3]; 3], t: Point3) -> Self {
        Transform { r, t }
    }

    /// Pure translation
    pub fn from_translation(t: Point3) -> Self {
        Transform {
            t,
            ..Transform::IDENTITY
        }
    }

    /// Rotation about the Z axis by `angle` radians
    pub fn from_rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Transform::new([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]], Point3::ZERO)
    }

    /// Apply to a point: `r * p + t`
    pub fn apply(&self, p: Point3) -> Point3 {
        Point3::new(
            self.r[0][0] * p.x + self.r[0][1] * p.y + self.r[0][2] * p.z + self.t.x,
            self.r[1][0] * p.x + self.r[1][1] * p.y + self.r[1][2] * p.z + self.t.y,
            self.r[2][0] * p.x + self.r[2][1] * p.y + self.r[2][2] * p.z + self.t.z,
        )
    }

    /// Apply only the linear block (for direction vectors)
    pub fn apply_rotation(&self, p: Point3) -> Point3 {
        Point3::new(
            self.r[0][0] * p.x + self.r[0][1] * p.y + self.r[0][2] * p.z,
            self.r[1][0] * p.x + self.r[1][1] * p.y + self.r[1][2] * p.z,
            self.r[2][0] * p.x + self.r[2][1] * p.y + self.r[2][2] * p.z,
        )
    }

    /// Compose: `(a * b).apply(p) == a.apply(b.apply(p))`
    pub fn compose(&self, other: &Transform) -> Transform {
        let mut r = [[0.0; 3]; 3];
        for (i, row) in r.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.r[i][0] * other.r[0][j]
                    + self.r[i][1] * other.r[1][j]
                    + self.r[i][2] * other.r[2][j];
            }
        }
        Transform {
            r,
            t: self.apply(other.t),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Transform;
    fn mul(self, other: Transform) -> Transform {
        self.compose(&other)
    }
}

impl Mul<Point3> for Transform {
    type Output = Point3;
    fn mul(self, p: Point3) -> Point3 {
        self.apply(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Transform::IDENTITY.apply(p), p);
    }

    #[test]
    fn test_translation() {
        let xf = Transform::from_translation(Point3::new(10.0, 0.0, 0.0));
        assert_eq!(xf.apply(Point3::ZERO), Point3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_z() {
        let xf = Transform::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let p = xf.apply(Point3::UNIT_X);
        assert!((p.x).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_compose_matches_sequential_apply() {
        let a = Transform::from_rotation_z(0.3);
        let b = Transform::from_translation(Point3::new(1.0, 2.0, 3.0));
        let p = Point3::new(-2.0, 0.5, 4.0);
        let once = (a * b).apply(p);
        let twice = a.apply(b.apply(p));
        assert!((once - twice).length() < 1e-12);
    }
}
