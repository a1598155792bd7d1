//! Geometry utilities: points and 2D affine transforms

use std::ops::{Add, Mul, Sub};

/// 2D point / vector in canvas units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Affine transform in canvas convention:
///
/// ```text
/// x' = a*x + c*y + e
/// y' = b*x + d*y + f
/// ```
///
/// `translate`, `rotate` and `scale` post-multiply, so the most recently
/// applied operation acts on user coordinates first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// self × other
    pub fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn translate(&self, tx: f64, ty: f64) -> Self {
        self.then(&Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        })
    }

    /// Rotate by `angle` radians (clockwise on screen, y grows downward)
    pub fn rotate(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.then(&Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        })
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        self.then(&Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        })
    }

    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, or None for a degenerate (zero-area) transform
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-12 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    /// Geometric mean of the axis scale factors; used to size arc tessellation
    pub fn mean_scale(&self) -> f64 {
        self.determinant().abs().sqrt()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_translate_then_scale() {
        // Canvas semantics: translate(10, 5); scale(2, 3) maps (1, 1) -> (12, 8)
        let t = Transform::IDENTITY.translate(10.0, 5.0).scale(2.0, 3.0);
        assert!(close(t.apply(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 8.0)));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let t = Transform::IDENTITY.rotate(FRAC_PI_2);
        assert!(close(t.apply(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_invert_roundtrip() {
        let t = Transform::IDENTITY
            .translate(40.0, -3.0)
            .rotate(0.7)
            .scale(1.5, 0.25);
        let inv = t.invert().unwrap();
        let p = Vec2::new(3.0, 9.0);
        assert!(close(inv.apply(t.apply(p)), p));
    }

    #[test]
    fn test_degenerate_has_no_inverse() {
        assert!(Transform::IDENTITY.scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn test_mean_scale() {
        let t = Transform::IDENTITY.scale(4.0, 1.0).rotate(1.0);
        assert!((t.mean_scale() - 2.0).abs() < 1e-9);
    }
}
