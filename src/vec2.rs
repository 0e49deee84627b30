//! 2D vector math for the grid world.
//!
//! World space is the map grid: `x` runs along columns, `y` along rows.

use std::ops::{Add, AddAssign, DivAssign, Mul, Neg, Sub};

use crate::error::{RaycastError, RaycastResult};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    #[inline]
    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Euclidean distance between two points.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).magnitude()
    }

    /// Rotates counter-clockwise by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        let (s, c) = angle.sin_cos();
        let x = self.x;
        self.x = x * c - self.y * s;
        self.y = x * s + self.y * c;
    }

    /// Scales to unit length.
    ///
    /// A zero-length vector has no direction; it is left untouched and
    /// `DegenerateVector` is returned instead of filling it with NaN.
    pub fn normalize(&mut self) -> RaycastResult<()> {
        let len = self.magnitude();
        if len == 0.0 || !len.is_finite() {
            return Err(RaycastError::DegenerateVector);
        }
        *self /= len;
        Ok(())
    }

    pub fn normalized(mut self) -> RaycastResult<Self> {
        self.normalize()?;
        Ok(self)
    }
}

/// True if `v` has no fractional part.
#[inline]
pub fn is_whole(v: f64) -> bool {
    v == v.trunc()
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, v: Vec2) -> Vec2 {
        Vec2::new(self * v.x, self * v.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, a: f64) -> Vec2 {
        a * self
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl DivAssign<f64> for Vec2 {
    fn div_assign(&mut self, a: f64) {
        self.x /= a;
        self.y /= a;
    }
}
