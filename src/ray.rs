use crate::error::RaycastResult;
use crate::vec2::Vec2;

/// Half-line from `origin` along a unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec2,
    direction: Vec2, // always unit length
}

impl Ray {
    pub fn new(origin: Vec2, direction: Vec2) -> RaycastResult<Self> {
        Ok(Self {
            origin,
            direction: direction.normalized()?,
        })
    }

    /// Ray starting at `from` and pointing at `to`.
    pub fn through(from: Vec2, to: Vec2) -> RaycastResult<Self> {
        Self::new(from, to - from)
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn set_origin(&mut self, p: Vec2) {
        self.origin = p;
    }

    pub fn set_direction(&mut self, v: Vec2) -> RaycastResult<()> {
        self.direction = v.normalized()?;
        Ok(())
    }

    /// Point `t` units along the ray.
    #[inline]
    pub fn at(&self, t: f64) -> Vec2 {
        self.origin + t * self.direction
    }
}
