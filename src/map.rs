//! Occupancy grid and ray traversal.

use std::str::FromStr;

use tracing::debug;

use crate::error::{RaycastError, RaycastResult};
use crate::ray::Ray;
use crate::vec2::{Vec2, is_whole};

/// Offset used to look at the cells on either side of a grid line.
const EDGE_NUDGE: f64 = 0.1;

/// Rectangular wall grid, `grid[row][col]`, `true` = wall.
///
/// Cell `(col, row)` covers `[col, col + 1) x [row, row + 1)` in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    grid: Vec<Vec<bool>>,
}

impl Map {
    pub fn new(grid: Vec<Vec<bool>>) -> RaycastResult<Self> {
        let width = grid.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(RaycastError::EmptyGrid);
        }
        if let Some((row, cells)) = grid.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(RaycastError::RaggedGrid {
                row,
                expected: width,
                found: cells.len(),
            });
        }

        debug!(width, height = grid.len(), "map built");
        Ok(Self { grid })
    }

    /// Builds a map from text rows. `#`, `1` and `X` are walls; `.`, `0` and
    /// space are floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> RaycastResult<Self> {
        let mut grid = Vec::with_capacity(rows.len());
        for (row, line) in rows.iter().enumerate() {
            let cells = line
                .as_ref()
                .chars()
                .enumerate()
                .map(|(col, tile)| match tile {
                    '#' | '1' | 'X' => Ok(true),
                    '.' | '0' | ' ' => Ok(false),
                    _ => Err(RaycastError::UnknownTile { row, col, tile }),
                })
                .collect::<RaycastResult<Vec<bool>>>()?;
            grid.push(cells);
        }
        Self::new(grid)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.grid[0].len()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Cell lookup. Anything off the grid is open.
    pub fn is_wall(&self, col: usize, row: usize) -> bool {
        self.grid
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    pub fn inside(&self, point: Vec2) -> bool {
        point.x >= 0.0
            && point.x < self.width() as f64
            && point.y >= 0.0
            && point.y < self.height() as f64
    }

    /// True if `point` is not inside a wall.
    ///
    /// A point on a grid line touches the cells on both sides of it, and all
    /// of them must be open. At a corner that is all four cells.
    pub fn passable(&self, point: Vec2) -> bool {
        // well clear of the grid the world is open; also stops the edge
        // recursion where a nudge no longer changes a huge coordinate
        if !self.near(point) {
            return true;
        }

        if is_whole(point.x) {
            let nudge = Vec2::new(EDGE_NUDGE, 0.0);
            return self.passable(point - nudge) && self.passable(point + nudge);
        }
        if is_whole(point.y) {
            let nudge = Vec2::new(0.0, EDGE_NUDGE);
            return self.passable(point - nudge) && self.passable(point + nudge);
        }

        if self.inside(point) {
            !self.grid[point.y.floor() as usize][point.x.floor() as usize]
        } else {
            true
        }
    }

    fn near(&self, point: Vec2) -> bool {
        point.x > -1.0
            && point.x < self.width() as f64 + 1.0
            && point.y > -1.0
            && point.y < self.height() as f64 + 1.0
    }

    /// Walks `ray` from grid line to grid line until it enters a wall.
    ///
    /// Returns the entry point, or `ray.at(range)` if no wall lies within
    /// `range`. Check the result with [`Map::passable`] to tell the two apart.
    /// A NaN range counts as zero. An infinite range stops past the last
    /// cell of the grid.
    pub fn cast(&self, ray: &Ray, range: f64) -> Vec2 {
        let origin = ray.origin();
        let dir = ray.direction();
        let reach = self.reach(origin);
        let range = match range {
            r if r.is_nan() => 0.0,
            r if r == f64::INFINITY => reach,
            r => r.max(0.0),
        };
        // no wall lies past `reach`
        let limit = range.min(reach);
        let mut point = origin;

        while self.passable(point) && origin.distance(point) <= limit {
            // next whole x along the ray, unless it runs parallel to the y axis
            let step_x = (dir.x != 0.0).then(|| {
                let x = if dir.x < 0.0 {
                    (point.x - 1.0).ceil()
                } else {
                    (point.x + 1.0).floor()
                };
                Vec2::new(x, (x - point.x) * dir.y / dir.x + point.y)
            });

            let step_y = (dir.y != 0.0).then(|| {
                let y = if dir.y < 0.0 {
                    (point.y - 1.0).ceil()
                } else {
                    (point.y + 1.0).floor()
                };
                Vec2::new((y - point.y) * dir.x / dir.y + point.x, y)
            });

            point = match (step_x, step_y) {
                (Some(sx), Some(sy)) => {
                    if point.distance(sx) < point.distance(sy) {
                        sx
                    } else {
                        sy
                    }
                }
                (Some(sx), None) => sx,
                (None, Some(sy)) => sy,
                // unit direction always has a non-zero component
                (None, None) => break,
            };
        }

        if origin.distance(point) > limit {
            ray.at(range)
        } else {
            point
        }
    }

    /// Distance from `origin` past which no wall face can lie.
    fn reach(&self, origin: Vec2) -> f64 {
        let (w, h) = (self.width() as f64, self.height() as f64);
        [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
            .into_iter()
            .map(|(x, y)| origin.distance(Vec2::new(x, y)))
            .fold(0.0, f64::max)
            + 1.0
    }
}

impl FromStr for Map {
    type Err = RaycastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.trim_end_matches(['\n', '\r']).lines().collect();
        Self::from_rows(&rows)
    }
}
