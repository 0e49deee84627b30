use rayon::prelude::*;
use tracing::debug;

use crate::error::{RaycastError, RaycastResult};
use crate::map::Map;
use crate::ray::Ray;
use crate::surface::{Rgb, Surface};
use crate::vec2::Vec2;

/// Smallest perpendicular depth used for wall projection.
pub const MIN_DEPTH: f64 = 0.01;

/// One column of wall, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallStrip {
    pub x: usize,
    pub top: i32,
    pub height: u32,
    /// Perpendicular depth after clamping.
    pub depth: f64,
    pub color: Rgb,
}

/// Viewpoint into a [`Map`].
///
/// The camera borrows the map it looks at, so the map must outlive it.
pub struct Camera<'m> {
    map: &'m Map,

    pos: Vec2,    // viewpoint in world space
    x_unit: Vec2, // toward the right side of the screen
    z_unit: Vec2, // into the screen

    near_distance: f64, // distance to the projection plane
    draw_distance: f64, // max cast range
    view_radius: f64,   // screen center to right edge, on the projection plane

    sky: Rgb,
    wall: Rgb,
}

impl<'m> Camera<'m> {
    /// `fov` is the horizontal field of view in radians.
    pub fn new(
        map: &'m Map,
        position: Vec2,
        direction: Vec2,
        fov: f64,
        near_distance: f64,
        draw_distance: f64,
    ) -> RaycastResult<Self> {
        if !(fov > 0.0 && fov < std::f64::consts::PI) {
            return Err(RaycastError::InvalidFieldOfView(fov));
        }
        if !(near_distance > 0.0 && near_distance.is_finite()) {
            return Err(RaycastError::InvalidNearDistance(near_distance));
        }
        if !(draw_distance > 0.0 && draw_distance.is_finite()) {
            return Err(RaycastError::InvalidDrawDistance(draw_distance));
        }

        let z_unit = direction.normalized()?;
        // screen right is clockwise from forward
        let mut x_unit = z_unit;
        x_unit.rotate(-std::f64::consts::FRAC_PI_2);
        x_unit.normalize()?;

        debug!(
            x = position.x,
            y = position.y,
            fov_deg = fov.to_degrees(),
            near_distance,
            draw_distance,
            "camera created"
        );

        Ok(Self {
            map,
            pos: position,
            x_unit,
            z_unit,
            near_distance,
            draw_distance,
            view_radius: near_distance * (fov / 2.0).sin(),
            sky: Rgb::BLACK,
            wall: Rgb::BLUE,
        })
    }

    pub fn set_palette(&mut self, sky: Rgb, wall: Rgb) {
        self.sky = sky;
        self.wall = wall;
    }

    pub fn map(&self) -> &'m Map {
        self.map
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn x_unit(&self) -> Vec2 {
        self.x_unit
    }

    pub fn z_unit(&self) -> Vec2 {
        self.z_unit
    }

    pub fn near_distance(&self) -> f64 {
        self.near_distance
    }

    pub fn draw_distance(&self) -> f64 {
        self.draw_distance
    }

    pub fn view_radius(&self) -> f64 {
        self.view_radius
    }

    /// Strafe `dx` units to the right.
    pub fn move_x(&mut self, dx: f64) {
        self.pos += dx * self.x_unit;
    }

    /// Move `dz` units forward.
    pub fn move_z(&mut self, dz: f64) {
        self.pos += dz * self.z_unit;
    }

    /// Turn counter-clockwise by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        self.x_unit.rotate(angle);
        self.z_unit.rotate(angle);
    }

    /// World-space point of screen column `x` on the projection plane.
    pub fn find_column(&self, x: usize, screen_width: usize) -> Vec2 {
        let center = self.pos + self.near_distance * self.z_unit;
        let t = (2.0 * x as f64 / screen_width as f64) - 1.0;
        center + (t * self.view_radius) * self.x_unit
    }

    /// Casts column `x` and returns the wall it sees, if any.
    pub fn column_strip(&self, x: usize, screen_width: usize, screen_height: usize) -> Option<WallStrip> {
        // find_column is always near_distance ahead of pos, never on it
        let ray = Ray::through(self.pos, self.find_column(x, screen_width)).ok()?;
        let hit = self.map.cast(&ray, self.draw_distance);
        if self.map.passable(hit) {
            return None;
        }

        // depth along the view axis, not ray length, so walls don't bulge
        let z = (hit - self.pos).dot(self.z_unit).max(MIN_DEPTH);

        // walls reach equally above and below the horizon, and fill the
        // screen at z = 1
        let half = (screen_height / 2) as f64;
        let top = half - half / z;
        let height = screen_height as f64 / z;

        // fog so walls fade out before the draw distance clips them
        let shade = (255.0 * z / self.draw_distance).clamp(0.0, 255.0) as u8;

        Some(WallStrip {
            x,
            top: top as i32,
            height: height as u32,
            depth: z,
            color: self.wall.darken(shade),
        })
    }

    /// Draws the scene onto `surface`.
    pub fn render<S: Surface>(&self, surface: &mut S) {
        let (width, height) = (surface.width(), surface.height());
        surface.fill(self.sky);
        if width == 0 || height == 0 {
            return;
        }

        // columns are independent; cast in parallel, draw in order
        let strips: Vec<WallStrip> = (0..width)
            .into_par_iter()
            .filter_map(|x| self.column_strip(x, width, height))
            .collect();

        for strip in strips {
            surface.fill_rect(strip.x as i32, strip.top, 1, strip.height, strip.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::FrameBuffer;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    fn open_map() -> Map {
        Map::new(vec![vec![false; 8]; 8]).unwrap()
    }

    #[test]
    fn basis_is_orthonormal() {
        let map = open_map();
        let cam = Camera::new(&map, Vec2::new(1.0, 1.0), Vec2::new(0.0, 3.0), FRAC_PI_2, 1.0, 16.0)
            .unwrap();
        assert!(approx(cam.z_unit(), Vec2::new(0.0, 1.0)));
        assert!(approx(cam.x_unit(), Vec2::new(1.0, 0.0)));
        assert!((cam.view_radius() - (PI / 4.0).sin()).abs() < EPS);
    }

    #[test]
    fn rejects_bad_parameters() {
        let map = open_map();
        let p = Vec2::new(1.0, 1.0);
        let d = Vec2::new(1.0, 0.0);
        assert!(matches!(
            Camera::new(&map, p, Vec2::ZERO, 1.0, 1.0, 16.0),
            Err(RaycastError::DegenerateVector)
        ));
        assert!(matches!(
            Camera::new(&map, p, d, 0.0, 1.0, 16.0),
            Err(RaycastError::InvalidFieldOfView(_))
        ));
        assert!(matches!(
            Camera::new(&map, p, d, PI, 1.0, 16.0),
            Err(RaycastError::InvalidFieldOfView(_))
        ));
        assert!(matches!(
            Camera::new(&map, p, d, 1.0, -1.0, 16.0),
            Err(RaycastError::InvalidNearDistance(_))
        ));
        assert!(matches!(
            Camera::new(&map, p, d, 1.0, 1.0, f64::INFINITY),
            Err(RaycastError::InvalidDrawDistance(_))
        ));
    }

    #[test]
    fn rotate_round_trip_keeps_basis() {
        let map = open_map();
        let mut cam =
            Camera::new(&map, Vec2::new(4.0, 4.0), Vec2::new(0.6, 0.8), 1.2, 1.0, 16.0).unwrap();
        let (x0, z0) = (cam.x_unit(), cam.z_unit());

        for angle in [0.1, 2.5, -1.3, 7.0, 0.0001] {
            cam.rotate(angle);
            assert!(cam.x_unit().dot(cam.z_unit()).abs() < EPS);
        }
        for angle in [-0.0001, -7.0, 1.3, -2.5, -0.1] {
            cam.rotate(angle);
        }
        assert!(approx(cam.x_unit(), x0));
        assert!(approx(cam.z_unit(), z0));
    }

    #[test]
    fn moves_follow_the_basis() {
        let map = open_map();
        let mut cam =
            Camera::new(&map, Vec2::new(2.0, 2.0), Vec2::new(0.0, 1.0), FRAC_PI_2, 1.0, 16.0)
                .unwrap();
        cam.move_z(2.0);
        cam.move_x(1.0);
        assert!(approx(cam.position(), Vec2::new(3.0, 4.0)));

        cam.rotate(FRAC_PI_2);
        cam.move_z(1.0);
        assert!(approx(cam.position(), Vec2::new(2.0, 4.0)));
    }

    #[test]
    fn find_column_spans_the_view_plane() {
        let map = open_map();
        let cam = Camera::new(&map, Vec2::new(4.0, 0.0), Vec2::new(0.0, 1.0), FRAC_PI_2, 1.0, 16.0)
            .unwrap();
        let r = cam.view_radius();
        assert!(approx(cam.find_column(0, 100), Vec2::new(4.0 - r, 1.0)));
        assert!(approx(cam.find_column(50, 100), Vec2::new(4.0, 1.0)));
        assert!(approx(cam.find_column(100, 100), Vec2::new(4.0 + r, 1.0)));
    }

    #[test]
    fn wall_strip_height_and_shade() {
        let map: Map = "....\n....\n....\n....\n####".parse().unwrap();
        let cam = Camera::new(&map, Vec2::new(2.0, 0.0), Vec2::new(0.0, 1.0), FRAC_PI_2, 1.0, 16.0)
            .unwrap();

        let strip = cam.column_strip(50, 100, 80).unwrap();
        assert!((strip.depth - 4.0).abs() < EPS);
        assert_eq!(strip.height, 20);
        assert_eq!(strip.top, 30);
        // 255 * 4 / 16
        assert_eq!(strip.color, Rgb::new(0, 0, 255 - 63));
    }

    #[test]
    fn odd_height_halves_before_projecting() {
        let map: Map = "....\n....\n....\n....\n####".parse().unwrap();
        let cam = Camera::new(&map, Vec2::new(2.0, 0.0), Vec2::new(0.0, 1.0), FRAC_PI_2, 1.0, 16.0)
            .unwrap();

        // 40 - 40 / 4, and 81 / 4 truncated
        let strip = cam.column_strip(50, 100, 81).unwrap();
        assert_eq!(strip.top, 30);
        assert_eq!(strip.height, 20);

        let strip = cam.column_strip(50, 100, 7).unwrap();
        assert_eq!(strip.top, 2);
        assert_eq!(strip.height, 1);
    }

    #[test]
    fn beyond_draw_distance_is_sky() {
        let map: Map = "....\n....\n....\n....\n####".parse().unwrap();
        let cam = Camera::new(&map, Vec2::new(2.0, 0.0), Vec2::new(0.0, 1.0), FRAC_PI_2, 1.0, 3.0)
            .unwrap();
        assert_eq!(cam.column_strip(50, 100, 80), None);
    }

    #[test]
    fn depth_is_clamped_against_a_wall() {
        // standing right on the wall face
        let map: Map = "..\n##".parse().unwrap();
        let cam = Camera::new(&map, Vec2::new(0.5, 1.0), Vec2::new(0.0, 1.0), FRAC_PI_2, 1.0, 16.0)
            .unwrap();
        let strip = cam.column_strip(10, 20, 40).unwrap();
        assert_eq!(strip.depth, MIN_DEPTH);

        let mut fb = FrameBuffer::new(20, 40);
        cam.render(&mut fb);
        assert!(fb.pixels().iter().all(|&p| p != 0));
    }

    #[test]
    fn render_fills_sky_then_walls() {
        let map: Map = "....\n....\n....\n....\n####".parse().unwrap();
        let mut cam =
            Camera::new(&map, Vec2::new(2.0, 0.0), Vec2::new(0.0, 1.0), FRAC_PI_2, 1.0, 16.0)
                .unwrap();
        let sky = Rgb::new(10, 20, 30);
        cam.set_palette(sky, Rgb::new(200, 200, 200));

        let mut fb = FrameBuffer::new(16, 40);
        cam.render(&mut fb);

        // strip at depth 4 covers rows 15..25
        assert_eq!(fb.pixel(8, 0), Some(sky.pack()));
        assert_eq!(fb.pixel(8, 39), Some(sky.pack()));
        assert_eq!(fb.pixel(8, 20), Some(Rgb::new(137, 137, 137).pack()));
    }
}
