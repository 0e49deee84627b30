//! Configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::camera::Camera;
use crate::error::RaycastResult;
use crate::map::Map;
use crate::surface::Rgb;
use crate::vec2::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaycastConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub motion: MotionConfig,
    pub colors: ColorConfig,
    /// Map rows, see [`Map::from_rows`].
    pub map: Vec<String>,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            motion: MotionConfig::default(),
            colors: ColorConfig::default(),
            map: default_map(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Height of the internal framebuffer; its width follows the window aspect.
    pub internal_height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Raycaster".to_string(),
            width: 960,
            height: 720,
            internal_height: 240,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f64; 2],
    pub direction: [f64; 2],
    pub fov_deg: f64,
    pub near_distance: f64,
    pub draw_distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            // middle of the western edge, looking east
            position: [0.5, 3.5],
            direction: [1.0, 0.0],
            fov_deg: 90.0,
            near_distance: 1.0,
            draw_distance: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Units per second.
    pub move_speed: f64,
    /// Radians per second.
    pub turn_speed: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            turn_speed: std::f64::consts::PI,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub sky: [u8; 3],
    pub wall: [u8; 3],
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            sky: [0, 0, 0],
            wall: [0, 0, 255],
        }
    }
}

fn default_map() -> Vec<String> {
    [
        "........",
        ".....#..",
        "........",
        "........",
        ".......#",
        "..#.....",
        "........",
        "........",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl RaycastConfig {
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = Self::from_json_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn build_map(&self) -> RaycastResult<Map> {
        Map::from_rows(&self.map)
    }

    pub fn build_camera<'m>(&self, map: &'m Map) -> RaycastResult<Camera<'m>> {
        let c = &self.camera;
        let mut camera = Camera::new(
            map,
            Vec2::new(c.position[0], c.position[1]),
            Vec2::new(c.direction[0], c.direction[1]),
            c.fov_deg.to_radians(),
            c.near_distance,
            c.draw_distance,
        )?;
        camera.set_palette(Rgb::from(self.colors.sky), Rgb::from(self.colors.wall));
        Ok(camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let cfg = RaycastConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg.map, default_map());
        assert_eq!(cfg.camera, CameraConfig::default());
        assert_eq!(cfg.window.internal_height, 240);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = RaycastConfig::from_json_str(
            r###"{
                "camera": { "fov_deg": 60.0 },
                "colors": { "wall": [255, 0, 0] },
                "map": ["##", ".."]
            }"###,
        )
        .unwrap();
        assert_eq!(cfg.camera.fov_deg, 60.0);
        assert_eq!(cfg.camera.draw_distance, 16.0);
        assert_eq!(cfg.colors.sky, [0, 0, 0]);
        assert_eq!(cfg.motion, MotionConfig::default());

        let map = cfg.build_map().unwrap();
        assert_eq!((map.width(), map.height()), (2, 2));
    }

    #[test]
    fn default_config_builds_a_scene() {
        let cfg = RaycastConfig::default();
        let map = cfg.build_map().unwrap();
        assert_eq!((map.width(), map.height()), (8, 8));
        assert!(map.is_wall(5, 1));
        assert!(map.is_wall(7, 4));
        assert!(map.is_wall(2, 5));

        let camera = cfg.build_camera(&map).unwrap();
        assert_eq!(camera.position(), Vec2::new(0.5, 3.5));
        assert_eq!(camera.draw_distance(), 16.0);
    }

    #[test]
    fn bundled_arena_scene_loads() {
        let cfg = RaycastConfig::from_json_str(include_str!("../scenes/arena.json")).unwrap();
        assert_eq!(cfg.window.internal_height, 240);
        assert_eq!(cfg.motion.move_speed, 2.5);
        assert_eq!(cfg.motion.turn_speed, std::f64::consts::PI);

        let map = cfg.build_map().unwrap();
        let camera = cfg.build_camera(&map).unwrap();
        assert!(map.passable(camera.position()));
    }

    #[test]
    fn invalid_camera_is_reported() {
        let mut cfg = RaycastConfig::default();
        cfg.camera.direction = [0.0, 0.0];
        let map = cfg.build_map().unwrap();
        assert!(cfg.build_camera(&map).is_err());
    }
}
