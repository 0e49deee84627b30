//! Column raycaster over a boolean wall grid.
//!
//! [`Camera::render`] casts one [`Ray`] per screen column through the
//! [`Map`] and draws a depth-shaded wall strip onto a [`Surface`].

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod map;
pub mod ray;
pub mod surface;
pub mod upscale;
pub mod vec2;

pub use camera::{Camera, MIN_DEPTH, WallStrip};
pub use error::{RaycastError, RaycastResult};
pub use map::Map;
pub use ray::Ray;
pub use surface::{FrameBuffer, Rgb, Surface};
pub use vec2::Vec2;
