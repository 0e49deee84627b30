//! Held-key state and the per-frame camera step.

use std::collections::HashSet;

use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::config::MotionConfig;

/// Snapshot of the movement keys held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl InputState {
    /// WASD to move, Q/E or the arrow keys to turn.
    pub fn from_keys(keys: &HashSet<KeyCode>) -> Self {
        let held = |codes: &[KeyCode]| codes.iter().any(|c| keys.contains(c));
        Self {
            forward: held(&[KeyCode::KeyW, KeyCode::ArrowUp]),
            back: held(&[KeyCode::KeyS, KeyCode::ArrowDown]),
            strafe_left: held(&[KeyCode::KeyA]),
            strafe_right: held(&[KeyCode::KeyD]),
            turn_left: held(&[KeyCode::KeyQ, KeyCode::ArrowLeft]),
            turn_right: held(&[KeyCode::KeyE, KeyCode::ArrowRight]),
        }
    }

    fn axis(neg: bool, pos: bool) -> f64 {
        (pos as i8 - neg as i8) as f64
    }
}

/// Advances `camera` by `dt` seconds of held input.
///
/// Forward and strafe are applied as separate moves, and a move is dropped
/// when it would end inside a wall.
pub fn step(camera: &mut Camera<'_>, input: &InputState, dt: f64, motion: &MotionConfig) {
    // turning left is counter-clockwise
    let turn = InputState::axis(input.turn_right, input.turn_left);
    if turn != 0.0 {
        camera.rotate(turn * motion.turn_speed * dt);
    }

    let mut fwd = InputState::axis(input.back, input.forward);
    let mut strafe = InputState::axis(input.strafe_left, input.strafe_right);
    if fwd == 0.0 && strafe == 0.0 {
        return;
    }

    // Normalize diagonal speed
    let inv = 1.0 / (fwd * fwd + strafe * strafe).sqrt();
    fwd *= inv * motion.move_speed * dt;
    strafe *= inv * motion.move_speed * dt;

    let map = camera.map();
    if fwd != 0.0 && map.passable(camera.position() + fwd * camera.z_unit()) {
        camera.move_z(fwd);
    }
    if strafe != 0.0 && map.passable(camera.position() + strafe * camera.x_unit()) {
        camera.move_x(strafe);
    }
}
