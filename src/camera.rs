//! Orbit + pan camera.
//!
//! The camera is parameterized by two angles and a distance around a
//! look-at target, not free 6-DOF placement. Input handlers mutate the
//! state; the render engine only ever reads a snapshot of it per frame.

use glam::{Vec3, vec3};

/// Pointer-drag angular sensitivity, radians per pixel.
const ROTATE_SENSITIVITY: f32 = 0.005;
/// Wheel zoom sensitivity per delta unit; zoom is multiplicative.
const ZOOM_SENSITIVITY: f32 = 0.001;
/// Drag-pan sensitivity per pixel, scaled by the current distance.
const PAN_SENSITIVITY: f32 = 0.002;
/// Key-pan speed in target units per second at distance 1.
const MOVE_SPEED: f32 = 1.0;
/// Keeps the pitch strictly inside (-pi/2, pi/2) to avoid gimbal flip.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 20.0;

/// Orbit camera state. Angles are radians; `distance` is the orbit
/// radius, clamped to [0.5, 20]; `pan_x`/`pan_y` offset the look-at
/// target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub angle_x: f32,
    pub angle_y: f32,
    pub distance: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            angle_x: std::f32::consts::FRAC_PI_6,
            angle_y: std::f32::consts::FRAC_PI_4,
            distance: 3.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl CameraState {
    /// The look-at point.
    pub fn target(&self) -> Vec3 {
        vec3(self.pan_x, self.pan_y, 0.0)
    }

    /// Eye position on the orbit sphere around the target.
    pub fn eye(&self) -> Vec3 {
        let (sin_x, cos_x) = self.angle_x.sin_cos();
        let (sin_y, cos_y) = self.angle_y.sin_cos();
        self.target() + self.distance * vec3(sin_y * cos_x, sin_x, cos_y * cos_x)
    }

    /// Drag-rotate from pointer deltas in pixels. Pitch is clamped so
    /// repeated drags can never flip over the pole.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.angle_y += dx * ROTATE_SENSITIVITY;
        self.angle_x = (self.angle_x - dy * ROTATE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Multiplicative wheel zoom; `delta` is in wheel delta units
    /// (positive = away, zooming out).
    pub fn zoom(&mut self, delta: f32) {
        self.distance =
            (self.distance * (1.0 + delta * ZOOM_SENSITIVITY)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Drag-pan from pointer deltas in pixels. Scaled by the current
    /// distance so panning speed feels distance-invariant.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pan_x -= dx * PAN_SENSITIVITY * self.distance;
        self.pan_y += dy * PAN_SENSITIVITY * self.distance;
    }

    /// Integrates held direction keys into the pan offset for one tick.
    ///
    /// Horizontal movement follows the camera's forward/right basis
    /// derived from the yaw alone; since the target's horizontal offset
    /// is the single `pan_x` component, only the x-projection of that
    /// basis accumulates. Up/down move the target vertically.
    pub fn integrate_keys(&mut self, keys: &MoveKeys, dt: f32) {
        if !keys.any() {
            return;
        }
        let (sin_y, cos_y) = self.angle_y.sin_cos();
        let forward = vec3(-sin_y, 0.0, -cos_y);
        let right = vec3(cos_y, 0.0, -sin_y);

        let step = MOVE_SPEED * self.distance * dt;
        let fwd = axis(keys.forward, keys.back);
        let side = axis(keys.right, keys.left);
        self.pan_x += (forward.x * fwd + right.x * side) * step;
        self.pan_y += axis(keys.up, keys.down) * step;
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    (positive as i32 - negative as i32) as f32
}

/// Which of the six discrete movement directions are currently held.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveKeys {
    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right || self.up || self.down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_clamps_below_the_pole() {
        let mut cam = CameraState::default();
        for _ in 0..10_000 {
            cam.rotate(0.0, -20.0);
        }
        assert!(cam.angle_x <= std::f32::consts::FRAC_PI_2 - 0.01);
        for _ in 0..10_000 {
            cam.rotate(0.0, 20.0);
        }
        assert!(cam.angle_x >= -(std::f32::consts::FRAC_PI_2 - 0.01));
    }

    #[test]
    fn zoom_is_multiplicative_and_clamped() {
        let mut cam = CameraState::default();
        cam.zoom(100.0);
        assert!((cam.distance - 3.0 * 1.1).abs() < 1e-5);
        for _ in 0..200 {
            cam.zoom(1000.0);
        }
        assert_eq!(cam.distance, 20.0);
        for _ in 0..200 {
            cam.zoom(-1000.0);
        }
        assert_eq!(cam.distance, 0.5);
    }

    #[test]
    fn eye_orbits_the_target() {
        let cam = CameraState {
            angle_x: 0.0,
            angle_y: 0.0,
            distance: 5.0,
            pan_x: 1.0,
            pan_y: 2.0,
        };
        let eye = cam.eye();
        assert!((eye - vec3(1.0, 2.0, 5.0)).length() < 1e-5);
        assert!((eye - cam.target()).length() - 5.0 < 1e-5);
    }

    #[test]
    fn key_pan_scales_with_distance() {
        let mut near = CameraState {
            distance: 1.0,
            ..CameraState::default()
        };
        let mut far = CameraState {
            distance: 10.0,
            ..CameraState::default()
        };
        let keys = MoveKeys {
            up: true,
            ..MoveKeys::default()
        };
        near.integrate_keys(&keys, 0.1);
        far.integrate_keys(&keys, 0.1);
        assert!((far.pan_y - 10.0 * near.pan_y).abs() < 1e-5);
    }

    #[test]
    fn horizontal_keys_follow_the_yaw_basis() {
        let mut cam = CameraState {
            angle_y: 0.0,
            distance: 1.0,
            ..CameraState::default()
        };
        // Looking down -Z: "right" is +X.
        cam.integrate_keys(
            &MoveKeys {
                right: true,
                ..MoveKeys::default()
            },
            0.5,
        );
        assert!(cam.pan_x > 0.0);
        assert_eq!(cam.pan_y, 0.0);
    }

    #[test]
    fn idle_keys_leave_the_camera_alone() {
        let mut cam = CameraState::default();
        let before = cam;
        cam.integrate_keys(&MoveKeys::default(), 0.25);
        assert_eq!(cam, before);
    }
}
