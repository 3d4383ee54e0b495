/// First-person free camera driven by mouse-look and held movement keys
use bitflags::bitflags;
use log::trace;
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::CameraSettings;
use crate::uniforms::{FrameUniforms, UniformSink};

bitflags! {
    /// Movement keys currently held down
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MovementKeys: u8 {
        const FORWARD = 0b0_0001;
        const BACKWARD = 0b0_0010;
        const LEFT = 0b0_0100;
        const RIGHT = 0b0_1000;
        const UP = 0b1_0000;
    }
}

/// A single movement key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
}

impl From<Movement> for MovementKeys {
    fn from(movement: Movement) -> Self {
        match movement {
            Movement::Forward => MovementKeys::FORWARD,
            Movement::Backward => MovementKeys::BACKWARD,
            Movement::Left => MovementKeys::LEFT,
            Movement::Right => MovementKeys::RIGHT,
            Movement::Up => MovementKeys::UP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input state owned by the camera between events and frames
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    pub held: MovementKeys,
    /// Look button is down
    pub looking: bool,
    /// Last cursor sample, tracked even while not looking
    pub last_cursor: Option<(f64, f64)>,
}

/// Free camera: position and orientation both follow input directly
#[derive(Debug, Clone)]
pub struct FreeCamera {
    position: Point3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    /// Degrees
    yaw: f32,
    /// Degrees, within the configured pitch limit
    pitch: f32,
    settings: CameraSettings,
    input: CameraInput,
    view: Matrix4<f32>,
    uniform_name: String,
}

impl FreeCamera {
    pub const LOOK_BUTTON: MouseButton = MouseButton::Left;

    pub fn new(
        position: Point3<f32>,
        front: Vector3<f32>,
        up: Vector3<f32>,
        settings: CameraSettings,
    ) -> Self {
        let front = front.try_normalize(f32::EPSILON).unwrap_or(-Vector3::z());
        let yaw = front.z.atan2(front.x).to_degrees();
        let pitch = front
            .y
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
            .clamp(-settings.pitch_limit, settings.pitch_limit);

        let mut camera = Self {
            position,
            front,
            up,
            yaw,
            pitch,
            settings,
            input: CameraInput::default(),
            view: Matrix4::identity(),
            uniform_name: FrameUniforms::VIEW.to_owned(),
        };
        camera.view = camera.compute_view();
        camera
    }

    /// Publish under a different uniform name than `"camera"`.
    pub fn with_uniform_name(mut self, name: impl Into<String>) -> Self {
        self.uniform_name = name.into();
        self
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn input(&self) -> &CameraInput {
        &self.input
    }

    /// View matrix as of the last `reset`.
    pub fn view_matrix(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn mouse_pressed(&mut self, button: MouseButton) {
        if button == Self::LOOK_BUTTON {
            self.input.looking = true;
        }
    }

    pub fn mouse_released(&mut self, button: MouseButton) {
        if button == Self::LOOK_BUTTON {
            self.input.looking = false;
        }
    }

    /// Feed a cursor sample. Only turns the camera while the look button is held,
    /// but always remembers the sample so the next drag starts without a jump.
    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        let Some((last_x, last_y)) = self.input.last_cursor.replace((x, y)) else {
            return;
        };
        if !self.input.looking {
            return;
        }

        // Screen y grows downward
        let dx = (x - last_x) as f32 * self.settings.sensitivity;
        let dy = (last_y - y) as f32 * self.settings.sensitivity;
        self.look(dx, dy);
    }

    /// Turn by yaw/pitch deltas in degrees.
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        let limit = self.settings.pitch_limit;
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-limit, limit);
        self.front = front_from_angles(self.yaw, self.pitch);
        trace!("look yaw={:.2} pitch={:.2}", self.yaw, self.pitch);
    }

    pub fn key_pressed(&mut self, movement: Movement) {
        self.input.held.insert(movement.into());
    }

    pub fn key_released(&mut self, movement: Movement) {
        self.input.held.remove(movement.into());
    }

    /// Drop every held movement key, e.g. on focus loss.
    pub fn release_all(&mut self) {
        self.input.held = MovementKeys::empty();
    }

    /// Apply one frame of held-key movement. Held keys add up, so forward plus
    /// right moves diagonally.
    pub fn update(&mut self) {
        let held = self.input.held;
        if held.is_empty() {
            return;
        }

        let right = self
            .front
            .cross(&self.up)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        let mut direction = Vector3::zeros();
        if held.contains(MovementKeys::FORWARD) {
            direction += self.front;
        }
        if held.contains(MovementKeys::BACKWARD) {
            direction -= self.front;
        }
        if held.contains(MovementKeys::RIGHT) {
            direction += right;
        }
        if held.contains(MovementKeys::LEFT) {
            direction -= right;
        }
        if held.contains(MovementKeys::UP) {
            direction += self.up;
        }

        self.position += direction * self.settings.speed;
    }

    /// Recompute the view matrix and publish it. Call once per frame, after all
    /// input for the frame has been applied.
    pub fn reset<S: UniformSink + ?Sized>(&mut self, sink: &mut S) -> &Matrix4<f32> {
        self.view = self.compute_view();
        sink.set_matrix(&self.uniform_name, &self.view);
        &self.view
    }

    fn compute_view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &(self.position + self.front), &self.up)
    }
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 3.0),
            -Vector3::z(),
            Vector3::y(),
            CameraSettings::default(),
        )
    }
}

/// Spherical to Cartesian, angles in degrees.
fn front_from_angles(yaw: f32, pitch: f32) -> Vector3<f32> {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    Vector3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn test_angles_from_initial_front() {
        let camera = FreeCamera::default();
        assert!((camera.yaw() + 90.0).abs() < 1e-4);
        assert!(camera.pitch().abs() < 1e-4);
        assert!(approx(camera.front(), -Vector3::z()));
    }

    #[test]
    fn test_first_drag_does_not_jump() {
        let mut camera = FreeCamera::default();
        camera.cursor_moved(500.0, 300.0);
        camera.mouse_pressed(MouseButton::Left);
        camera.cursor_moved(500.0, 300.0);
        assert!(approx(camera.front(), -Vector3::z()));
    }

    #[test]
    fn test_cursor_ignored_without_button() {
        let mut camera = FreeCamera::default();
        camera.cursor_moved(0.0, 0.0);
        camera.cursor_moved(100.0, 100.0);
        assert!(approx(camera.front(), -Vector3::z()));
        assert_eq!(camera.input().last_cursor, Some((100.0, 100.0)));

        camera.mouse_pressed(MouseButton::Right);
        camera.cursor_moved(200.0, 100.0);
        assert!(approx(camera.front(), -Vector3::z()));
    }

    #[test]
    fn test_drag_turns_by_sensitivity() {
        let mut camera = FreeCamera::default();
        camera.cursor_moved(0.0, 0.0);
        camera.mouse_pressed(MouseButton::Left);
        // 900 px right at 0.1 deg/px is 90 degrees of yaw
        camera.cursor_moved(900.0, 0.0);
        assert!(camera.yaw().abs() < 1e-3);
        assert!(approx(camera.front(), Vector3::x()));

        camera.mouse_released(MouseButton::Left);
        camera.cursor_moved(0.0, 0.0);
        assert!(approx(camera.front(), Vector3::x()));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = FreeCamera::default();
        camera.cursor_moved(0.0, 0.0);
        camera.mouse_pressed(MouseButton::Left);
        for step in 1..=20 {
            camera.cursor_moved(0.0, -100.0 * step as f64);
            assert!(camera.pitch() <= 89.0);
        }
        assert_eq!(camera.pitch(), 89.0);
        assert!((camera.front().y - 89f32.to_radians().sin()).abs() < 1e-5);

        camera.look(0.0, -500.0);
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn test_held_keys_move_every_frame() {
        let mut camera = FreeCamera::default();
        camera.key_pressed(Movement::Forward);
        camera.update();
        camera.update();
        assert!((camera.position() - Point3::new(0.0, 0.0, 2.9)).norm() < 1e-5);

        camera.key_released(Movement::Forward);
        camera.update();
        assert!((camera.position() - Point3::new(0.0, 0.0, 2.9)).norm() < 1e-5);
    }

    #[test]
    fn test_held_keys_compose() {
        let mut camera = FreeCamera::default();
        camera.key_pressed(Movement::Forward);
        camera.key_pressed(Movement::Right);
        camera.key_pressed(Movement::Up);
        camera.update();
        // front (0,0,-1) x up (0,1,0) = (1,0,0)
        assert!((camera.position() - Point3::new(0.05, 0.05, 2.95)).norm() < 1e-5);

        camera.release_all();
        camera.key_pressed(Movement::Left);
        camera.key_pressed(Movement::Backward);
        camera.update();
        assert!((camera.position() - Point3::new(0.0, 0.05, 3.0)).norm() < 1e-5);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut camera = FreeCamera::default();
        camera.key_pressed(Movement::Left);
        camera.key_pressed(Movement::Right);
        camera.update();
        assert_eq!(camera.position(), Point3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_reset_publishes_view() {
        let mut camera = FreeCamera::default();
        let mut frame = FrameUniforms::default();
        camera.key_pressed(Movement::Forward);
        camera.update();

        let view = *camera.reset(&mut frame);
        assert_eq!(frame.view, view);

        // The eye maps to the view-space origin
        let eye = view.transform_point(&camera.position());
        assert!(eye.coords.norm() < 1e-5);
        // A point straight ahead lands on -Z
        let ahead = view.transform_point(&(camera.position() + camera.front()));
        assert!((ahead.coords - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_view_is_stale_until_reset() {
        let mut camera = FreeCamera::default();
        let before = *camera.view_matrix();
        camera.key_pressed(Movement::Up);
        camera.update();
        assert_eq!(*camera.view_matrix(), before);

        let mut sink: std::collections::HashMap<String, Matrix4<f32>> =
            std::collections::HashMap::new();
        camera.reset(&mut sink);
        assert_ne!(*camera.view_matrix(), before);
        assert!(sink.contains_key("camera"));
    }

    #[test]
    fn test_custom_uniform_name() {
        let mut camera = FreeCamera::default().with_uniform_name("view");
        let mut sink: std::collections::HashMap<String, Matrix4<f32>> =
            std::collections::HashMap::new();
        camera.reset(&mut sink);
        assert!(sink.contains_key("view"));
    }
}
