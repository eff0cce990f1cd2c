use glam::{Mat4, Vec3};

/// What the frame renderer needs from a camera.
pub trait CameraView {
    fn view_matrix(&self) -> Mat4;
    fn position(&self) -> Vec3;
    /// Vertical field of view in degrees.
    fn zoom(&self) -> f32;
}

/// Keyboard-driven movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

const DEFAULT_YAW: f32 = -90.0;
const DEFAULT_PITCH: f32 = 0.0;
const DEFAULT_SPEED: f32 = 2.5;
const DEFAULT_SENSITIVITY: f32 = 0.1;
const DEFAULT_ZOOM: f32 = 45.0;
const PITCH_LIMIT: f32 = 89.0;
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;

/// Free-fly camera steered by yaw/pitch Euler angles.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Moves along the camera's own axes, `delta_time` seconds worth.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Turns by a cursor offset; positive `dy` looks up.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch = (self.pitch + dy * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Narrows the field of view on positive scroll.
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl CameraView for Camera {
    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(close(camera.front(), Vec3::NEG_Z));
        assert_eq!(camera.zoom(), 45.0);
        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(close(origin, Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn keyboard_moves_along_axes() {
        let mut camera = Camera::default();
        camera.process_keyboard(CameraMovement::Forward, 0.4);
        assert!(close(camera.position(), Vec3::new(0.0, 0.0, 2.0)));
        camera.process_keyboard(CameraMovement::Right, 0.2);
        assert!(close(camera.position(), Vec3::new(0.5, 0.0, 2.0)));
        camera.process_keyboard(CameraMovement::Left, 0.2);
        camera.process_keyboard(CameraMovement::Backward, 0.4);
        assert!(close(camera.position(), Vec3::new(0.0, 0.0, 3.0)));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 5000.0);
        assert_eq!(camera.pitch(), 89.0);
        camera.process_mouse_movement(0.0, -5000.0);
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn yaw_turns_right() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(900.0, 0.0);
        assert!((camera.yaw() - 0.0).abs() < 1e-4);
        assert!(close(camera.front(), Vec3::X));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.zoom(), 35.0);
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom(), 1.0);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom(), 45.0);
    }
}
