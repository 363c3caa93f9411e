//! Free-flying camera driven by named input actions.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use instant::Duration;

use crate::{
    data_structures::scene::Bounds,
    input::{Action, InputIntent},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Largest pitch magnitude; keeps forward from lining up with `up`.
pub const SAFE_FRAC_PI_2: f32 = std::f32::consts::FRAC_PI_2 - 0.1;

const LOOK_AT_EPSILON: f32 = 1e-10;

/// Right-handed look-at that degrades to the identity when `eye` and
/// `target` coincide or the view direction is parallel to `up`.
pub fn look_at(eye: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let dir = target - eye;
    if dir.magnitude2() < LOOK_AT_EPSILON || dir.cross(up).magnitude2() < LOOK_AT_EPSILON {
        return Matrix4::identity();
    }
    Matrix4::look_at_rh(eye, target, up)
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
            yaw: yaw.into(),
            pitch: Rad(0.0),
        };
        camera.set_pitch(pitch.into());
        camera.target = camera.position + camera.forward();
        camera
    }

    pub fn yaw(&self) -> Rad<f32> {
        self.yaw
    }

    pub fn pitch(&self) -> Rad<f32> {
        self.pitch
    }

    fn set_pitch(&mut self, pitch: Rad<f32>) {
        self.pitch = Rad(pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
    }

    /// Unit view direction from yaw and pitch.
    pub fn forward(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let dir = Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw);
        dir.normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.forward().cross(self.up).normalize()
    }

    /// Turns the camera toward `point`.
    pub fn look_toward(&mut self, point: Point3<f32>) {
        let dir = point - self.position;
        if dir.magnitude2() < LOOK_AT_EPSILON {
            return;
        }
        let dir = dir.normalize();
        self.yaw = Rad(dir.z.atan2(dir.x));
        self.set_pitch(Rad(dir.y.asin()));
        self.target = self.position + self.forward();
    }

    /// Places the camera above and in front of `bounds`, looking at its center.
    pub fn frame(&mut self, bounds: &Bounds) {
        let center = Point3::from(bounds.center());
        let extent = bounds.extent();
        self.position = center + Vector3::new(0.0, extent * 0.5, extent * 1.5);
        self.look_toward(center);
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        look_at(self.position, self.target, self.up)
    }
}

pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(
        width: u32,
        height: u32,
        fovy: F,
        znear: f32,
        zfar: f32,
    ) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[derive(Debug)]
pub struct CameraController {
    pub move_speed: f32,
    /// Radians per second.
    pub look_speed: f32,
}

impl CameraController {
    pub fn new(move_speed: f32, look_speed: f32) -> Self {
        Self {
            move_speed,
            look_speed,
        }
    }

    /// Moves speed with the scene so large and small assets feel the same.
    pub fn scale_to(&mut self, bounds: &Bounds) {
        let extent = bounds.extent();
        if extent > 0.0 {
            self.move_speed = extent * 0.5;
        }
    }

    pub fn update_camera(&self, camera: &mut Camera, input: &impl InputIntent, dt: Duration) {
        let dt = dt.as_secs_f32();
        let axis = |positive: Action, negative: Action| -> f32 {
            let mut value = 0.0;
            if input.is_action_active(positive) {
                value += 1.0;
            }
            if input.is_action_active(negative) {
                value -= 1.0;
            }
            value
        };

        let turn = self.look_speed * dt;
        camera.yaw += Rad(axis(Action::RotateRight, Action::RotateLeft) * turn);
        let pitch = camera.pitch + Rad(axis(Action::RotateUp, Action::RotateDown) * turn);
        camera.set_pitch(pitch);

        let forward = camera.forward();
        let right = camera.right();
        let step = self.move_speed * dt;
        camera.position += forward * axis(Action::MoveForward, Action::MoveBackward) * step;
        camera.position += right * axis(Action::MoveRight, Action::MoveLeft) * step;
        // vertical movement ignores where the camera looks
        camera.position += camera.up * axis(Action::MoveUp, Action::MoveDown) * step;

        camera.target = camera.position + forward;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }

    pub fn view_proj(&self) -> [[f32; 4]; 4] {
        self.view_proj
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use cgmath::{Deg, EuclideanSpace};

    use super::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    fn held(actions: &[Action]) -> HashSet<Action> {
        actions.iter().copied().collect()
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn zero_angles_look_down_positive_x() {
        let camera = Camera::new((0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        assert!(close(camera.forward(), Vector3::unit_x()));
        assert!(close(camera.right(), Vector3::unit_z()));
        assert_eq!(camera.target, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new((0.0, 0.0, 0.0), Rad(0.0), Deg(120.0));
        assert_eq!(camera.pitch(), Rad(SAFE_FRAC_PI_2));

        let controller = CameraController::new(1.0, 10.0);
        let down = held(&[Action::RotateDown]);
        controller.update_camera(&mut camera, &down, ms(1000));
        assert_eq!(camera.pitch(), Rad(-SAFE_FRAC_PI_2));
        assert!(camera.calc_matrix().x.x.is_finite());
        assert_ne!(camera.calc_matrix(), Matrix4::identity());
    }

    #[test]
    fn pitch_limit_stays_a_tenth_short_of_vertical() {
        let limit = std::f32::consts::FRAC_PI_2 - SAFE_FRAC_PI_2;
        assert!((limit - 0.1).abs() < 1e-6);
    }

    #[test]
    fn wasd_moves_along_view_axes() {
        let mut camera = Camera::new((0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        let controller = CameraController::new(10.0, 2.0);

        let forward = held(&[Action::MoveForward]);
        controller.update_camera(&mut camera, &forward, ms(500));
        assert!(close(camera.position.to_vec(), Vector3::new(5.0, 0.0, 0.0)));

        let right = held(&[Action::MoveRight]);
        controller.update_camera(&mut camera, &right, ms(100));
        assert!(close(camera.position.to_vec(), Vector3::new(5.0, 0.0, 1.0)));

        // opposite actions cancel
        let both = held(&[Action::MoveLeft, Action::MoveRight]);
        controller.update_camera(&mut camera, &both, ms(1000));
        assert!(close(camera.position.to_vec(), Vector3::new(5.0, 0.0, 1.0)));
    }

    #[test]
    fn vertical_moves_ignore_pitch() {
        let mut camera = Camera::new((1.0, 2.0, 3.0), Rad(0.3), Rad(0.8));
        let controller = CameraController::new(4.0, 2.0);
        let down = held(&[Action::MoveDown]);
        controller.update_camera(&mut camera, &down, ms(250));
        assert!(close(camera.position.to_vec(), Vector3::new(1.0, 1.0, 3.0)));
    }

    #[test]
    fn target_follows_position() {
        let mut camera = Camera::new((0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        let controller = CameraController::new(10.0, 2.0);
        let input = held(&[Action::RotateLeft, Action::MoveUp]);
        controller.update_camera(&mut camera, &input, ms(200));
        assert!(close(camera.target - camera.position, camera.forward()));
        assert!((camera.yaw().0 + 0.4).abs() < 1e-6);
    }

    #[test]
    fn degenerate_look_at_is_identity() {
        let eye = Point3::new(1.0, 1.0, 1.0);
        let up = Vector3::unit_y();
        assert_eq!(look_at(eye, eye, up), Matrix4::identity());

        let above = Point3::new(1.0, 5.0, 1.0);
        assert_eq!(look_at(eye, above, up), Matrix4::identity());

        let ahead = Point3::new(2.0, 1.0, 1.0);
        assert_ne!(look_at(eye, ahead, up), Matrix4::identity());
    }

    #[test]
    fn framing_looks_at_scene_center() {
        let bounds = Bounds {
            min: [-1.0, 0.0, -1.0],
            max: [1.0, 2.0, 1.0],
        };
        let mut camera = Camera::new((0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        camera.frame(&bounds);
        assert_eq!(camera.position, Point3::new(0.0, 2.0, 3.0));

        let to_center = Point3::new(0.0, 1.0, 0.0) - camera.position;
        assert!(close(camera.forward(), to_center.normalize()));

        let mut controller = CameraController::new(10.0, 2.0);
        controller.scale_to(&bounds);
        assert_eq!(controller.move_speed, 1.0);
    }

    #[test]
    fn uniform_carries_eye_position() {
        let camera = Camera::new((1.0, 2.0, 3.0), Rad(0.0), Rad(0.0));
        let projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);
        assert_eq!(uniform.view_position, [1.0, 2.0, 3.0, 1.0]);

        let matrix = uniform.view_proj();
        assert!(matrix.iter().flatten().all(|v| v.is_finite()));
    }
}
