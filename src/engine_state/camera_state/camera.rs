//! # Orbit Camera Implementation
//!
//! This module contains the spherical-coordinate orbit camera shared by the
//! 3D renderer and the picking code:
//! - Camera representation (look-at target plus spherical offset)
//! - Projection matrix handling
//! - GPU uniform buffer layout
//!
//! ## Key Components
//! - `OrbitCamera`: target point and (radius, theta, phi) spherical state
//! - `Projection`: perspective projection settings
//! - `CameraUniform`: packed data structure for shaders, carrying the
//!   inverse view-projection used for picking rays

use cgmath::*;
use std::f32::consts::{FRAC_PI_4, PI};

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU's NDC range is [0, 1] in Z where OpenGL's is [-1, 1]; this matrix
/// rescales and translates Z accordingly.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Default orbit radius after a reset.
pub const DEFAULT_RADIUS: f32 = 20.0;
/// Default azimuth after a reset.
pub const DEFAULT_THETA: f32 = FRAC_PI_4;
/// Default polar angle after a reset.
pub const DEFAULT_PHI: f32 = FRAC_PI_4;
/// Closest the camera may zoom toward the target.
pub const MIN_DISTANCE: f32 = 5.0;
/// Farthest the camera may zoom away from the target.
pub const MAX_DISTANCE: f32 = 50.0;
/// Polar clamp keeping the camera off the poles.
pub const PHI_MIN: f32 = 0.1;
/// Polar clamp keeping the camera off the poles.
pub const PHI_MAX: f32 = PI - 0.1;

/// An orbiting camera described by a look-at target and spherical
/// coordinates relative to it.
///
/// The eye position is always derived from `(radius, theta, phi)` around
/// `target`; panning moves the target, so subsequent orbiting revolves
/// around the panned point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    /// The look-at target the camera revolves around.
    pub target: Point3<f32>,
    /// Distance from the target, clamped to [`MIN_DISTANCE`, `MAX_DISTANCE`].
    pub radius: f32,
    /// Azimuth angle in radians.
    pub theta: f32,
    /// Polar angle in radians, clamped to ([`PHI_MIN`], [`PHI_MAX`]).
    pub phi: f32,
}

impl OrbitCamera {
    /// Creates a camera at the deterministic reset pose: target at the
    /// origin, spherical coordinates (20, pi/4, pi/4).
    pub fn new() -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.0),
            radius: DEFAULT_RADIUS,
            theta: DEFAULT_THETA,
            phi: DEFAULT_PHI,
        }
    }

    /// Returns the camera to the reset pose regardless of prior state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The derived eye position in world space.
    pub fn position(&self) -> Point3<f32> {
        let offset = Vector3::new(
            self.radius * self.phi.sin() * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * self.phi.sin() * self.theta.cos(),
        );
        self.target + offset
    }

    /// Applies an orbit delta: theta decreases with the horizontal delta,
    /// phi increases with the vertical delta and is clamped away from the
    /// poles to prevent gimbal flip.
    pub fn rotate(&mut self, delta_theta: f32, delta_phi: f32) {
        self.theta -= delta_theta;
        self.phi = (self.phi + delta_phi).clamp(PHI_MIN, PHI_MAX);
    }

    /// Translates the target along the camera's current right/up basis.
    ///
    /// Only the target moves; the eye follows through the spherical
    /// derivation, so the orbit center pans with the view.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let (right, up) = self.basis();
        self.target += right * -delta_x + up * delta_y;
    }

    /// Zooms by moving the radius proportionally to its current value,
    /// clamped to the distance limits.
    pub fn zoom(&mut self, amount: f32) {
        self.radius = (self.radius + amount * self.radius).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Sets the radius directly, clamped to the distance limits.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Moves the target along the camera's forward direction.
    pub fn move_forward(&mut self, distance: f32) {
        let forward = (self.target - self.position()).normalize();
        self.target += forward * distance;
    }

    /// Moves the target along the camera's right direction.
    pub fn move_right(&mut self, distance: f32) {
        let (right, _) = self.basis();
        self.target += right * distance;
    }

    /// Moves the target vertically in world space.
    pub fn move_up(&mut self, distance: f32) {
        self.target.y += distance;
    }

    /// Calculates the view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }

    /// The camera's right and up basis vectors in world space.
    fn basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward).normalize();
        (right, up)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// This handles the perspective projection used to render the 3D scene,
/// managing the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    /// Creates a new projection for a viewport of the given pixel size.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    /// Calculates the projection matrix, including the OpenGL-to-WGPU
    /// coordinate transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// GPU-friendly representation of camera data for shaders.
///
/// The inverse view-projection is carried alongside the forward matrix so
/// picking can unproject pointer coordinates without recomputing it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view_proj_inverse: [[f32; 4]; 4],
    position: [f32; 4],
}

impl CameraUniform {
    /// Creates a new camera uniform with identity matrices and zero position.
    pub fn new() -> Self {
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
            view_proj_inverse: cgmath::Matrix4::identity().into(),
            position: [0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Updates the matrices and position from the current camera state.
    ///
    /// # Arguments
    /// * `camera` - The orbit camera to read the view matrix from
    /// * `projection` - The projection to combine with
    pub fn update_view_proj_and_pos(&mut self, camera: &OrbitCamera, projection: &Projection) {
        let view_proj = projection.calc_matrix() * camera.calc_matrix();
        self.view_proj = view_proj.into();
        self.view_proj_inverse = view_proj
            .invert()
            .unwrap_or_else(Matrix4::identity)
            .into();
        let pos: [f32; 3] = camera.position().into();
        self.position = [pos[0], pos[1], pos[2], 0.0];
    }

    /// The inverse view-projection matrix, used to build picking rays.
    pub fn view_proj_inverse(&self) -> Matrix4<f32> {
        self.view_proj_inverse.into()
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn position_derives_from_spherical_state() {
        let camera = OrbitCamera::new();
        let position = camera.position();
        let distance = (position - camera.target).magnitude();
        assert_relative_eq!(distance, DEFAULT_RADIUS, epsilon = 1e-4);
    }

    #[test]
    fn phi_clamps_at_poles() {
        let mut camera = OrbitCamera::new();
        camera.rotate(0.0, 10.0);
        assert_relative_eq!(camera.phi, PHI_MAX);
        camera.rotate(0.0, -20.0);
        assert_relative_eq!(camera.phi, PHI_MIN);
    }

    #[test]
    fn zoom_clamps_radius() {
        let mut camera = OrbitCamera::new();
        camera.zoom(100.0);
        assert_relative_eq!(camera.radius, MAX_DISTANCE);
        camera.zoom(-100.0);
        assert_relative_eq!(camera.radius, MIN_DISTANCE);
    }

    #[test]
    fn pan_moves_target_not_radius() {
        let mut camera = OrbitCamera::new();
        let before = camera.radius;
        camera.pan(3.0, -2.0);
        assert_relative_eq!(camera.radius, before);
        assert!(camera.target != Point3::new(0.0, 0.0, 0.0));
    }
}
