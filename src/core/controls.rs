//! Camera controls
//!
//! Two implementations behind one capability: damped orbit controls when the
//! host supports them, and a basic drag/zoom fallback otherwise. The variant is
//! chosen once at construction.

use crate::core::camera::Camera;
use crate::core::config::{CameraConfig, OrbitConfig};
use crate::core::types::Vec3;

/// Camera controls selected at construction time.
#[derive(Clone, Debug)]
pub enum Controls {
    Orbit(OrbitControls),
    Basic(BasicControls),
}

impl Controls {
    /// Pick the control scheme for the host's capabilities.
    pub fn select(advanced_available: bool, camera: &CameraConfig, orbit: &OrbitConfig) -> Self {
        if advanced_available {
            log::info!("Orbit controls enabled");
            Controls::Orbit(OrbitControls::new(camera.target, orbit.clone()))
        } else {
            log::warn!("Orbit controls unavailable, falling back to basic controls");
            Controls::Basic(BasicControls::new(camera.target))
        }
    }

    /// Pointer dragged by `(dx, dy)` pixels with the button held.
    pub fn on_drag(&mut self, camera: &mut Camera, dx: f32, dy: f32) {
        match self {
            Controls::Orbit(c) => c.rotate(dx, dy),
            Controls::Basic(c) => c.drag(camera, dx, dy),
        }
    }

    /// Wheel scrolled; positive `delta_y` zooms out.
    pub fn on_wheel(&mut self, camera: &mut Camera, delta_y: f32) {
        match self {
            Controls::Orbit(c) => c.zoom(delta_y),
            Controls::Basic(c) => c.zoom(camera, delta_y),
        }
    }

    /// Per-frame update.
    pub fn update(&mut self, camera: &mut Camera) {
        if let Controls::Orbit(c) = self {
            c.update(camera);
        }
    }

    pub fn is_orbit(&self) -> bool {
        matches!(self, Controls::Orbit(_))
    }
}

/// Damped orbit around a target with distance and polar-angle limits.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    config: OrbitConfig,
    /// Pending azimuth change (radians)
    theta_delta: f32,
    /// Pending polar change (radians)
    phi_delta: f32,
    /// Pending distance multiplier
    scale: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3, config: OrbitConfig) -> Self {
        Self {
            target,
            config,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
        }
    }

    /// Queue a rotation from a pointer drag.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.theta_delta -= dx * self.config.rotate_speed;
        self.phi_delta -= dy * self.config.rotate_speed;
    }

    /// Queue a zoom step.
    pub fn zoom(&mut self, delta_y: f32) {
        if delta_y > 0.0 {
            self.scale *= 1.1;
        } else if delta_y < 0.0 {
            self.scale /= 1.1;
        }
    }

    /// Apply pending motion to the camera, keeping it within limits.
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.position - self.target;
        let radius = offset.length().max(1e-4);
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let damping = self.config.damping_factor;
        if damping > 0.0 {
            theta += self.theta_delta * damping;
            phi += self.phi_delta * damping;
        } else {
            theta += self.theta_delta;
            phi += self.phi_delta;
        }

        phi = phi.clamp(self.config.min_polar_angle, self.config.max_polar_angle);
        let radius = (radius * self.scale).clamp(self.config.min_distance, self.config.max_distance);

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.look_at(self.target);

        if damping > 0.0 {
            self.theta_delta *= 1.0 - damping;
            self.phi_delta *= 1.0 - damping;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
        }
        self.scale = 1.0;
    }
}

/// Fallback controls: drag pans the camera, the wheel scales its distance from
/// the origin.
#[derive(Clone, Debug)]
pub struct BasicControls {
    pub target: Vec3,
}

impl BasicControls {
    pub fn new(target: Vec3) -> Self {
        Self { target }
    }

    pub fn drag(&mut self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.position.x += dx * 0.01;
        camera.position.y -= dy * 0.01;
        camera.look_at(self.target);
    }

    pub fn zoom(&mut self, camera: &mut Camera, delta_y: f32) {
        let factor = if delta_y > 0.0 { 1.1 } else { 0.9 };
        camera.position *= factor;
    }
}
