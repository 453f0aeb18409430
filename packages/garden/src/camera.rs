//! Orbiting garden camera and pointer ray casting.
//!
//! The camera drifts on a slow ellipse around the valley while always looking
//! at a fixed point above the river. Projection follows wgpu conventions
//! (right-handed, depth 0..1).

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Point the camera always looks at.
pub const LOOK_TARGET: Vec3 = Vec3::new(0.0, 3.0, -18.0);
pub const ORBIT_RADIUS: f32 = 26.0;
pub const FOV_DEGREES: f32 = 60.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 400.0;

// ============================================================================
// Camera
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: LOOK_TARGET,
            up: Vec3::Y,
            fov: FOV_DEGREES,
            near: NEAR,
            far: FAR,
            aspect,
        };
        camera.orbit(0.0);
        camera
    }

    /// Move the camera to its orbit position at `t` seconds.
    pub fn orbit(&mut self, t: f32) {
        self.position = Vec3::new(
            (t * 0.06).sin() * ORBIT_RADIUS,
            5.0 + (t * 0.05).sin() * 1.2,
            6.0 + (t * 0.06).cos() * ORBIT_RADIUS,
        );
        self.target = LOOK_TARGET;
    }

    /// Update the aspect ratio from a viewport size. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Compute the camera's actual up vector (may differ from world up).
    pub fn camera_up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    /// Ray from the eye through a pixel. `(0, 0)` is the top-left corner.
    pub fn screen_ray(&self, x: f32, y: f32, width: f32, height: f32) -> Option<Ray> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let ndc_x = (x / width) * 2.0 - 1.0;
        let ndc_y = -(y / height) * 2.0 + 1.0;

        let inverse = self.view_projection_matrix().inverse();
        let far = inverse * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        if far.w.abs() < f32::EPSILON {
            return None;
        }
        let far = far.truncate() / far.w;
        let direction = (far - self.position).try_normalize()?;
        Some(Ray {
            origin: self.position,
            direction,
        })
    }

    pub fn uniforms(&self) -> CameraUniforms {
        let pos = self.position;
        let right = self.right();
        let up = self.camera_up();
        CameraUniforms {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            position: [pos.x, pos.y, pos.z, 1.0],
            right: [right.x, right.y, right.z, 0.0],
            up: [up.x, up.y, up.z, 0.0],
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

// ============================================================================
// Ray
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Intersection with the horizontal plane `y = height`.
    ///
    /// `None` when the ray is parallel to the plane or points away from it.
    pub fn intersect_horizontal(&self, height: f32) -> Option<Vec3> {
        let denom = self.direction.y;
        if denom.abs() < 1e-6 {
            return None;
        }
        let distance = (height - self.origin.y) / denom;
        if distance < 0.0 {
            return None;
        }
        Some(self.origin + self.direction * distance)
    }

    /// Intersection with the ground plane `y = 0`.
    pub fn intersect_ground(&self) -> Option<Vec3> {
        self.intersect_horizontal(0.0)
    }
}

// ============================================================================
// GPU Uniforms
// ============================================================================

/// Camera data for shaders. Total size: 112 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world space (w = 1).
    pub position: [f32; 4],
    /// Camera right vector for billboards (w unused).
    pub right: [f32; 4],
    /// Camera up vector for billboards (w unused).
    pub up: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_size() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 112);
    }

    #[test]
    fn test_orbit_start_position() {
        let camera = Camera::new(1.0);
        assert!(camera.position.distance(Vec3::new(0.0, 5.0, 32.0)) < 1e-5);
        assert_eq!(camera.target, LOOK_TARGET);
    }

    #[test]
    fn test_orbit_keeps_radius() {
        let mut camera = Camera::new(1.0);
        for t in [3.0, 40.0, 250.0] {
            camera.orbit(t);
            let flat = Vec3::new(camera.position.x, 0.0, camera.position.z - 6.0);
            assert!((flat.length() - ORBIT_RADIUS).abs() < 1e-3);
            assert!(camera.position.y >= 3.8 && camera.position.y <= 6.2);
        }
    }

    #[test]
    fn test_center_ray_hits_ground_ahead() {
        let camera = Camera::new(16.0 / 9.0);
        let ray = camera.screen_ray(640.0, 360.0, 1280.0, 720.0).unwrap();
        let hit = ray.intersect_ground().unwrap();
        assert!(hit.y.abs() < 1e-4);
        // Along the view axis: (0, 5, 32) toward (0, 3, -18) drops 2 per 50, so y = 0 at z = -93
        assert!(hit.x.abs() < 1e-2);
        assert!((hit.z + 93.0).abs() < 0.1);
    }

    #[test]
    fn test_upward_ray_misses_ground() {
        let ray = Ray {
            origin: Vec3::new(0.0, 5.0, 0.0),
            direction: Vec3::Y,
        };
        assert!(ray.intersect_ground().is_none());

        let parallel = Ray {
            origin: Vec3::new(0.0, 5.0, 0.0),
            direction: Vec3::X,
        };
        assert!(parallel.intersect_ground().is_none());
    }

    #[test]
    fn test_top_of_screen_ray_looks_up() {
        let camera = Camera::new(1.0);
        let ray = camera.screen_ray(0.0, 0.0, 800.0, 800.0).unwrap();
        let center = camera.screen_ray(400.0, 400.0, 800.0, 800.0).unwrap();
        assert!(ray.direction.y > center.direction.y);
    }

    #[test]
    fn test_viewport_ignores_zero_size() {
        let mut camera = Camera::new(2.0);
        camera.set_viewport(0, 600);
        assert_eq!(camera.aspect, 2.0);
        camera.set_viewport(800, 400);
        assert_eq!(camera.aspect, 2.0);
        camera.set_viewport(300, 600);
        assert_eq!(camera.aspect, 0.5);
    }
}
