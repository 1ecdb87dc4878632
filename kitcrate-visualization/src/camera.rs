//! Perspective camera for the preview scene

use kitcrate_gpu::opengl_to_wgpu;
use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

/// A camera looking at `target` from `position`
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Match the aspect ratio to a viewport; zero sizes leave it unchanged
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect_ratio = width as f32 / height as f32;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Projection with depth mapped to 0..1
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        opengl_to_wgpu() * perspective.to_homogeneous()
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 8.0),
            Point3::origin(),
            Vector3::y(),
            45f32.to_radians(),
            1.0,
            0.1,
            1000.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera() {
        let camera = Camera::default();
        assert_relative_eq!(camera.position, Point3::new(0.0, 0.0, 8.0));
        assert_relative_eq!(camera.fov, std::f32::consts::FRAC_PI_4);
        assert_eq!((camera.near, camera.far), (0.1, 1000.0));
    }

    #[test]
    fn test_origin_projects_to_center() {
        let mut camera = Camera::default();
        camera.set_aspect(1280, 720);
        let clip = camera.view_projection().transform_point(&Point3::origin());
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-6);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn test_aspect_ignores_zero_size() {
        let mut camera = Camera::default();
        camera.set_aspect(800, 400);
        assert_relative_eq!(camera.aspect_ratio, 2.0);
        camera.set_aspect(0, 400);
        assert_relative_eq!(camera.aspect_ratio, 2.0);
    }
}
