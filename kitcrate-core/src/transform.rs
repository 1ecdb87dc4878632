//! Local transforms for scene nodes

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Translation plus an XYZ-ordered Euler rotation
///
/// The composed matrix is `T * Rx * Ry * Rz`, so a node rotates about its own
/// origin before being placed in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub position: Vector3<f32>,
    /// Euler angles in radians
    pub rotation: Vector3<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
        }
    }

    /// Create a translation transformation
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            rotation: Vector3::zeros(),
        }
    }

    /// Builder-style rotation about the local Z axis
    pub fn with_rotation_z(mut self, angle: f32) -> Self {
        self.rotation.z = angle;
        self
    }

    /// Set the X and Y Euler angles, leaving Z untouched
    pub fn set_rotation_xy(&mut self, x: f32, y: f32) {
        self.rotation.x = x;
        self.rotation.y = y;
    }

    /// Homogeneous matrix for this transform
    pub fn matrix(&self) -> Matrix4<f32> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), self.rotation.x);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation.y);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), self.rotation.z);
        let rotation = (rx * ry * rz).to_homogeneous();
        Matrix4::new_translation(&self.position) * rotation
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        self.matrix().transform_point(point)
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_matrix() {
        assert_eq!(Transform3D::identity().matrix(), Matrix4::identity());
    }

    #[test]
    fn test_rotate_then_translate() {
        let t = Transform3D::translation(1.0, 2.0, 0.0).with_rotation_z(FRAC_PI_2);
        let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_xy_rotation_keeps_z() {
        let mut t = Transform3D::identity().with_rotation_z(0.5);
        t.set_rotation_xy(0.1, 0.2);
        assert_eq!(t.rotation, Vector3::new(0.1, 0.2, 0.5));
    }
}
