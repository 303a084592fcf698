//! Math utilities and types
//!
//! Provides the fundamental math types used by the model codec, the scene
//! state and the frame pipeline. All types are thin aliases over `nalgebra`.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Local transform: position, non-uniform scale and rotation
///
/// The parent relationship is not stored here. It lives in the owning
/// [`TransformTree`](crate::scene::TransformTree), which resolves world
/// matrices on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in parent space
    pub position: Vec3,

    /// Scale factors
    pub scale: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotation: Quat::identity(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (translation * rotation * scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Quat, Unit, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Rotate a vector around an axis by an angle in radians
    pub fn rotate_vector(vector: Vec3, axis: Vec3, angle_radians: f32) -> Vec3 {
        Quat::from_axis_angle(&Unit::new_normalize(axis), angle_radians) * vector
    }

    /// Component-wise minimum
    pub fn min_vec(a: Vec3, b: Vec3) -> Vec3 {
        Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
    }

    /// Component-wise maximum
    pub fn max_vec(a: Vec3, b: Vec3) -> Vec3 {
        Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
    }
}

/// Extension trait for Mat4 with the projections used by the frame pipeline
pub trait Mat4Ext {
    /// Right-handed perspective projection mapping depth to [-1, 1]
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed view matrix looking from `eye` along `direction`
    fn look_along(eye: Vec3, direction: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_along(eye: Vec3, direction: Vec3, up: Vec3) -> Mat4 {
        let eye = Point3::from(eye);
        Mat4::look_at_rh(&eye, &(eye + direction), &up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_transform_matrix() {
        assert_relative_eq!(Transform::identity().to_matrix(), Mat4::identity());
    }

    #[test]
    fn test_trs_order() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        transform.scale = Vec3::new(2.0, 2.0, 2.0);
        transform.rotation = Quat::from_axis_angle(&Vec3::y_axis(), constants::PI / 2.0);

        // Scale first, then rotate +X onto -Z, then translate
        let p = transform.to_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 0.0, -2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_look_along_maps_direction_to_negative_z() {
        let view = Mat4::look_along(Vec3::new(0.0, 10.0, 0.0), Vec3::x(), -Vec3::y());
        let p = view.transform_point(&Point3::new(5.0, 10.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, -5.0), epsilon = 1e-5);
    }
}
