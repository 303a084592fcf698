//! Axis-aligned bounding boxes

use crate::foundation::math::{utils, Mat4, Point3, Vec3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros())
    }
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |aabb, p| {
            Self::new(utils::min_vec(aabb.min, p), utils::max_vec(aabb.max, p))
        }))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners, min corner first
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Centre of the box after applying `matrix`
    pub fn transformed_center(&self, matrix: &Mat4) -> Vec3 {
        matrix.transform_point(&Point3::from(self.center())).coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let aabb = Aabb::from_points([
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.0),
            Vec3::new(0.5, 0.0, 5.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 5.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, 1.0, 2.5));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_corners_span_the_box() {
        let aabb = Aabb::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 3.0, 4.0));
        let corners = aabb.corners();
        assert_eq!(corners[0], aabb.min);
        assert_eq!(corners[7], aabb.max);
        assert_eq!(Aabb::from_points(corners), Some(aabb));
        for (i, a) in corners.iter().enumerate() {
            assert!(corners[i + 1..].iter().all(|b| a != b));
        }
    }

    #[test]
    fn test_transformed_center() {
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        let matrix = Mat4::new_translation(&Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(aabb.transformed_center(&matrix), Vec3::new(11.0, 1.0, 1.0));
    }
}
