//! Back-to-front ordering for blended geometry
//!
//! Transparent sub-objects are collected during the forward pass and drawn
//! after all opaque geometry, farthest first, so alpha blending composites
//! correctly against what is already in the color buffer.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::device::{Material, MeshHandle};

/// One transparent draw waiting to be sorted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransparentEntry {
    /// Mesh to draw
    pub mesh: MeshHandle,

    /// World matrix of the sub-object
    pub world_matrix: Mat4,

    /// Material of the sub-object
    pub material: Material,

    /// Squared distance from the camera, larger draws first
    pub depth_key: f32,
}

impl TransparentEntry {
    /// Entry keyed on the squared distance from `eye` to `center`
    pub fn new(mesh: MeshHandle, world_matrix: Mat4, material: Material, eye: Vec3, center: Vec3) -> Self {
        Self {
            mesh,
            world_matrix,
            material,
            depth_key: (center - eye).norm_squared(),
        }
    }
}

/// Transparent draws for one pass
#[derive(Debug, Default)]
pub struct TransparentQueue {
    entries: Vec<TransparentEntry>,
}

impl TransparentQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a draw
    pub fn push(&mut self, entry: TransparentEntry) {
        self.entries.push(entry);
    }

    /// Sort farthest first
    ///
    /// Uses a total order so NaN keys (degenerate transforms) cannot break the
    /// sort. Positive NaN lands at the front and negative NaN at the back.
    pub fn sort_back_to_front(&mut self) {
        self.entries.sort_by(|a, b| b.depth_key.total_cmp(&a.depth_key));
    }

    /// Queued entries in their current order
    pub fn entries(&self) -> &[TransparentEntry] {
        &self.entries
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries for the next frame
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mesh: u64, depth_key: f32) -> TransparentEntry {
        TransparentEntry {
            mesh: MeshHandle(mesh),
            world_matrix: Mat4::identity(),
            material: Material::default(),
            depth_key,
        }
    }

    #[test]
    fn test_sorted_farthest_first() {
        let mut queue = TransparentQueue::new();
        for (mesh, depth) in [(1, 4.0), (2, 1.0), (3, 9.0), (4, 2.0)] {
            queue.push(entry(mesh, depth));
        }
        queue.sort_back_to_front();

        let depths: Vec<f32> = queue.entries().iter().map(|e| e.depth_key).collect();
        assert_eq!(depths, vec![9.0, 4.0, 2.0, 1.0]);
        assert_eq!(queue.entries()[0].mesh, MeshHandle(3));
    }

    #[test]
    fn test_nan_keys_sort_to_the_ends() {
        let mut queue = TransparentQueue::new();
        for (mesh, depth) in [(1, 1.0), (2, f32::NAN), (3, 4.0), (4, -f32::NAN)] {
            queue.push(entry(mesh, depth));
        }
        queue.sort_back_to_front();

        let meshes: Vec<MeshHandle> = queue.entries().iter().map(|e| e.mesh).collect();
        assert_eq!(meshes, vec![MeshHandle(2), MeshHandle(3), MeshHandle(1), MeshHandle(4)]);
        assert!(queue.entries()[0].depth_key.is_sign_positive());
        assert!(queue.entries()[3].depth_key.is_sign_negative());
    }

    #[test]
    fn test_depth_key_is_squared_distance() {
        let e = TransparentEntry::new(
            MeshHandle(1),
            Mat4::identity(),
            Material::default(),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 4.0, 0.0),
        );
        assert_eq!(e.depth_key, 25.0);
    }

    #[test]
    fn test_clear() {
        let mut queue = TransparentQueue::new();
        queue.push(entry(1, 1.0));
        assert_eq!(queue.len(), 1);
        queue.clear();
        assert!(queue.is_empty());
    }
}
