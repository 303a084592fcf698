//! Composite models
//!
//! A composite model is one root transform plus N sub-objects. Each
//! sub-object has its own mesh, local transform (parented to the root),
//! material index and local-space bounds. Moving or rotating the root moves
//! every sub-object.

use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::math::{Mat4, Transform, Vec3};
use crate::render::device::{BufferHandle, Material, MeshHandle};

use super::bounds::Aabb;
use super::transform_tree::{TransformKey, TransformTree};

/// One drawable part of a [`CompositeModel`]
#[derive(Debug, Clone, Copy, PartialEq)]
struct SubObject {
    /// Index list drawing from the model's shared vertex buffer
    mesh: MeshHandle,
    /// Local transform node, parented to the model root
    transform: TransformKey,
    /// Index into the model's materials
    material_index: usize,
    /// Bounds in mesh space
    bounds: Aabb,
}

/// Resolved view of one sub-object, ready to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubObjectView {
    /// Mesh to draw
    pub mesh: MeshHandle,
    /// Material, resolved from the sub-object's index
    pub material: Material,
    /// Full world matrix including the model root
    pub world_matrix: Mat4,
    /// Bounds in mesh space
    pub bounds: Aabb,
}

/// Root transform plus N sub-meshes with their own transforms, materials and bounds
#[derive(Debug)]
pub struct CompositeModel {
    transforms: TransformTree,
    root: TransformKey,
    materials: Arc<[Material]>,
    sub_objects: Vec<SubObject>,
    bounds: Aabb,
    vertex_buffer: BufferHandle,
}

impl CompositeModel {
    /// Create a model with no sub-objects
    ///
    /// `bounds` is the aggregate box of every vertex, in model space.
    pub fn new(materials: Vec<Material>, bounds: Aabb, vertex_buffer: BufferHandle) -> Self {
        let mut transforms = TransformTree::new();
        let root = transforms.insert(Transform::identity(), None);
        Self {
            transforms,
            root,
            materials: materials.into(),
            sub_objects: Vec::new(),
            bounds,
            vertex_buffer,
        }
    }

    /// Append a sub-object with an identity local transform parented to the root
    ///
    /// Returns the new sub-object's index, or `None` if `material_index` does
    /// not name one of the model's materials.
    pub fn push_sub_object(&mut self, mesh: MeshHandle, material_index: usize, bounds: Aabb) -> Option<usize> {
        if material_index >= self.materials.len() {
            return None;
        }
        let transform = self.transforms.insert(Transform::identity(), Some(self.root));
        self.sub_objects.push(SubObject {
            mesh,
            transform,
            material_index,
            bounds,
        });
        Some(self.sub_objects.len() - 1)
    }

    /// Number of sub-objects
    pub fn num_models(&self) -> usize {
        self.sub_objects.len()
    }

    /// Deduplicated materials shared by the sub-objects
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Vertex buffer every sub-object mesh draws from
    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    /// Aggregate bounds in model space
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Key of the root transform node
    pub fn root_key(&self) -> TransformKey {
        self.root
    }

    /// The transform tree holding the root and every local transform
    pub fn transforms(&self) -> &TransformTree {
        &self.transforms
    }

    /// Root transform
    pub fn root_transform(&self) -> &Transform {
        &self.transforms[self.root]
    }

    /// Mutable root transform
    pub fn root_transform_mut(&mut self) -> &mut Transform {
        &mut self.transforms[self.root]
    }

    /// Local transform of sub-object `index`
    pub fn local_transform(&self, index: usize) -> Option<&Transform> {
        let key = self.sub_objects.get(index)?.transform;
        self.transforms.local(key)
    }

    /// Mutable local transform of sub-object `index`
    pub fn local_transform_mut(&mut self, index: usize) -> Option<&mut Transform> {
        let key = self.sub_objects.get(index)?.transform;
        self.transforms.local_mut(key)
    }

    /// Parent node of sub-object `index`
    pub fn parent_of(&self, index: usize) -> Option<TransformKey> {
        let key = self.sub_objects.get(index)?.transform;
        self.transforms.parent(key)
    }

    /// World matrix of sub-object `index`
    pub fn world_matrix(&self, index: usize) -> Option<Mat4> {
        let key = self.sub_objects.get(index)?.transform;
        Some(self.transforms.world_matrix(key))
    }

    /// Resolved view of sub-object `index`
    pub fn sub_object(&self, index: usize) -> Option<SubObjectView> {
        let sub = self.sub_objects.get(index)?;
        Some(SubObjectView {
            mesh: sub.mesh,
            material: self.materials.get(sub.material_index).copied().unwrap_or_default(),
            world_matrix: self.transforms.world_matrix(sub.transform),
            bounds: sub.bounds,
        })
    }

    /// Resolved views of every sub-object, in file order
    pub fn sub_objects(&self) -> impl Iterator<Item = SubObjectView> + '_ {
        (0..self.sub_objects.len()).filter_map(move |i| self.sub_object(i))
    }

    /// World-space centre of the aggregate bounds under the root transform
    pub fn center(&self) -> Vec3 {
        self.bounds
            .transformed_center(&self.transforms.world_matrix(self.root))
    }

    /// Deep copy with its own transform hierarchy
    ///
    /// The root and every sub-object node are copied into a fresh tree (root
    /// first, then sub-objects in order) and parent links are re-pointed to
    /// the copies, so sub-objects of the duplicate hang off the duplicate's
    /// root. Meshes, the vertex buffer and materials stay shared.
    pub fn duplicate(&self) -> Self {
        let mut transforms = TransformTree::new();
        let mut remap: HashMap<TransformKey, TransformKey> = HashMap::new();

        let root = transforms.insert(*self.root_transform(), None);
        remap.insert(self.root, root);
        for sub in &self.sub_objects {
            let local = self.transforms.local(sub.transform).copied().unwrap_or_default();
            remap.entry(sub.transform).or_insert_with(|| transforms.insert(local, None));
        }
        for (old, new) in &remap {
            let parent = self
                .transforms
                .parent(*old)
                .and_then(|parent| remap.get(&parent).copied());
            transforms.set_parent(*new, parent);
        }

        let sub_objects = self
            .sub_objects
            .iter()
            .map(|sub| SubObject {
                transform: remap.get(&sub.transform).copied().unwrap_or(root),
                ..*sub
            })
            .collect();

        Self {
            transforms,
            root,
            materials: Arc::clone(&self.materials),
            sub_objects,
            bounds: self.bounds,
            vertex_buffer: self.vertex_buffer,
        }
    }
}

impl Clone for CompositeModel {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    fn model_with(n: usize) -> CompositeModel {
        let mut model = CompositeModel::new(vec![Material::default()], unit_box(), BufferHandle(1));
        for i in 0..n {
            model.push_sub_object(MeshHandle(i as u64 + 2), 0, unit_box()).unwrap();
        }
        model
    }

    #[test]
    fn test_sub_objects_parented_to_root() {
        let model = model_with(3);
        assert_eq!(model.num_models(), 3);
        for i in 0..3 {
            assert_eq!(model.parent_of(i), Some(model.root_key()));
        }
    }

    #[test]
    fn test_invalid_material_index_rejected() {
        let mut model = model_with(0);
        assert!(model.push_sub_object(MeshHandle(9), 1, unit_box()).is_none());
        assert_eq!(model.num_models(), 0);
    }

    #[test]
    fn test_root_moves_children() {
        let mut model = model_with(1);
        model.root_transform_mut().position = Vec3::new(0.0, 3.0, 0.0);
        let p = model.world_matrix(0).unwrap().transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(0.0, 3.0, 0.0));
    }

    /// Model whose root is the last node of its tree, so a fresh tree hands out different keys
    fn model_with_root_last(n: usize) -> CompositeModel {
        let mut transforms = TransformTree::new();
        let children: Vec<TransformKey> = (0..n).map(|_| transforms.insert(Transform::identity(), None)).collect();
        let root = transforms.insert(Transform::identity(), None);
        for &child in &children {
            transforms.set_parent(child, Some(root));
        }

        CompositeModel {
            transforms,
            root,
            materials: Arc::from(vec![Material::default()]),
            sub_objects: children
                .iter()
                .enumerate()
                .map(|(i, &transform)| SubObject {
                    mesh: MeshHandle(i as u64 + 2),
                    transform,
                    material_index: 0,
                    bounds: unit_box(),
                })
                .collect(),
            bounds: unit_box(),
            vertex_buffer: BufferHandle(1),
        }
    }

    #[test]
    fn test_duplicate_reparents_to_own_root() {
        let original = model_with_root_last(4);
        let mut copy = original.duplicate();

        assert_eq!(copy.num_models(), 4);
        assert_eq!(copy.transforms().len(), 5);
        assert_ne!(copy.root_key(), original.root_key());
        for i in 0..4 {
            let parent = copy.parent_of(i).unwrap();
            assert_eq!(parent, copy.root_key());
            assert_ne!(parent, original.root_key());
            assert_eq!(original.parent_of(i), Some(original.root_key()));
        }

        // Moving the copy's root must move only the copy's sub-objects
        copy.root_transform_mut().position.x = 8.0;
        for i in 0..4 {
            let moved = copy.world_matrix(i).unwrap().transform_point(&Point3::origin());
            let still = original.world_matrix(i).unwrap().transform_point(&Point3::origin());
            assert_relative_eq!(moved, Point3::new(8.0, 0.0, 0.0));
            assert_relative_eq!(still, Point3::origin());
        }
    }

    #[test]
    fn test_duplicate_keeps_local_transforms_and_shares_meshes() {
        let mut original = model_with(2);
        original.local_transform_mut(1).unwrap().position.y = 2.0;
        let copy = original.clone();

        assert_eq!(copy.local_transform(1).unwrap().position.y, 2.0);
        assert_eq!(copy.sub_object(0).unwrap().mesh, original.sub_object(0).unwrap().mesh);
        assert!(std::ptr::eq(copy.materials().as_ptr(), original.materials().as_ptr()));
    }

    #[test]
    fn test_center_follows_root() {
        let mut model = CompositeModel::new(
            vec![Material::default()],
            Aabb::new(Vec3::zeros(), Vec3::new(2.0, 4.0, 2.0)),
            BufferHandle(1),
        );
        assert_relative_eq!(model.center(), Vec3::new(1.0, 2.0, 1.0));

        model.root_transform_mut().scale = Vec3::new(5.0, 5.0, 5.0);
        model.root_transform_mut().position = Vec3::new(-8.0, 9.0, -10.0);
        assert_relative_eq!(model.center(), Vec3::new(-3.0, 19.0, -5.0));
    }
}
