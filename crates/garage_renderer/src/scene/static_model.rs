//! Single-mesh models and the garage box

use crate::foundation::math::{Mat4, Transform, Vec3};
use crate::render::device::{acquire_or_null, GraphicsDevice, Material, MeshHandle, Vertex};

use super::bounds::Aabb;

/// One mesh with its own material and transform
#[derive(Debug, Clone)]
pub struct StaticModel {
    /// Mesh to draw
    pub mesh: MeshHandle,
    /// Material of the whole mesh
    pub material: Material,
    /// World transform
    pub transform: Transform,
    /// Bounds in mesh space
    pub bounds: Aabb,
}

impl StaticModel {
    /// Upload `vertices`/`indices` and wrap them with a default material and identity transform
    ///
    /// Allocation failures are logged and leave the model with a null mesh.
    pub fn create<D: GraphicsDevice>(device: &mut D, vertices: &[Vertex], indices: &[u32]) -> Self {
        let buffer = acquire_or_null("static model vertex buffer", device.create_vertex_buffer(vertices));
        let mesh = if buffer.is_null() {
            MeshHandle::NULL
        } else {
            acquire_or_null("static model mesh", device.create_mesh(buffer, indices))
        };

        Self {
            mesh,
            material: Material::default(),
            transform: Transform::identity(),
            bounds: Aabb::from_points(vertices.iter().map(|v| Vec3::from(v.position))).unwrap_or_default(),
        }
    }

    /// World matrix of the model
    pub fn world_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }
}

/// One face of the garage box: normal, tangent, then the four corners
type GarageFace = ([f32; 3], [f32; 3], [[f32; 3]; 4]);

/// Box faces with normals pointing inwards, as seen from inside the garage
static GARAGE_FACES: [GarageFace; 6] = [
    // bottom
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
    // top
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [[-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
    // right
    ([-1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]]),
    // left
    ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
    // front
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]]),
    // back
    ([0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
];

static FACE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// The 24 vertices of the garage box
pub fn garage_vertices() -> Vec<Vertex> {
    GARAGE_FACES
        .iter()
        .flat_map(|(normal, tangent, corners)| {
            corners
                .iter()
                .zip(FACE_UVS)
                .map(move |(corner, uv)| Vertex::new(*corner, *normal).with_surface(*tangent, uv))
        })
        .collect()
}

/// The 36 indices of the garage box, two triangles per face
pub fn garage_indices() -> Vec<u32> {
    (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect()
}

/// Build the garage: a 40 x 20 x 40 room whose floor sits at y = 0
pub fn create_garage<D: GraphicsDevice>(device: &mut D) -> StaticModel {
    let mut garage = StaticModel::create(device, &garage_vertices(), &garage_indices());
    garage.transform.scale = Vec3::new(20.0, 10.0, 20.0);
    garage.transform.position.y = garage.transform.scale.y;
    garage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use crate::render::backends::{HeadlessDevice, ResourceKind};

    #[test]
    fn test_garage_geometry() {
        let vertices = garage_vertices();
        let indices = garage_indices();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert_eq!(&indices[6..12], &[4, 5, 6, 6, 7, 4]);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn test_garage_normals_point_inwards() {
        for vertex in garage_vertices() {
            let p = Vec3::from(vertex.position);
            let n = Vec3::from(vertex.normal);
            assert!(p.dot(&n) < 0.0);
        }
    }

    #[test]
    fn test_garage_floor_at_zero() {
        let mut device = HeadlessDevice::new();
        let garage = create_garage(&mut device);
        assert!(!garage.mesh.is_null());

        let floor = garage.world_matrix().transform_point(&Point3::new(0.0, -1.0, 0.0));
        let ceiling = garage.world_matrix().transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert_eq!(floor.y, 0.0);
        assert_eq!(ceiling.y, 20.0);
    }

    #[test]
    fn test_failed_upload_leaves_null_mesh() {
        let mut device = HeadlessDevice::new();
        device.fail_allocations(ResourceKind::VertexBuffer);
        let garage = create_garage(&mut device);
        assert!(garage.mesh.is_null());
    }
}
