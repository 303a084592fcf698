//! Building composite models from files
//!
//! GPU allocation failures do not fail a load: they are logged and the
//! affected meshes keep null handles, which draw as nothing.

use std::path::Path;

use crate::foundation::math::Vec3;
use crate::render::device::{acquire_or_null, GraphicsDevice, Vertex};
use crate::scene::bounds::Aabb;
use crate::scene::composite_model::CompositeModel;

use super::interchange::InterchangeMesh;
use super::model_format::ModelFile;
use super::ModelFormatError;

/// Load a `.model` file
pub fn load_model<D: GraphicsDevice>(device: &mut D, path: impl AsRef<Path>) -> Result<CompositeModel, ModelFormatError> {
    let path = path.as_ref();
    let file = ModelFile::read_from_path(path)?;
    let model = model_from_file(device, &file)?;
    log::info!(
        "Loaded {}: {} sub-objects, {} materials, {} vertices",
        path.display(),
        model.num_models(),
        model.materials().len(),
        file.vertices.len()
    );
    Ok(model)
}

/// Load a `.model` file, logging the cause and returning `None` on failure
pub fn load_model_or_log<D: GraphicsDevice>(device: &mut D, path: impl AsRef<Path>) -> Option<CompositeModel> {
    let path = path.as_ref();
    match load_model(device, path) {
        Ok(model) => Some(model),
        Err(e) => {
            log::error!("Failed to load model {}: {}", path.display(), e);
            None
        }
    }
}

/// Upload decoded `.model` contents
///
/// Every object's mesh draws from one vertex buffer built from the full
/// vertex list. Objects naming a material the file does not contain are
/// rejected so every sub-object resolves to a real material.
pub fn model_from_file<D: GraphicsDevice>(device: &mut D, file: &ModelFile) -> Result<CompositeModel, ModelFormatError> {
    let vertices: Vec<Vertex> = file
        .vertices
        .iter()
        .map(|v| Vertex::new(v.position, v.normal))
        .collect();
    let vertex_buffer = acquire_or_null("model vertex buffer", device.create_vertex_buffer(&vertices));

    let mut model = CompositeModel::new(file.materials.clone(), file.bounds, vertex_buffer);
    for (i, object) in file.objects.iter().enumerate() {
        let mesh = if vertex_buffer.is_null() {
            Default::default()
        } else {
            acquire_or_null("model mesh", device.create_mesh(vertex_buffer, &object.indices))
        };

        let material_index = object.material_index as usize;
        model
            .push_sub_object(mesh, material_index, object.bounds)
            .ok_or(ModelFormatError::MaterialIndexOutOfRange {
                object: i,
                index: object.material_index,
                count: file.materials.len(),
            })?;
    }

    Ok(model)
}

/// Load an OBJ file directly, without the binary cache
///
/// One sub-object per named sub-mesh with its vertices expanded per corner.
/// A sub-mesh takes the material of its first triangle; mixed materials
/// are reported and otherwise ignored.
pub fn load_interchange_model<D: GraphicsDevice>(
    device: &mut D,
    path: impl AsRef<Path>,
) -> Result<CompositeModel, ModelFormatError> {
    let path = path.as_ref();
    let mesh = InterchangeMesh::load(path)?;

    let mut vertices = Vec::with_capacity(mesh.triangle_count() * 3);
    let mut parts = Vec::new();
    let mut materials = Vec::new();

    for sub_mesh in mesh.sub_meshes.iter().filter(|sub| !sub.triangles.is_empty()) {
        let first_material = sub_mesh.triangles[0].material;
        if sub_mesh.triangles.iter().any(|t| t.material != first_material) {
            log::warn!("Sub-mesh '{}' mixes materials; using the first", sub_mesh.name);
        }

        let start = vertices.len();
        for triangle in &sub_mesh.triangles {
            let diffuse = mesh.material(triangle.material).diffuse;
            for corner in &triangle.corners {
                let mut vertex = Vertex::new(mesh.position(corner), mesh.normal(corner));
                vertex.uv = mesh.texcoord(corner);
                vertex.color = [diffuse.x, diffuse.y, diffuse.z, 1.0];
                vertices.push(vertex);
            }
        }

        let indices = (start..vertices.len())
            .map(u32::try_from)
            .collect::<Result<Vec<u32>, _>>()
            .map_err(|_| ModelFormatError::TooLarge("vertices"))?;
        let bounds = Aabb::from_points(vertices[start..].iter().map(|v| Vec3::from(v.position))).unwrap_or_default();

        materials.push(mesh.material(first_material));
        parts.push((indices, bounds));
    }

    let bounds = Aabb::from_points(vertices.iter().map(|v| Vec3::from(v.position))).unwrap_or_default();
    let vertex_buffer = acquire_or_null("interchange vertex buffer", device.create_vertex_buffer(&vertices));
    let mut model = CompositeModel::new(materials, bounds, vertex_buffer);

    for (material_index, (indices, bounds)) in parts.into_iter().enumerate() {
        let mesh = if vertex_buffer.is_null() {
            Default::default()
        } else {
            acquire_or_null("interchange mesh", device.create_mesh(vertex_buffer, &indices))
        };
        model.push_sub_object(mesh, material_index, bounds);
    }

    log::info!("Loaded {} directly: {} sub-objects", path.display(), model.num_models());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::model_format::{ModelObject, ModelVertex, MODEL_FLAGS};
    use crate::render::backends::{HeadlessDevice, ResourceKind};
    use crate::render::device::Material;
    use tempfile::TempDir;

    fn quad() -> ModelFile {
        let normal = [0.0, 0.0, 1.0];
        let bounds = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 0.0));
        ModelFile {
            flags: MODEL_FLAGS,
            bounds,
            vertices: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]
                .into_iter()
                .map(|position| ModelVertex { position, normal })
                .collect(),
            materials: vec![Material::default()],
            objects: vec![ModelObject {
                material_index: 0,
                bounds,
                indices: vec![0, 1, 2, 2, 3, 0],
            }],
        }
    }

    #[test]
    fn test_quad_loads_one_sub_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quad.model");
        quad().write_to_path(&path).unwrap();

        let mut device = HeadlessDevice::new();
        let model = load_model(&mut device, &path).unwrap();

        assert_eq!(model.num_models(), 1);
        let mesh = model.sub_object(0).unwrap().mesh;
        let indices = device.mesh_indices(mesh).unwrap();
        assert_eq!(indices.len(), 6);

        let buffer = device.mesh_vertex_buffer(mesh).unwrap();
        assert_eq!(device.vertex_buffer(buffer).unwrap().len(), 4);
        let mut unique = indices.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique, vec![0, 1, 2, 3]);
        assert_eq!(model.parent_of(0), Some(model.root_key()));
    }

    #[test]
    fn test_objects_share_one_vertex_buffer() {
        let mut file = quad();
        file.objects.push(ModelObject {
            material_index: 0,
            bounds: file.bounds,
            indices: vec![0, 2, 3],
        });

        let mut device = HeadlessDevice::new();
        let model = model_from_file(&mut device, &file).unwrap();
        let buffers: Vec<_> = model
            .sub_objects()
            .map(|sub| device.mesh_vertex_buffer(sub.mesh).unwrap())
            .collect();
        assert_eq!(buffers[0], buffers[1]);
        assert_eq!(device.vertex_buffer_count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let mut device = HeadlessDevice::new();
        assert!(matches!(
            load_model(&mut device, "does/not/exist.model"),
            Err(ModelFormatError::Io(_))
        ));
        assert!(load_model_or_log(&mut device, "does/not/exist.model").is_none());
    }

    #[test]
    fn test_bad_material_index_rejected() {
        let mut file = quad();
        file.objects[0].material_index = 3;
        let mut device = HeadlessDevice::new();
        assert!(matches!(
            model_from_file(&mut device, &file),
            Err(ModelFormatError::MaterialIndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn test_gpu_failure_yields_null_meshes() {
        let mut device = HeadlessDevice::new();
        device.fail_allocations(ResourceKind::Mesh);
        let model = model_from_file(&mut device, &quad()).unwrap();
        assert!(model.sub_object(0).unwrap().mesh.is_null());
    }

    #[test]
    fn test_interchange_model_expands_vertices() {
        let dir = TempDir::new().unwrap();
        let obj = dir.path().join("quad.obj");
        std::fs::write(
            &obj,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\no quad\nf 1//1 2//1 3//1\nf 1//1 3//1 4//1\n",
        )
        .unwrap();

        let mut device = HeadlessDevice::new();
        let model = load_interchange_model(&mut device, &obj).unwrap();
        assert_eq!(model.num_models(), 1);
        assert_eq!(device.vertex_buffer(model.vertex_buffer()).unwrap().len(), 6);
        assert_eq!(model.materials()[0], Material::default());
        assert_eq!(model.bounds().max, Vec3::new(1.0, 1.0, 0.0));
    }
}
