//! OBJ to `.model` conversion
//!
//! Vertices are deduplicated on the exact bytes of (position, normal) and
//! keep first-seen order. Materials are deduplicated on their OBJ material
//! id, with faces that have no material sharing the default material.
//! Triangles are then split into one output object per (sub-mesh, material)
//! pair, in the order the pairs are first met.

use std::collections::HashMap;
use std::path::Path;

use crate::foundation::math::Vec3;
use crate::scene::bounds::Aabb;

use super::interchange::InterchangeMesh;
use super::model_format::{ModelFile, ModelObject, ModelVertex, MODEL_FLAGS};
use super::ModelFormatError;

/// Parse `obj_path` and write the binary cache to `out_path`
///
/// The output is encoded completely in memory before anything is written, so
/// a parse or encode failure never leaves a partial file behind.
pub fn convert(obj_path: impl AsRef<Path>, out_path: impl AsRef<Path>) -> Result<ModelFile, ModelFormatError> {
    let (obj_path, out_path) = (obj_path.as_ref(), out_path.as_ref());
    let mesh = InterchangeMesh::load(obj_path)?;
    let file = build_model_file(&mesh)?;
    file.write_to_path(out_path)?;

    log::info!(
        "Converted {} -> {}: {} vertices, {} materials, {} objects",
        obj_path.display(),
        out_path.display(),
        file.vertices.len(),
        file.materials.len(),
        file.objects.len()
    );
    Ok(file)
}

/// Deduplicate and partition an interchange mesh into `.model` contents
pub fn build_model_file(mesh: &InterchangeMesh) -> Result<ModelFile, ModelFormatError> {
    let mut vertices: Vec<ModelVertex> = Vec::new();
    let mut vertex_map: HashMap<[u8; 24], u32> = HashMap::new();
    let mut materials = Vec::new();
    let mut material_map: HashMap<i32, u32> = HashMap::new();
    let mut objects = Vec::new();

    for sub_mesh in &mesh.sub_meshes {
        // (material id, output material index, vertex indices) in encounter order
        let mut groups: Vec<(i32, u32, Vec<u32>)> = Vec::new();

        for triangle in &sub_mesh.triangles {
            let material_index = match material_map.get(&triangle.material) {
                Some(&index) => index,
                None => {
                    let index = u32::try_from(materials.len()).map_err(|_| ModelFormatError::TooLarge("materials"))?;
                    materials.push(mesh.material(triangle.material));
                    material_map.insert(triangle.material, index);
                    index
                }
            };

            let group = match groups.iter().position(|(id, _, _)| *id == triangle.material) {
                Some(position) => position,
                None => {
                    groups.push((triangle.material, material_index, Vec::new()));
                    groups.len() - 1
                }
            };

            for corner in &triangle.corners {
                let vertex = ModelVertex {
                    position: mesh.position(corner),
                    normal: mesh.normal(corner),
                };
                let key: [u8; 24] = bytemuck::cast([vertex.position, vertex.normal]);
                let index = match vertex_map.get(&key) {
                    Some(&index) => index,
                    None => {
                        let index = u32::try_from(vertices.len()).map_err(|_| ModelFormatError::TooLarge("vertices"))?;
                        vertices.push(vertex);
                        vertex_map.insert(key, index);
                        index
                    }
                };
                groups[group].2.push(index);
            }
        }

        for (_, material_index, indices) in groups {
            let bounds = bounds_of(indices.iter().map(|&i| &vertices[i as usize]));
            objects.push(ModelObject {
                material_index,
                bounds,
                indices,
            });
        }
    }

    if vertices.is_empty() {
        return Err(ModelFormatError::EmptyMesh("interchange mesh has no triangles".to_string()));
    }

    Ok(ModelFile {
        flags: MODEL_FLAGS,
        bounds: bounds_of(vertices.iter()),
        vertices,
        materials,
        objects,
    })
}

fn bounds_of<'a>(vertices: impl Iterator<Item = &'a ModelVertex>) -> Aabb {
    Aabb::from_points(vertices.map(|v| Vec3::from(v.position))).unwrap_or_default()
}
