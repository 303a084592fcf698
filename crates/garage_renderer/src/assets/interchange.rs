//! Interchange (Wavefront OBJ) meshes
//!
//! [`InterchangeMesh`] is the parsed, format-neutral view of an OBJ file the
//! converter and the direct loader work from: global attribute arrays, the
//! material library, and named sub-meshes made of triangles whose corners
//! index into the attribute arrays.

use std::path::Path;

use crate::render::device::Material;

use super::ModelFormatError;

/// Material reference meaning "no material"
pub const NO_MATERIAL: i32 = -1;

/// One triangle corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    /// Index into [`InterchangeMesh::positions`]
    pub position: u32,
    /// Index into [`InterchangeMesh::normals`], if the file has normals
    pub normal: Option<u32>,
    /// Index into [`InterchangeMesh::texcoords`], if the file has texture coordinates
    pub texcoord: Option<u32>,
}

/// A triangle with its material reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Corners in winding order
    pub corners: [Corner; 3],
    /// Index into [`InterchangeMesh::materials`] or [`NO_MATERIAL`]
    pub material: i32,
}

/// A named group of triangles (an OBJ object or group)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubMesh {
    /// Name as written in the file
    pub name: String,
    /// Triangles in file order
    pub triangles: Vec<Triangle>,
}

/// Parsed interchange mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterchangeMesh {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates
    pub texcoords: Vec<[f32; 2]>,
    /// Material library
    pub materials: Vec<Material>,
    /// Named sub-meshes in file order
    pub sub_meshes: Vec<SubMesh>,
}

impl InterchangeMesh {
    /// Parse an OBJ file (and its MTL library, if any)
    ///
    /// Faces are triangulated. A missing or broken material library is logged
    /// and every face falls back to [`NO_MATERIAL`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelFormatError> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: false,
            ..Default::default()
        };
        let (models, materials) = tobj::load_obj(path, &options)
            .map_err(|e| ModelFormatError::Parse(format!("{}: {}", path.display(), e)))?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("No usable material library for {}: {}", path.display(), e);
            Vec::new()
        });

        let mut mesh = Self {
            materials: materials.iter().map(convert_material).collect(),
            ..Default::default()
        };
        for model in &models {
            mesh.append_model(model);
        }

        if mesh.triangle_count() == 0 {
            return Err(ModelFormatError::EmptyMesh(path.display().to_string()));
        }

        log::debug!(
            "Parsed {}: {} positions, {} normals, {} materials, {} sub-meshes, {} triangles",
            path.display(),
            mesh.positions.len(),
            mesh.normals.len(),
            mesh.materials.len(),
            mesh.sub_meshes.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Total number of triangles across all sub-meshes
    pub fn triangle_count(&self) -> usize {
        self.sub_meshes.iter().map(|sub| sub.triangles.len()).sum()
    }

    /// Position referenced by a corner; out-of-range references read as the origin
    pub fn position(&self, corner: &Corner) -> [f32; 3] {
        self.positions.get(corner.position as usize).copied().unwrap_or([0.0; 3])
    }

    /// Normal referenced by a corner; absent or out-of-range references read as zero
    pub fn normal(&self, corner: &Corner) -> [f32; 3] {
        corner
            .normal
            .and_then(|i| self.normals.get(i as usize).copied())
            .unwrap_or([0.0; 3])
    }

    /// Texture coordinate referenced by a corner
    pub fn texcoord(&self, corner: &Corner) -> [f32; 2] {
        corner
            .texcoord
            .and_then(|i| self.texcoords.get(i as usize).copied())
            .unwrap_or([0.0; 2])
    }

    /// Material referenced by a triangle; [`NO_MATERIAL`] and dangling ids give the default
    pub fn material(&self, id: i32) -> Material {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.materials.get(i).copied())
            .unwrap_or_default()
    }

    /// Append one tobj model, re-basing its attribute indices onto the global arrays
    ///
    /// tobj starts a new model whenever the material changes inside a group;
    /// consecutive models with the same name are folded back into one sub-mesh.
    fn append_model(&mut self, model: &tobj::Model) {
        let mesh = &model.mesh;
        let position_base = self.positions.len() as u32;
        let normal_base = self.normals.len() as u32;
        let texcoord_base = self.texcoords.len() as u32;

        self.positions
            .extend(mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));
        self.normals
            .extend(mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
        self.texcoords
            .extend(mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]));

        let material = mesh
            .material_id
            .and_then(|id| i32::try_from(id).ok())
            .unwrap_or(NO_MATERIAL);

        let corner = |i: usize| Corner {
            position: position_base + mesh.indices[i],
            normal: mesh.normal_indices.get(i).map(|n| normal_base + n),
            texcoord: mesh.texcoord_indices.get(i).map(|t| texcoord_base + t),
        };
        let triangles = (0..mesh.indices.len() / 3).map(|t| Triangle {
            corners: [corner(3 * t), corner(3 * t + 1), corner(3 * t + 2)],
            material,
        });

        match self.sub_meshes.last_mut() {
            Some(last) if last.name == model.name => last.triangles.extend(triangles),
            _ => self.sub_meshes.push(SubMesh {
                name: model.name.clone(),
                triangles: triangles.collect(),
            }),
        }
    }
}

/// Missing MTL fields take the values of the default material
fn convert_material(material: &tobj::Material) -> Material {
    let fallback = Material::default();
    Material {
        ambient: material.ambient.map_or(fallback.ambient, Into::into),
        diffuse: material.diffuse.map_or(fallback.diffuse, Into::into),
        specular: material.specular.map_or(fallback.specular, Into::into),
        specular_exponent: material.shininess.unwrap_or(fallback.specular_exponent),
        alpha: material.dissolve.unwrap_or(fallback.alpha),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_groups_split_by_material_are_merged() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "two.mtl",
            "newmtl red\nKd 1 0 0\nd 0.5\nnewmtl blue\nKd 0 0 1\n",
        );
        let obj = write(
            &dir,
            "two.obj",
            "mtllib two.mtl\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vn 0 0 1\n\
             o body\n\
             usemtl red\nf 1//1 2//1 3//1\n\
             usemtl blue\nf 1//1 3//1 4//1\n",
        );

        let mesh = InterchangeMesh::load(&obj).unwrap();
        assert_eq!(mesh.sub_meshes.len(), 1);
        assert_eq!(mesh.sub_meshes[0].name, "body");
        assert_eq!(mesh.triangle_count(), 2);

        let [first, second] = [mesh.sub_meshes[0].triangles[0], mesh.sub_meshes[0].triangles[1]];
        assert_ne!(first.material, second.material);
        assert_eq!(mesh.material(first.material).alpha, 0.5);
        assert_eq!(mesh.normal(&first.corners[0]), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_faces_without_material() {
        let dir = TempDir::new().unwrap();
        let obj = write(&dir, "bare.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");

        let mesh = InterchangeMesh::load(&obj).unwrap();
        let triangle = mesh.sub_meshes[0].triangles[0];
        assert_eq!(triangle.material, NO_MATERIAL);
        assert_eq!(mesh.material(triangle.material), Material::default());
        assert_eq!(mesh.normal(&triangle.corners[1]), [0.0; 3]);
        assert_eq!(mesh.position(&triangle.corners[1]), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let obj = write(&dir, "empty.obj", "# nothing here\n");
        assert!(matches!(InterchangeMesh::load(&obj), Err(ModelFormatError::EmptyMesh(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            InterchangeMesh::load("does/not/exist.obj"),
            Err(ModelFormatError::Parse(_))
        ));
    }
}
