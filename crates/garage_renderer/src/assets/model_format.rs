//! Binary `.model` files
//!
//! A precomputed cache of an OBJ mesh that loads without parsing text. All
//! fields are little-endian, 32-bit and unpadded:
//!
//! ```text
//! u32 flags                          always 3 (positions | normals)
//! u32 vertex count
//! u32 material count
//! u32 object count
//! f32[3] min, f32[3] max             whole-model bounds
//! vertex count x   { f32[3] position, f32[3] normal }
//! material count x { f32[3] ambient, f32[3] diffuse, f32[3] specular,
//!                    f32 specular exponent, f32 alpha }
//! object count x   { u32 material index, f32[3] min, f32[3] max,
//!                    u32 index count, u32[index count] indices }
//! ```

use std::io::{Read, Write};
use std::path::Path;

use crate::foundation::math::Vec3;
use crate::render::device::Material;
use crate::scene::bounds::Aabb;

use super::ModelFormatError;

/// Vertex records carry a position
pub const FLAG_HAS_POSITION: u32 = 1 << 0;

/// Vertex records carry a normal
pub const FLAG_HAS_NORMAL: u32 = 1 << 1;

/// The only flag combination ever written; ignored on read
pub const MODEL_FLAGS: u32 = FLAG_HAS_POSITION | FLAG_HAS_NORMAL;

/// One deduplicated vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelVertex {
    /// Position
    pub position: [f32; 3],
    /// Normal
    pub normal: [f32; 3],
}

/// One drawable object: a material and a triangle list
#[derive(Debug, Clone, PartialEq)]
pub struct ModelObject {
    /// Index into [`ModelFile::materials`]
    pub material_index: u32,
    /// Bounds of the referenced vertices
    pub bounds: Aabb,
    /// Triangle list into [`ModelFile::vertices`]
    pub indices: Vec<u32>,
}

/// Decoded contents of a `.model` file
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFile {
    /// Header flags as read; always [`MODEL_FLAGS`] when written by this crate
    pub flags: u32,
    /// Bounds of every vertex
    pub bounds: Aabb,
    /// Shared vertex list
    pub vertices: Vec<ModelVertex>,
    /// Deduplicated materials
    pub materials: Vec<Material>,
    /// Objects in file order
    pub objects: Vec<ModelObject>,
}

impl ModelFile {
    /// Read and decode a file
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self, ModelFormatError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&mut bytes.as_slice())
    }

    /// Encode and write a file in one write, so a failed encode leaves nothing behind
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), ModelFormatError> {
        let bytes = self.encode()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Encode to bytes
    pub fn encode(&self) -> Result<Vec<u8>, ModelFormatError> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Exact size of the encoded file
    pub fn encoded_len(&self) -> usize {
        let header = 4 * 4 + 6 * 4;
        let vertices = self.vertices.len() * 6 * 4;
        let materials = self.materials.len() * 11 * 4;
        let objects: usize = self
            .objects
            .iter()
            .map(|object| 4 + 6 * 4 + 4 + object.indices.len() * 4)
            .sum();
        header + vertices + materials + objects
    }

    /// Encode into `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), ModelFormatError> {
        write_u32(writer, self.flags)?;
        write_u32(writer, count(self.vertices.len(), "vertices")?)?;
        write_u32(writer, count(self.materials.len(), "materials")?)?;
        write_u32(writer, count(self.objects.len(), "objects")?)?;
        write_aabb(writer, &self.bounds)?;

        for vertex in &self.vertices {
            write_f32s(writer, &vertex.position)?;
            write_f32s(writer, &vertex.normal)?;
        }

        for material in &self.materials {
            write_vec3(writer, &material.ambient)?;
            write_vec3(writer, &material.diffuse)?;
            write_vec3(writer, &material.specular)?;
            write_f32s(writer, &[material.specular_exponent, material.alpha])?;
        }

        for object in &self.objects {
            write_u32(writer, object.material_index)?;
            write_aabb(writer, &object.bounds)?;
            write_u32(writer, count(object.indices.len(), "indices")?)?;
            for &index in &object.indices {
                write_u32(writer, index)?;
            }
        }

        Ok(())
    }

    /// Decode from `reader`
    ///
    /// Counts and indices are taken as written; running out of bytes is an
    /// error, but material and vertex indices are not range-checked here.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self, ModelFormatError> {
        let flags = read_u32(reader)?;
        if flags != MODEL_FLAGS {
            log::debug!("Ignoring unexpected .model flags {:#x}", flags);
        }
        let vertex_count = read_u32(reader)? as usize;
        let material_count = read_u32(reader)? as usize;
        let object_count = read_u32(reader)? as usize;
        let bounds = read_aabb(reader)?;

        let mut vertices = Vec::with_capacity(vertex_count.min(PREALLOCATION_LIMIT));
        for _ in 0..vertex_count {
            vertices.push(ModelVertex {
                position: read_f32s(reader)?,
                normal: read_f32s(reader)?,
            });
        }

        let mut materials = Vec::with_capacity(material_count.min(PREALLOCATION_LIMIT));
        for _ in 0..material_count {
            let ambient = read_vec3(reader)?;
            let diffuse = read_vec3(reader)?;
            let specular = read_vec3(reader)?;
            let [specular_exponent, alpha] = read_f32s(reader)?;
            materials.push(Material {
                ambient,
                diffuse,
                specular,
                specular_exponent,
                alpha,
            });
        }

        let mut objects = Vec::with_capacity(object_count.min(PREALLOCATION_LIMIT));
        for _ in 0..object_count {
            let material_index = read_u32(reader)?;
            let bounds = read_aabb(reader)?;
            let index_count = read_u32(reader)? as usize;
            let mut indices = Vec::with_capacity(index_count.min(PREALLOCATION_LIMIT));
            for _ in 0..index_count {
                indices.push(read_u32(reader)?);
            }
            objects.push(ModelObject {
                material_index,
                bounds,
                indices,
            });
        }

        Ok(Self {
            flags,
            bounds,
            vertices,
            materials,
            objects,
        })
    }
}

/// Counts read from a file are untrusted; never reserve more than this up front
const PREALLOCATION_LIMIT: usize = 1 << 16;

fn count(len: usize, what: &'static str) -> Result<u32, ModelFormatError> {
    u32::try_from(len).map_err(|_| ModelFormatError::TooLarge(what))
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<(), ModelFormatError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32s<W: Write>(writer: &mut W, values: &[f32]) -> Result<(), ModelFormatError> {
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

fn write_vec3<W: Write>(writer: &mut W, value: &Vec3) -> Result<(), ModelFormatError> {
    write_f32s(writer, value.as_slice())
}

fn write_aabb<W: Write>(writer: &mut W, aabb: &Aabb) -> Result<(), ModelFormatError> {
    write_vec3(writer, &aabb.min)?;
    write_vec3(writer, &aabb.max)
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, ModelFormatError> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_f32s<R: Read, const N: usize>(reader: &mut R) -> Result<[f32; N], ModelFormatError> {
    let mut values = [0.0f32; N];
    for value in &mut values {
        let mut bytes = [0u8; 4];
        reader.read_exact(&mut bytes)?;
        *value = f32::from_le_bytes(bytes);
    }
    Ok(values)
}

fn read_vec3<R: Read>(reader: &mut R) -> Result<Vec3, ModelFormatError> {
    read_f32s::<R, 3>(reader).map(Vec3::from)
}

fn read_aabb<R: Read>(reader: &mut R) -> Result<Aabb, ModelFormatError> {
    Ok(Aabb::new(read_vec3(reader)?, read_vec3(reader)?))
}
