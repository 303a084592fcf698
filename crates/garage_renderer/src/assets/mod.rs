//! Model assets
//!
//! OBJ parsing, the offline OBJ to `.model` converter, the `.model` codec and
//! the loaders that turn either format into a [`CompositeModel`].
//!
//! [`CompositeModel`]: crate::scene::CompositeModel

pub mod converter;
pub mod interchange;
pub mod loader;
pub mod model_format;

pub use converter::{build_model_file, convert};
pub use interchange::InterchangeMesh;
pub use loader::{load_interchange_model, load_model, load_model_or_log, model_from_file};
pub use model_format::{ModelFile, ModelObject, ModelVertex};

use thiserror::Error;

/// Errors reading, writing or converting model files
#[derive(Error, Debug)]
pub enum ModelFormatError {
    /// File could not be opened, read or written
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    /// The stream ended before the declared contents were read
    #[error("Model data is truncated")]
    Truncated,

    /// The interchange file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The source contains no triangles
    #[error("Mesh is empty: {0}")]
    EmptyMesh(String),

    /// A count does not fit the 32-bit format
    #[error("Too many {0} for the model format")]
    TooLarge(&'static str),

    /// An object references a material the file does not define
    #[error("Object {object} uses material {index} but only {count} materials exist")]
    MaterialIndexOutOfRange {
        /// Object position in the file
        object: usize,
        /// Material index as stored
        index: u32,
        /// Number of materials in the file
        count: usize,
    },
}

impl From<std::io::Error> for ModelFormatError {
    fn from(error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(error)
        }
    }
}
