//! chainmesh-export library
//!
//! Converts OBJ models into chained-triangle meshes, written either as a
//! compact binary blob or as C/C++ source arrays. Usable from other tools
//! through [`convert`] and [`convert_str`].

pub mod codec;
pub mod convert;
pub mod error;
pub mod manifest;
pub mod mesh;
pub mod style;

pub use convert::{
    convert, convert_reader, convert_str, convert_to_file, ConvertOptions, ConvertStats,
    ConvertedModel, EmitFormat,
};
pub use error::{MeshError, MeshResult};
pub use style::{DefaultStyles, Lighting, ObjectStyle, StyleList, StyleProvider};

// Re-export the on-disk layout for readers
pub use chainmesh_format::{decode_face_stream, MeshBlob, MeshInfoHeader};
