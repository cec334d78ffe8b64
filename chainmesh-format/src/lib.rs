//! Shared binary layout for chained-triangle meshes
//!
//! This crate is used by:
//! - `chainmesh-export` (asset pipeline, writes the layout)
//! - runtime readers and tooling (`chainmesh-export info`, tests)
//!
//! # Modules
//!
//! - [`mesh_info`] - Fixed 88-byte header and whole-blob parsing
//! - [`face_stream`] - 16-bit face word stream constants and decoder

pub mod face_stream;
pub mod mesh_info;

pub use face_stream::{
    DecodedChain, FaceCorner, FaceLayout, FaceStreamError, LINK_TYPE_BIT, MAX_CHAIN_LEN,
    MAX_NORMALS, MAX_TEXCOORDS, MAX_VERTICES, decode_face_stream,
};
pub use mesh_info::{MeshBlob, MeshInfoError, MeshInfoHeader};

/// File extension used for binary mesh blobs
pub const MESH_BIN_EXT: &str = "bin";

/// File extension used for generated source-array headers
pub const MESH_HEADER_EXT: &str = "h";
