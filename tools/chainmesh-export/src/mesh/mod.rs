//! Mesh model and geometric preprocessing (OBJ -> chained mesh)
//!
//! Stages run in a fixed order, each consuming the previous stage's output:
//! [`obj`] -> [`normals`] -> [`chain`] -> [`reindex`] -> [`bounds`].

pub mod bounds;
pub mod chain;
pub mod normals;
pub mod obj;
pub mod reindex;

use std::fmt;

pub use bounds::{object_bounds, recenter_and_rescale, Bounds};
pub use chain::{build_chains, Chain, LinkType};
pub use normals::{fix_normals, reverse_winding};
pub use obj::{load_obj, parse_obj};
pub use reindex::reindex;

/// One of the three per-corner attribute arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Vertex,
    Texcoord,
    Normal,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Vertex, Attribute::Texcoord, Attribute::Normal];

    /// Plural name used in log output and capacity errors
    pub fn array_name(self) -> &'static str {
        match self {
            Attribute::Vertex => "vertices",
            Attribute::Texcoord => "texture coords",
            Attribute::Normal => "normals",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Vertex => "vertex",
            Attribute::Texcoord => "texcoord",
            Attribute::Normal => "normal",
        })
    }
}

/// A triangle corner: indices into the vertex, texcoord and normal arrays
///
/// Texcoord and normal slots are only meaningful when the owning mesh has
/// that attribute; otherwise they stay 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Corner {
    pub vertex: u32,
    pub texcoord: u32,
    pub normal: u32,
}

impl Corner {
    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Vertex => self.vertex,
            Attribute::Texcoord => self.texcoord,
            Attribute::Normal => self.normal,
        }
    }

    pub fn with(mut self, attribute: Attribute, index: u32) -> Self {
        match attribute {
            Attribute::Vertex => self.vertex = index,
            Attribute::Texcoord => self.texcoord = index,
            Attribute::Normal => self.normal = index,
        }
        self
    }
}

/// Three corners; winding order is significant
pub type Triangle = [Corner; 3];

/// Attribute arrays shared by every object of a mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub vertices: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub has_texcoords: bool,
    pub has_normals: bool,
}

impl Attributes {
    /// Whether corners carry indices for `attribute`
    pub fn has(&self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Vertex => true,
            Attribute::Texcoord => self.has_texcoords,
            Attribute::Normal => self.has_normals,
        }
    }

    pub fn len(&self, attribute: Attribute) -> usize {
        match attribute {
            Attribute::Vertex => self.vertices.len(),
            Attribute::Texcoord => self.texcoords.len(),
            Attribute::Normal => self.normals.len(),
        }
    }
}

/// A named group of triangles, as loaded from the source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceObject {
    pub tag: String,
    pub triangles: Vec<Triangle>,
}

/// Mesh as loaded: flat triangle lists per object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMesh {
    pub attributes: Attributes,
    pub objects: Vec<SourceObject>,
}

impl SourceMesh {
    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|o| o.triangles.len()).sum()
    }
}

/// An object after chaining
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainedObject {
    pub tag: String,
    pub chains: Vec<Chain>,
}

impl ChainedObject {
    pub fn triangle_count(&self) -> usize {
        self.chains.iter().map(Chain::len).sum()
    }
}

/// Mesh after chaining; chains are in final emission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainedMesh {
    pub attributes: Attributes,
    pub objects: Vec<ChainedObject>,
}

impl ChainedMesh {
    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(ChainedObject::triangle_count).sum()
    }

    /// Every corner that introduces data, in emission order
    ///
    /// Seeds contribute all three corners, chained triangles only their new one.
    pub fn emitted_corners(&self) -> impl Iterator<Item = &Corner> {
        self.objects
            .iter()
            .flat_map(|o| &o.chains)
            .flat_map(Chain::emitted_corners)
    }
}
