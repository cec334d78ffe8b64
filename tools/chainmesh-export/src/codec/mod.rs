//! Encoding of a chained mesh into face word streams and output files
//!
//! Both emitters share the word encoding in this module: [`binary`] packs it
//! into a [`chainmesh_format::MeshBlob`], [`text`] renders it as source
//! arrays.

pub mod binary;
pub mod text;

pub use binary::encode_binary;
pub use text::{write_text, TextVariant};

use chainmesh_format::{FaceLayout, LINK_TYPE_BIT, MAX_NORMALS, MAX_TEXCOORDS, MAX_VERTICES};

use crate::error::{MeshError, MeshResult};
use crate::mesh::{
    Attribute, Attributes, Bounds, Chain, ChainedMesh, ChainedObject, Corner, LinkType,
};
use crate::style::ObjectStyle;

/// Everything an emitter needs: the final mesh plus per-object metadata
#[derive(Debug, Clone)]
pub struct PreparedModel {
    pub name: String,
    pub mesh: ChainedMesh,
    /// Model box, rounded
    pub bounds: Bounds,
    /// One box per object
    pub object_bounds: Vec<Bounds>,
    /// One style per object
    pub styles: Vec<ObjectStyle>,
}

impl PreparedModel {
    pub fn layout(&self) -> FaceLayout {
        face_layout(&self.mesh.attributes)
    }

    /// Symbol of object `index`: the model name, suffixed with the 1-based
    /// index when there are several objects
    pub fn object_name(&self, index: usize) -> String {
        if self.mesh.objects.len() == 1 {
            self.name.clone()
        } else {
            format!("{}_{}", self.name, index + 1)
        }
    }
}

pub fn face_layout(attributes: &Attributes) -> FaceLayout {
    FaceLayout {
        has_texcoords: attributes.has_texcoords,
        has_normals: attributes.has_normals,
    }
}

/// Fail if an array is too large for 16-bit indices
pub fn check_capacity(attributes: &Attributes) -> MeshResult<()> {
    for (attribute, max) in [
        (Attribute::Vertex, MAX_VERTICES),
        (Attribute::Texcoord, MAX_TEXCOORDS),
        (Attribute::Normal, MAX_NORMALS),
    ] {
        let count = attributes.len(attribute);
        if count > max {
            return Err(MeshError::Capacity {
                what: attribute.array_name(),
                count,
                max,
            });
        }
    }
    Ok(())
}

/// Length of an object's face stream, terminator included
pub fn face_word_count(object: &ChainedObject, layout: FaceLayout) -> usize {
    let per_corner = layout.words_per_corner();
    1 + object
        .chains
        .iter()
        .map(|c| 1 + (2 + c.len()) * per_corner)
        .sum::<usize>()
}

/// Rough in-memory footprint of the model in KiB (arrays, face streams and
/// one 68-byte record per object)
pub fn estimated_size_kib(mesh: &ChainedMesh) -> usize {
    let attributes = &mesh.attributes;
    let per_corner = face_layout(attributes).words_per_corner();
    let arrays = 12 * attributes.vertices.len()
        + 12 * attributes.normals.len()
        + 8 * attributes.texcoords.len();
    let records = 68 * mesh.objects.len();
    let faces: usize = mesh
        .objects
        .iter()
        .flat_map(|o| &o.chains)
        .map(|c| 2 * (1 + (2 + c.len()) * per_corner))
        .sum();
    (arrays + records + faces) / 1024
}

/// The 1 to 3 words of one stored corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerWords {
    words: [u16; 3],
    len: usize,
}

impl CornerWords {
    pub fn as_slice(&self) -> &[u16] {
        &self.words[..self.len]
    }
}

/// One chain in stream form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChain {
    pub len: u16,
    pub seed: [CornerWords; 3],
    /// New corner of every chained triangle, link type in the vertex word
    pub links: Vec<CornerWords>,
}

impl EncodedChain {
    pub fn words(&self) -> impl Iterator<Item = u16> + '_ {
        std::iter::once(self.len).chain(
            self.seed
                .iter()
                .chain(&self.links)
                .flat_map(|c| c.as_slice().iter().copied()),
        )
    }
}

fn index_word(attribute: Attribute, index: u32, max: usize) -> MeshResult<u16> {
    if index as usize >= max {
        return Err(MeshError::Capacity {
            what: attribute.array_name(),
            count: index as usize + 1,
            max,
        });
    }
    Ok(index as u16)
}

fn encode_corner(
    corner: &Corner,
    link: Option<LinkType>,
    layout: FaceLayout,
) -> MeshResult<CornerWords> {
    let link_bits = match link {
        None | Some(LinkType::Closing) => 0,
        Some(LinkType::Middle) => LINK_TYPE_BIT,
        Some(LinkType::Leading) => {
            return Err(MeshError::Consistency(
                "leading-edge link left in an emitted chain".into(),
            ));
        }
    };

    let mut words = [0u16; 3];
    let mut len = 0;
    let mut push = |w: u16| {
        words[len] = w;
        len += 1;
    };
    push(index_word(Attribute::Vertex, corner.vertex, MAX_VERTICES)? | link_bits);
    if layout.has_texcoords {
        push(index_word(Attribute::Texcoord, corner.texcoord, MAX_TEXCOORDS)?);
    }
    if layout.has_normals {
        push(index_word(Attribute::Normal, corner.normal, MAX_NORMALS)?);
    }
    Ok(CornerWords { words, len })
}

pub fn encode_chain(chain: &Chain, layout: FaceLayout) -> MeshResult<EncodedChain> {
    let len = u16::try_from(chain.len()).map_err(|_| MeshError::Capacity {
        what: "triangles in a chain",
        count: chain.len(),
        max: u16::MAX as usize,
    })?;
    let [a, b, c] = &chain.seed;
    let seed = [
        encode_corner(a, None, layout)?,
        encode_corner(b, None, layout)?,
        encode_corner(c, None, layout)?,
    ];
    let links = chain
        .links
        .iter()
        .map(|(link, t)| encode_corner(&t[2], Some(*link), layout))
        .collect::<MeshResult<_>>()?;
    Ok(EncodedChain { len, seed, links })
}

pub fn encode_chains(object: &ChainedObject, layout: FaceLayout) -> MeshResult<Vec<EncodedChain>> {
    object.chains.iter().map(|c| encode_chain(c, layout)).collect()
}

/// Full face stream of one object, `0` terminator included
pub fn encode_face_stream(object: &ChainedObject, layout: FaceLayout) -> MeshResult<Vec<u16>> {
    let mut words = Vec::with_capacity(face_word_count(object, layout));
    for chain in encode_chains(object, layout)? {
        words.extend(chain.words());
    }
    words.push(0);

    let expected = face_word_count(object, layout);
    if words.len() != expected {
        return Err(MeshError::Consistency(format!(
            "face stream has {} words, expected {}",
            words.len(),
            expected
        )));
    }
    Ok(words)
}
