//! Binary mesh blob (.bin)
//!
//! POD format - no magic bytes. All values are little-endian.
//!
//! # Layout
//! ```text
//! 0x00: vertex_offset    u32  (relative to the data block)
//! 0x04: vertex_count     u32
//! 0x08: texcoord_offset  u32
//! 0x0C: texcoord_count   u32
//! 0x10: normal_offset    u32
//! 0x14: normal_count     u32
//! 0x18: faces_offset     u32
//! 0x1C: triangle_count   u32
//! 0x20: face_word_count  u32
//! 0x24: color            f32 x 3
//! 0x30: lighting         f32 x 4 (ambient, diffuse, specular, exponent)
//! 0x40: bounds           f32 x 6 (xmin, xmax, ymin, ymax, zmin, zmax)
//! 0x58: data block
//!       vertices  (vertex_count * 12 bytes)
//!       texcoords (texcoord_count * 8 bytes)
//!       normals   (normal_count * 12 bytes)
//!       faces     (face_word_count * 2 bytes)
//! ```

use crate::face_stream::FaceLayout;

/// Mesh info header (88 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeshInfoHeader {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub texcoord_offset: u32,
    pub texcoord_count: u32,
    pub normal_offset: u32,
    pub normal_count: u32,
    pub faces_offset: u32,
    pub triangle_count: u32,
    pub face_word_count: u32,
    pub color: [f32; 3],
    pub lighting: [f32; 4],
    pub bounds: [f32; 6],
}

impl MeshInfoHeader {
    pub const SIZE: usize = 88;

    const U32_FIELDS: usize = 9;

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let words = [
            self.vertex_offset,
            self.vertex_count,
            self.texcoord_offset,
            self.texcoord_count,
            self.normal_offset,
            self.normal_count,
            self.faces_offset,
            self.triangle_count,
            self.face_word_count,
        ];
        let floats = self
            .color
            .iter()
            .chain(&self.lighting)
            .chain(&self.bounds)
            .map(|f| f.to_bits());

        let mut bytes = [0u8; Self::SIZE];
        for (slot, value) in bytes.chunks_exact_mut(4).zip(words.into_iter().chain(floats)) {
            slot.copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut values = bytes[..Self::SIZE]
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
        let mut words = [0u32; Self::U32_FIELDS];
        for w in &mut words {
            *w = values.next()?;
        }
        let mut floats = [0f32; 13];
        for f in &mut floats {
            *f = f32::from_bits(values.next()?);
        }

        Some(Self {
            vertex_offset: words[0],
            vertex_count: words[1],
            texcoord_offset: words[2],
            texcoord_count: words[3],
            normal_offset: words[4],
            normal_count: words[5],
            faces_offset: words[6],
            triangle_count: words[7],
            face_word_count: words[8],
            color: [floats[0], floats[1], floats[2]],
            lighting: [floats[3], floats[4], floats[5], floats[6]],
            bounds: [
                floats[7], floats[8], floats[9], floats[10], floats[11], floats[12],
            ],
        })
    }

    /// Attribute presence implied by the counts
    pub fn layout(&self) -> FaceLayout {
        FaceLayout {
            has_texcoords: self.texcoord_count > 0,
            has_normals: self.normal_count > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshInfoError {
    #[error("mesh blob too small for header: {0} bytes")]
    TruncatedHeader(usize),

    #[error("{section} section at {offset}..{end} exceeds data block of {len} bytes")]
    SectionOutOfBounds {
        section: &'static str,
        offset: usize,
        end: usize,
        len: usize,
    },
}

/// A complete binary mesh: header plus decoded data block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBlob {
    pub header: MeshInfoHeader,
    pub vertices: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<u16>,
}

impl MeshBlob {
    /// Build a blob, filling in every offset and count of `header`
    ///
    /// Only `triangle_count`, `color`, `lighting` and `bounds` are taken from
    /// the supplied header.
    pub fn new(
        header: MeshInfoHeader,
        vertices: Vec<[f32; 3]>,
        texcoords: Vec<[f32; 2]>,
        normals: Vec<[f32; 3]>,
        faces: Vec<u16>,
    ) -> Self {
        let vertex_bytes = vertices.len() * 12;
        let texcoord_bytes = texcoords.len() * 8;
        let normal_bytes = normals.len() * 12;

        let header = MeshInfoHeader {
            vertex_offset: 0,
            vertex_count: vertices.len() as u32,
            texcoord_offset: vertex_bytes as u32,
            texcoord_count: texcoords.len() as u32,
            normal_offset: (vertex_bytes + texcoord_bytes) as u32,
            normal_count: normals.len() as u32,
            faces_offset: (vertex_bytes + texcoord_bytes + normal_bytes) as u32,
            face_word_count: faces.len() as u32,
            ..header
        };

        Self {
            header,
            vertices,
            texcoords,
            normals,
            faces,
        }
    }

    /// Total size of header and data block in bytes
    pub fn byte_len(&self) -> usize {
        MeshInfoHeader::SIZE + self.header.faces_offset as usize + self.faces.len() * 2
    }

    /// Serialize header followed by the data block
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        out.extend_from_slice(&self.header.to_bytes());

        let floats = bytemuck::cast_slice::<[f32; 3], f32>(&self.vertices)
            .iter()
            .chain(bytemuck::cast_slice::<[f32; 2], f32>(&self.texcoords))
            .chain(bytemuck::cast_slice::<[f32; 3], f32>(&self.normals));
        for f in floats {
            out.extend_from_slice(&f.to_le_bytes());
        }
        for word in &self.faces {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Parse a blob produced by [`MeshBlob::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MeshInfoError> {
        let header =
            MeshInfoHeader::from_bytes(bytes).ok_or(MeshInfoError::TruncatedHeader(bytes.len()))?;
        let data = &bytes[MeshInfoHeader::SIZE..];

        let section = |name: &'static str, offset: u32, len: usize| {
            let offset = offset as usize;
            let end = offset + len;
            data.get(offset..end)
                .ok_or(MeshInfoError::SectionOutOfBounds {
                    section: name,
                    offset,
                    end,
                    len: data.len(),
                })
        };

        let vertices = read_floats(section(
            "vertex",
            header.vertex_offset,
            header.vertex_count as usize * 12,
        )?);
        let texcoords = read_floats(section(
            "texcoord",
            header.texcoord_offset,
            header.texcoord_count as usize * 8,
        )?);
        let normals = read_floats(section(
            "normal",
            header.normal_offset,
            header.normal_count as usize * 12,
        )?);
        let faces = section(
            "face",
            header.faces_offset,
            header.face_word_count as usize * 2,
        )?
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();

        Ok(Self {
            header,
            vertices: bytemuck::cast_slice(vertices.as_slice()).to_vec(),
            texcoords: bytemuck::cast_slice(texcoords.as_slice()).to_vec(),
            normals: bytemuck::cast_slice(normals.as_slice()).to_vec(),
            faces,
        })
    }
}

fn read_floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
