//! Face word stream (u16)
//!
//! Each object is stored as a sequence of chains followed by a single `0`
//! terminator word.
//!
//! # Layout
//! ```text
//! chain_len                      (1..=65535)
//! seed corner 0, 1, 2            (vertex [, texcoord] [, normal])
//! chained corner x (chain_len-1) (vertex | link_type << 15 [, texcoord] [, normal])
//! ...next chain...
//! 0                              (end of object)
//! ```
//!
//! A chained triangle reuses two corners of the previous triangle. Link type
//! `0` shares the previous triangle's closing edge `(c, a)`, link type `1` its
//! middle edge `(b, c)`. The new triangle starts with the shared edge reversed
//! and ends with the corner stored in the stream.

/// Largest vertex count (one bit of the vertex word carries the link type)
pub const MAX_VERTICES: usize = 32767;

/// Largest texcoord count
pub const MAX_TEXCOORDS: usize = 65535;

/// Largest normal count
pub const MAX_NORMALS: usize = 65535;

/// Largest number of triangles in a single chain
pub const MAX_CHAIN_LEN: usize = 65535;

/// Bit of a chained vertex word holding the link type
pub const LINK_TYPE_BIT: u16 = 0x8000;

/// Which optional attribute indices follow each vertex word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceLayout {
    pub has_texcoords: bool,
    pub has_normals: bool,
}

impl FaceLayout {
    /// Number of words per stored corner (1 to 3)
    pub fn words_per_corner(&self) -> usize {
        1 + usize::from(self.has_texcoords) + usize::from(self.has_normals)
    }
}

/// One decoded triangle corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub vertex: u16,
    pub texcoord: Option<u16>,
    pub normal: Option<u16>,
}

/// A decoded chain, expanded back into full triangles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedChain {
    pub triangles: Vec<[FaceCorner; 3]>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FaceStreamError {
    #[error("face stream ended at word {0} before the object terminator")]
    UnexpectedEnd(usize),

    #[error("seed vertex word {word:#06x} at offset {offset} has the link bit set")]
    LinkBitOnSeed { word: u16, offset: usize },

    #[error("{0} words found after the object terminator")]
    TrailingWords(usize),
}

struct WordReader<'a> {
    words: &'a [u16],
    pos: usize,
}

impl WordReader<'_> {
    fn next(&mut self) -> Result<u16, FaceStreamError> {
        let word = *self
            .words
            .get(self.pos)
            .ok_or(FaceStreamError::UnexpectedEnd(self.pos))?;
        self.pos += 1;
        Ok(word)
    }

    fn corner(&mut self, vertex: u16, layout: FaceLayout) -> Result<FaceCorner, FaceStreamError> {
        let texcoord = if layout.has_texcoords {
            Some(self.next()?)
        } else {
            None
        };
        let normal = if layout.has_normals {
            Some(self.next()?)
        } else {
            None
        };
        Ok(FaceCorner {
            vertex,
            texcoord,
            normal,
        })
    }
}

/// Decode one object's face stream into chains of full triangles
///
/// The stream must end with exactly one terminator word.
pub fn decode_face_stream(
    words: &[u16],
    layout: FaceLayout,
) -> Result<Vec<DecodedChain>, FaceStreamError> {
    let mut reader = WordReader { words, pos: 0 };
    let mut chains = Vec::new();

    loop {
        let chain_len = reader.next()? as usize;
        if chain_len == 0 {
            break;
        }

        let mut seed = [FaceCorner {
            vertex: 0,
            texcoord: None,
            normal: None,
        }; 3];
        for corner in &mut seed {
            let offset = reader.pos;
            let word = reader.next()?;
            if word & LINK_TYPE_BIT != 0 {
                return Err(FaceStreamError::LinkBitOnSeed { word, offset });
            }
            *corner = reader.corner(word, layout)?;
        }

        let mut triangles = Vec::with_capacity(chain_len);
        triangles.push(seed);
        let mut prev = seed;

        for _ in 1..chain_len {
            let word = reader.next()?;
            let corner = reader.corner(word & !LINK_TYPE_BIT, layout)?;
            let triangle = if word & LINK_TYPE_BIT == 0 {
                [prev[0], prev[2], corner]
            } else {
                [prev[2], prev[1], corner]
            };
            triangles.push(triangle);
            prev = triangle;
        }

        chains.push(DecodedChain { triangles });
    }

    let trailing = words.len() - reader.pos;
    if trailing > 0 {
        return Err(FaceStreamError::TrailingWords(trailing));
    }

    Ok(chains)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(vertex: u16) -> FaceCorner {
        FaceCorner {
            vertex,
            texcoord: None,
            normal: None,
        }
    }

    #[test]
    fn test_empty_object() {
        let chains = decode_face_stream(&[0], FaceLayout::default()).unwrap();
        assert!(chains.is_empty());
    }

    #[test]
    fn test_seed_only_chain() {
        let chains = decode_face_stream(&[1, 0, 1, 2, 0], FaceLayout::default()).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].triangles, vec![[v(0), v(1), v(2)]]);
    }

    #[test]
    fn test_link_types_rebuild_shared_edge() {
        // Seed (0,1,2); link 0 shares (2,0) -> (0,2,3); link 1 shares (2,3) -> (3,2,4)
        let words = [3, 0, 1, 2, 3, LINK_TYPE_BIT | 4, 0];
        let chains = decode_face_stream(&words, FaceLayout::default()).unwrap();
        assert_eq!(
            chains[0].triangles,
            vec![
                [v(0), v(1), v(2)],
                [v(0), v(2), v(3)],
                [v(3), v(2), v(4)],
            ]
        );
    }

    #[test]
    fn test_attribute_words_follow_vertex() {
        let layout = FaceLayout {
            has_texcoords: true,
            has_normals: true,
        };
        assert_eq!(layout.words_per_corner(), 3);

        let words = [2, 0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 0];
        let chains = decode_face_stream(&words, layout).unwrap();
        let second = chains[0].triangles[1];
        assert_eq!(second[0].texcoord, Some(0));
        assert_eq!(second[1].normal, Some(2));
        assert_eq!(
            second[2],
            FaceCorner {
                vertex: 3,
                texcoord: Some(3),
                normal: Some(3)
            }
        );
    }

    #[test]
    fn test_truncated_stream() {
        let err = decode_face_stream(&[2, 0, 1, 2], FaceLayout::default()).unwrap_err();
        assert_eq!(err, FaceStreamError::UnexpectedEnd(4));
    }

    #[test]
    fn test_trailing_words_rejected() {
        let err = decode_face_stream(&[1, 0, 1, 2, 0, 7], FaceLayout::default()).unwrap_err();
        assert_eq!(err, FaceStreamError::TrailingWords(1));
    }

    #[test]
    fn test_link_bit_on_seed_rejected() {
        let err =
            decode_face_stream(&[1, LINK_TYPE_BIT, 1, 2, 0], FaceLayout::default()).unwrap_err();
        assert!(matches!(err, FaceStreamError::LinkBitOnSeed { offset: 1, .. }));
    }
}
