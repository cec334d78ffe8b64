//! OBJ loading
//!
//! Recognized records: `v`, `vt`, `vn`, `f` and the group markers `o`, `g`,
//! `usemtl`. Everything else is ignored. Faces are fan-triangulated.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{Attribute, Attributes, Corner, SourceMesh, SourceObject, Triangle};
use crate::error::{MeshError, MeshResult};

/// Face corner as written in the file, already resolved to 0-based indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawCorner {
    vertex: i64,
    texcoord: Option<i64>,
    normal: Option<i64>,
}

#[derive(Debug, Default)]
struct RawObject {
    tag: String,
    /// (source line, triangle)
    triangles: Vec<(usize, [RawCorner; 3])>,
}

/// Load an OBJ file from disk
pub fn load_obj(path: &Path) -> MeshResult<SourceMesh> {
    let file = File::open(path)?;
    parse_obj(BufReader::new(file))
}

/// Parse OBJ text and validate index ranges and attribute presence
pub fn parse_obj<R: BufRead>(reader: R) -> MeshResult<SourceMesh> {
    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    let mut objects: Vec<RawObject> = Vec::new();
    let mut current = RawObject::default();

    for (i, line) in reader.lines().enumerate() {
        let line_nb = i + 1;
        let line = line.map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => {
                MeshError::parse(line_nb, "line is not valid UTF-8")
            }
            _ => MeshError::Io(e),
        })?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&keyword) = parts.first() else {
            continue;
        };

        match keyword {
            "v" => vertices.push(parse_floats::<3>(&parts[1..], line_nb, "vertex [v]")?),
            "vt" => texcoords.push(parse_floats::<2>(&parts[1..], line_nb, "texture coord [vt]")?),
            "vn" => normals.push(parse_floats::<3>(&parts[1..], line_nb, "normal [vn]")?),
            "o" | "g" | "usemtl" => {
                let marker = parts.join(" ");
                if current.triangles.is_empty() {
                    if parts.len() > 1 {
                        append_tag(&mut current.tag, &marker);
                    }
                } else {
                    objects.push(std::mem::take(&mut current));
                    if parts.len() > 1 {
                        current.tag = marker;
                    }
                }
            }
            "f" => {
                let counts = [vertices.len(), texcoords.len(), normals.len()];
                let face = parts[1..]
                    .iter()
                    .map(|tag| parse_face_corner(tag, counts, line_nb))
                    .collect::<MeshResult<Vec<_>>>()?;
                if face.len() < 3 {
                    return Err(MeshError::parse(
                        line_nb,
                        format!("face has {} corners, at least 3 required", face.len()),
                    ));
                }
                current
                    .triangles
                    .extend(fan_split(&face).into_iter().map(|t| (line_nb, t)));
            }
            _ => {}
        }
    }

    if !current.triangles.is_empty() {
        objects.push(current);
    }
    if objects.is_empty() {
        return Err(MeshError::NoFaces);
    }

    let attributes = Attributes {
        has_texcoords: uniform_presence(&objects, Attribute::Texcoord)?,
        has_normals: uniform_presence(&objects, Attribute::Normal)?,
        vertices,
        texcoords,
        normals,
    };

    let objects = objects
        .into_iter()
        .map(|raw| {
            let triangles = raw
                .triangles
                .iter()
                .map(|(line, t)| resolve_triangle(t, &attributes, *line))
                .collect::<MeshResult<Vec<_>>>()?;
            Ok(SourceObject {
                tag: raw.tag,
                triangles,
            })
        })
        .collect::<MeshResult<Vec<_>>>()?;

    // Arrays the faces never index are dropped rather than carried along
    let mut attributes = attributes;
    if !attributes.has_texcoords {
        attributes.texcoords.clear();
    }
    if !attributes.has_normals {
        attributes.normals.clear();
    }

    Ok(SourceMesh {
        attributes,
        objects,
    })
}

fn append_tag(tag: &mut String, marker: &str) {
    if !tag.is_empty() {
        tag.push_str(" | ");
    }
    tag.push_str(marker);
}

/// Parse the leading `N` components of a record; extra components are ignored
fn parse_floats<const N: usize>(
    fields: &[&str],
    line: usize,
    what: &str,
) -> MeshResult<[f32; N]> {
    let values = fields
        .iter()
        .map(|s| {
            s.parse::<f32>()
                .map_err(|_| MeshError::parse(line, format!("cannot convert [{s}] to a number")))
        })
        .collect::<MeshResult<Vec<f32>>>()?;

    if values.len() < N {
        return Err(MeshError::parse(
            line,
            format!("wrong {what}: {} components, expected {N}", values.len()),
        ));
    }
    let mut out = [0.0; N];
    out.copy_from_slice(&values[..N]);
    Ok(out)
}

/// Parse a face corner: `v`, `v/vt`, `v/vt/vn` or `v//vn`
///
/// Positive indices are 1-based, negative ones count back from the end of the
/// array as it stands on this line. Zero is invalid.
fn parse_face_corner(tag: &str, counts: [usize; 3], line: usize) -> MeshResult<RawCorner> {
    let fields: Vec<&str> = tag.split('/').collect();
    if fields.len() > 3 {
        return Err(MeshError::parse(line, format!("wrong face index: {tag}")));
    }

    let mut resolved = [None; 3];
    for (slot, field) in fields.iter().enumerate() {
        if field.is_empty() {
            continue;
        }
        let value: i64 = field
            .parse()
            .map_err(|_| MeshError::parse(line, format!("cannot convert [{field}] to an index")))?;
        if value == 0 {
            return Err(MeshError::parse(
                line,
                format!("wrong face index: {tag} (index 0)"),
            ));
        }
        resolved[slot] = Some(if value > 0 {
            value - 1
        } else {
            counts[slot] as i64 + value
        });
    }

    let vertex = resolved[0]
        .ok_or_else(|| MeshError::parse(line, format!("face corner without vertex: {tag}")))?;
    Ok(RawCorner {
        vertex,
        texcoord: resolved[1],
        normal: resolved[2],
    })
}

/// Fan triangulation: k corners give k - 2 triangles sharing the first corner
fn fan_split<T: Copy>(face: &[T]) -> Vec<[T; 3]> {
    face.windows(2)
        .skip(1)
        .map(|w| [face[0], w[0], w[1]])
        .collect()
}

fn raw_index(corner: &RawCorner, attribute: Attribute) -> Option<i64> {
    match attribute {
        Attribute::Vertex => Some(corner.vertex),
        Attribute::Texcoord => corner.texcoord,
        Attribute::Normal => corner.normal,
    }
}

/// Optional attributes must be present on every corner or on none
fn uniform_presence(objects: &[RawObject], attribute: Attribute) -> MeshResult<bool> {
    let corners = objects
        .iter()
        .flat_map(|o| &o.triangles)
        .flat_map(|(_, t)| t.iter());
    let mut with = false;
    let mut without = false;
    for corner in corners {
        match raw_index(corner, attribute) {
            Some(_) => with = true,
            None => without = true,
        }
        if with && without {
            return Err(MeshError::Consistency(format!(
                "missing {attribute} indexes for some faces (but not all)"
            )));
        }
    }
    Ok(with)
}

fn resolve_triangle(
    raw: &[RawCorner; 3],
    attributes: &Attributes,
    line: usize,
) -> MeshResult<Triangle> {
    let mut triangle: Triangle = [Corner::default(); 3];
    for (corner, raw) in triangle.iter_mut().zip(raw) {
        for attribute in Attribute::ALL {
            if !attributes.has(attribute) {
                continue;
            }
            let index = raw_index(raw, attribute).unwrap_or(-1);
            let len = attributes.len(attribute);
            if index < 0 || index as usize >= len {
                return Err(MeshError::IndexRange {
                    attribute,
                    index,
                    len,
                    line,
                });
            }
            *corner = corner.with(attribute, index as u32);
        }
    }
    Ok(triangle)
}
