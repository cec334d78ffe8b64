//! Normal synthesis and normalization

use glam::Vec3;

use super::{Corner, SourceMesh};

/// Accepted range for the squared length of a normalized normal
const UNIT_LENGTH_SQ_RANGE: (f32, f32) = (0.9999, 1.0001);

/// Ensure every corner has a unit normal
///
/// Source normals are only normalized. Without source normals, one normal per
/// vertex is accumulated from the faces touching it and every corner's normal
/// index is set to its vertex index.
pub fn fix_normals(mut mesh: SourceMesh) -> SourceMesh {
    if !mesh.attributes.has_normals {
        mesh.attributes.normals = synthesize_vertex_normals(&mesh);
        mesh.attributes.has_normals = true;
        for triangle in mesh.objects.iter_mut().flat_map(|o| &mut o.triangles) {
            for corner in triangle.iter_mut() {
                *corner = Corner {
                    normal: corner.vertex,
                    ..*corner
                };
            }
        }
    }

    for normal in &mut mesh.attributes.normals {
        *normal = Vec3::from_array(*normal).normalize_or_zero().to_array();
    }

    let flagged = check_unit_normals(&mesh.attributes.normals);
    if flagged > 0 {
        tracing::warn!("{} normals are not unit length after normalization", flagged);
    }

    mesh
}

/// Per-vertex sum of face contributions (not normalized)
fn synthesize_vertex_normals(mesh: &SourceMesh) -> Vec<[f32; 3]> {
    let positions = &mesh.attributes.vertices;
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for triangle in mesh.objects.iter().flat_map(|o| &o.triangles) {
        let [i0, i1, i2] = triangle.map(|c| c.vertex as usize);
        let p0 = Vec3::from_array(positions[i0]);
        let p1 = Vec3::from_array(positions[i1]);
        let p2 = Vec3::from_array(positions[i2]);

        let e0 = p0 - p1;
        let e1 = p1 - p2;
        let e2 = p2 - p0;
        let face = e2.cross(e0) + e0.cross(e1) + e1.cross(e2);

        accum[i0] += face;
        accum[i1] += face;
        accum[i2] += face;
    }

    accum.iter().map(Vec3::to_array).collect()
}

/// Count (and log) normals whose squared length falls outside the unit range
fn check_unit_normals(normals: &[[f32; 3]]) -> usize {
    let (lo, hi) = UNIT_LENGTH_SQ_RANGE;
    let mut flagged = 0;
    for (i, n) in normals.iter().enumerate() {
        let len_sq = Vec3::from_array(*n).length_squared();
        if !(lo..=hi).contains(&len_sq) {
            tracing::warn!("degenerate normal {:?} (index {}) with norm2 = {}", n, i, len_sq);
            flagged += 1;
        }
    }
    flagged
}

/// Reverse the winding of every triangle and flip every normal
pub fn reverse_winding(mut mesh: SourceMesh) -> SourceMesh {
    for triangle in mesh.objects.iter_mut().flat_map(|o| &mut o.triangles) {
        triangle.swap(1, 2);
    }
    for normal in &mut mesh.attributes.normals {
        *normal = (-Vec3::from_array(*normal)).to_array();
    }
    mesh
}
