//! First-use reordering and trimming of the attribute arrays
//!
//! After [`reindex`], replaying the chains in emission order visits every
//! attribute index for the first time in increasing order starting at 0, and
//! no array entry is left unreferenced.

use super::{Attribute, Attributes, ChainedMesh};
use crate::error::{MeshError, MeshResult};

/// Reorder and trim every present attribute array
pub fn reindex(mut mesh: ChainedMesh) -> MeshResult<ChainedMesh> {
    for attribute in Attribute::ALL {
        if !mesh.attributes.has(attribute) {
            continue;
        }

        let order = first_use_order(&mesh, attribute)?;
        let inverse = invert(&order);
        reorder_array(&mut mesh.attributes, attribute, &order);
        remap(&mut mesh, attribute, &inverse);

        let used = referenced_len(&mesh, attribute)?;
        let unused = mesh.attributes.len(attribute) - used;
        if unused > 0 {
            tracing::info!(
                "deleting {} unused entries from the {} array",
                unused,
                attribute.array_name()
            );
        }
        truncate_array(&mut mesh.attributes, attribute, used);
    }
    Ok(mesh)
}

/// Permutation listing `attribute` indices in first-use order
///
/// Unreferenced indices are appended in ascending order so the result is a
/// bijection over the whole array. An absent attribute yields an empty list.
pub fn first_use_order(mesh: &ChainedMesh, attribute: Attribute) -> MeshResult<Vec<u32>> {
    if !mesh.attributes.has(attribute) {
        return Ok(Vec::new());
    }

    let len = mesh.attributes.len(attribute);
    let mut seen = vec![false; len];
    let mut order = Vec::with_capacity(len);
    for corner in mesh.emitted_corners() {
        let index = corner.get(attribute);
        let Some(flag) = seen.get_mut(index as usize) else {
            return Err(MeshError::Consistency(format!(
                "{} index {} outside an array of {}",
                attribute, index, len
            )));
        };
        if !*flag {
            *flag = true;
            order.push(index);
        }
    }
    order.extend((0..len).filter(|&i| !seen[i]).map(|i| i as u32));

    check_bijection(&order, len, attribute)?;
    Ok(order)
}

fn check_bijection(order: &[u32], len: usize, attribute: Attribute) -> MeshResult<()> {
    if order.len() != len {
        return Err(MeshError::Consistency(format!(
            "{} permutation has {} entries for an array of {}",
            attribute,
            order.len(),
            len
        )));
    }
    let mut hit = vec![false; len];
    for &i in order {
        match hit.get_mut(i as usize) {
            Some(h) if !*h => *h = true,
            _ => {
                return Err(MeshError::Consistency(format!(
                    "{} permutation repeats or overruns index {}",
                    attribute, i
                )));
            }
        }
    }
    Ok(())
}

/// `inverse[order[i]] == i`
pub fn invert(order: &[u32]) -> Vec<u32> {
    let mut inverse = vec![0; order.len()];
    for (new, &old) in order.iter().enumerate() {
        inverse[old as usize] = new as u32;
    }
    inverse
}

/// Position `i` of the result holds `values[order[i]]`
pub fn permute<T: Copy>(values: &[T], order: &[u32]) -> Vec<T> {
    order.iter().map(|&old| values[old as usize]).collect()
}

fn reorder_array(attributes: &mut Attributes, attribute: Attribute, order: &[u32]) {
    match attribute {
        Attribute::Vertex => attributes.vertices = permute(&attributes.vertices, order),
        Attribute::Texcoord => attributes.texcoords = permute(&attributes.texcoords, order),
        Attribute::Normal => attributes.normals = permute(&attributes.normals, order),
    }
}

fn truncate_array(attributes: &mut Attributes, attribute: Attribute, len: usize) {
    match attribute {
        Attribute::Vertex => attributes.vertices.truncate(len),
        Attribute::Texcoord => attributes.texcoords.truncate(len),
        Attribute::Normal => attributes.normals.truncate(len),
    }
}

/// Rewrite every corner's `attribute` index through `inverse`
fn remap(mesh: &mut ChainedMesh, attribute: Attribute, inverse: &[u32]) {
    let triangles = mesh.objects.iter_mut().flat_map(|o| &mut o.chains).flat_map(|c| {
        std::iter::once(&mut c.seed).chain(c.links.iter_mut().map(|(_, t)| t))
    });
    for triangle in triangles {
        for corner in triangle.iter_mut() {
            *corner = corner.with(attribute, inverse[corner.get(attribute) as usize]);
        }
    }
}

/// Replay the chains and count the distinct indices, which must show up in
/// increasing order
fn referenced_len(mesh: &ChainedMesh, attribute: Attribute) -> MeshResult<usize> {
    let mut next = 0u32;
    for corner in mesh.emitted_corners() {
        let index = corner.get(attribute);
        if index > next {
            return Err(MeshError::Consistency(format!(
                "{} index {} seen before index {}",
                attribute, index, next
            )));
        }
        if index == next {
            next += 1;
        }
    }
    Ok(next as usize)
}
