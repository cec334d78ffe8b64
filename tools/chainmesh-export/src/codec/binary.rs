//! Single-object binary blob (.bin)

use chainmesh_format::{MeshBlob, MeshInfoHeader};

use super::{check_capacity, encode_face_stream, PreparedModel};
use crate::error::{MeshError, MeshResult};

/// Pack a single-object model into a [`MeshBlob`]
///
/// Multi-object models have no binary form; use a text variant instead.
pub fn encode_binary(model: &PreparedModel) -> MeshResult<MeshBlob> {
    let mesh = &model.mesh;
    check_capacity(&mesh.attributes)?;

    let object = match mesh.objects.as_slice() {
        [object] => object,
        [] => return Err(MeshError::NoFaces),
        objects => return Err(MeshError::MultipleObjects(objects.len())),
    };
    let faces = encode_face_stream(object, model.layout())?;

    let style = model.styles.first().copied().unwrap_or_default();
    let bounds = model.object_bounds.first().copied().unwrap_or_default();
    let header = MeshInfoHeader {
        triangle_count: object.triangle_count() as u32,
        color: style.color,
        lighting: style.lighting.to_array(),
        bounds: bounds.to_array(),
        ..Default::default()
    };

    let attributes = &mesh.attributes;
    Ok(MeshBlob::new(
        header,
        attributes.vertices.clone(),
        attributes.texcoords.clone(),
        attributes.normals.clone(),
        faces,
    ))
}
