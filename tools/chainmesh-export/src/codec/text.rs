//! Source-array emitters (.h)
//!
//! Both variants write the same arrays and one metadata record per object.
//! Records are written last object first so every record can point at the
//! next one to draw.

use std::io::Write;

use super::{
    check_capacity, encode_chains, estimated_size_kib, face_word_count, EncodedChain, PreparedModel,
};
use crate::error::{MeshError, MeshResult};

/// Chained corners per line in face arrays
const LINKS_PER_LINE: usize = 16;

/// Record layout version
const MESH_RECORD_VERSION: u32 = 1;

/// Target dialect of the generated header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextVariant {
    /// `tgx::fVec3` arrays in `PROGMEM`, `tgx::Mesh3D<tgx::RGB565>` records
    Cpp,
    /// Flat `float` arrays placed with `__in_flash()`, `Mesh3D` records
    C,
}

impl TextVariant {
    fn includes(self) -> &'static str {
        match self {
            TextVariant::Cpp => "\n#include <tgx.h>\n",
            TextVariant::C => "",
        }
    }

    /// Declaration head of a float array holding `count` vectors of `N`
    fn float_array_decl<const N: usize>(self, name: &str, count: usize) -> String {
        match self {
            TextVariant::Cpp => format!("const tgx::fVec{} {name}[{count}] PROGMEM = ", N),
            TextVariant::C => format!("const __in_flash() float {name}[{}] = ", count * N),
        }
    }

    fn face_array_decl(self, name: &str, count: usize) -> String {
        match self {
            TextVariant::Cpp => format!("const uint16_t {name}[{count}] PROGMEM = {{"),
            TextVariant::C => format!("const __in_flash() uint16_t {name}[{count}] = {{"),
        }
    }

    fn record_decl(self, name: &str) -> String {
        match self {
            TextVariant::Cpp => format!("const tgx::Mesh3D<tgx::RGB565> {name} PROGMEM = "),
            TextVariant::C => format!("const __in_flash() Mesh3D {name} = "),
        }
    }

    fn float_array<const N: usize>(self, values: &[[f32; N]]) -> String {
        let rows: Vec<String> = values
            .iter()
            .map(|v| {
                let items: Vec<String> = match self {
                    TextVariant::Cpp => v.iter().map(|x| num(*x)).collect(),
                    TextVariant::C => v.iter().map(|x| format!("{}f", num(*x))).collect(),
                };
                match self {
                    TextVariant::Cpp => format!("{{{}}}", items.join(",")),
                    TextVariant::C => items.join(","),
                }
            })
            .collect();
        format!("{{\n{}\n}};\n", rows.join(",\n"))
    }
}

/// Shortest round-trip rendering of a float, always with a decimal point
fn num(v: f32) -> String {
    format!("{v:?}")
}

/// Render `model` as a header in the given variant
pub fn write_text<W: Write>(
    w: &mut W,
    model: &PreparedModel,
    variant: TextVariant,
) -> MeshResult<()> {
    let mesh = &model.mesh;
    let attributes = &mesh.attributes;
    check_capacity(attributes)?;

    let layout = model.layout();
    let encoded = mesh
        .objects
        .iter()
        .map(|o| encode_chains(o, layout))
        .collect::<MeshResult<Vec<_>>>()?;

    let name = &model.name;
    let vert_name = format!("{name}_vert_array");
    let tex_name = if attributes.has_texcoords {
        format!("{name}_tex_array")
    } else {
        "nullptr".to_string()
    };
    let norm_name = if attributes.has_normals {
        format!("{name}_norm_array")
    } else {
        "nullptr".to_string()
    };

    // Summary
    writeln!(w, "// 3D model [{name}]")?;
    writeln!(w, "//")?;
    writeln!(w, "// - vertices   : {}", attributes.vertices.len())?;
    writeln!(w, "// - textures   : {}", attributes.texcoords.len())?;
    writeln!(w, "// - normals    : {}", attributes.normals.len())?;
    writeln!(w, "// - triangles  : {}", mesh.triangle_count())?;
    writeln!(w, "//")?;
    writeln!(w, "// - memory size: {}kb", estimated_size_kib(mesh))?;
    writeln!(w, "//")?;
    let b = model.bounds.to_array();
    writeln!(
        w,
        "// - model bounding box: [{},{}]x[{},{}]x[{},{}]",
        num(b[0]),
        num(b[1]),
        num(b[2]),
        num(b[3]),
        num(b[4]),
        num(b[5])
    )?;
    writeln!(w, "//")?;
    for (i, object) in mesh.objects.iter().enumerate() {
        writeln!(
            w,
            "// object [{}] (tagged [{}]) with {} triangles ({} chains)",
            model.object_name(i),
            object.tag,
            object.triangle_count(),
            object.chains.len()
        )?;
    }
    writeln!(w, "\n#pragma once")?;
    write!(w, "{}", variant.includes())?;

    // Attribute arrays
    write!(
        w,
        "\n\n// vertex array: {}kb.\n",
        attributes.vertices.len() * 12 / 1024
    )?;
    write!(
        w,
        "{}{}",
        variant.float_array_decl::<3>(&vert_name, attributes.vertices.len()),
        variant.float_array(&attributes.vertices)
    )?;
    if attributes.has_texcoords {
        write!(
            w,
            "\n\n// texture array: {}kb.\n{}{}",
            attributes.texcoords.len() * 8 / 1024,
            variant.float_array_decl::<2>(&tex_name, attributes.texcoords.len()),
            variant.float_array(&attributes.texcoords)
        )?;
    }
    if attributes.has_normals {
        write!(
            w,
            "\n\n// normal array: {}kb.\n{}{}",
            attributes.normals.len() * 12 / 1024,
            variant.float_array_decl::<3>(&norm_name, attributes.normals.len()),
            variant.float_array(&attributes.normals)
        )?;
    }
    writeln!(w)?;

    // Face arrays
    for (i, (object, chains)) in mesh.objects.iter().zip(&encoded).enumerate() {
        let expected = face_word_count(object, layout);
        writeln!(w, "\n// face array: {}kb.", expected * 2 / 1024)?;
        writeln!(
            w,
            "{}",
            variant.face_array_decl(&format!("{}_face", model.object_name(i)), expected)
        )?;
        let written = write_face_body(w, chains)?;
        if written != expected {
            return Err(MeshError::Consistency(format!(
                "face array of object {} has {} words, expected {}",
                i, written, expected
            )));
        }
    }

    // Records, last object first
    let object_count = mesh.objects.len();
    for i in (0..object_count).rev() {
        let object = &mesh.objects[i];
        let object_name = model.object_name(i);
        let next = if i + 1 < object_count {
            format!("&{}", model.object_name(i + 1))
        } else {
            "nullptr".to_string()
        };
        let style = model.styles.get(i).copied().unwrap_or_default();
        let lighting = style.lighting;
        let bounds = model.object_bounds.get(i).copied().unwrap_or_default().to_array();

        writeln!(w, "\n// mesh info for object {object_name} (with tag [{}])", object.tag)?;
        writeln!(w, "{}", variant.record_decl(&object_name))?;
        writeln!(w, "    {{")?;
        writeln!(w, "    {}, // version/id", MESH_RECORD_VERSION)?;
        writeln!(w)?;
        writeln!(w, "    {}, // number of vertices", attributes.vertices.len())?;
        writeln!(w, "    {}, // number of texture coords", attributes.texcoords.len())?;
        writeln!(w, "    {}, // number of normal vectors", attributes.normals.len())?;
        writeln!(w, "    {}, // number of triangles", object.triangle_count())?;
        writeln!(w, "    {}, // size of the face array", face_word_count(object, layout))?;
        writeln!(w)?;
        writeln!(w, "    {vert_name}, // array of vertices")?;
        writeln!(w, "    {tex_name}, // array of texture coords")?;
        writeln!(w, "    {norm_name}, // array of normal vectors")?;
        writeln!(w, "    {object_name}_face, // array of face vertex indexes")?;
        writeln!(w)?;
        writeln!(w, "    nullptr, // pointer to texture image")?;
        writeln!(w)?;
        writeln!(
            w,
            "    {{ {}f , {}f, {}f }}, // default color",
            num(style.color[0]),
            num(style.color[1]),
            num(style.color[2])
        )?;
        writeln!(w)?;
        writeln!(w, "    {}f, // ambient light strength", num(lighting.ambient))?;
        writeln!(w, "    {}f, // diffuse light strength", num(lighting.diffuse))?;
        writeln!(w, "    {}f, // specular light strength", num(lighting.specular))?;
        writeln!(w, "    {}, // specular exponent", lighting.exponent)?;
        writeln!(w)?;
        writeln!(w, "    {next}, // next mesh to draw after this one")?;
        writeln!(w)?;
        writeln!(w, "    {{ // mesh bounding box")?;
        for axis in bounds.chunks_exact(2) {
            writeln!(w, "    {}f, {}f,", num(axis[0]), num(axis[1]))?;
        }
        writeln!(w, "    }},")?;
        writeln!(w)?;
        writeln!(w, "    \"{name}\" // model name")?;
        writeln!(w, "    }};")?;
    }

    writeln!(w, "\n/** end of {name}.h */")?;
    Ok(())
}

/// Write the chains and terminator of one face array, returning the number
/// of words written
fn write_face_body<W: Write>(w: &mut W, chains: &[EncodedChain]) -> MeshResult<usize> {
    let mut count = 0;
    let mut corner = |w: &mut W, words: &[u16]| -> MeshResult<()> {
        for word in words {
            write!(w, "{word},")?;
        }
        write!(w, " ")?;
        count += words.len();
        Ok(())
    };

    for (n, chain) in chains.iter().enumerate() {
        writeln!(w, "{}, // chain {}", chain.len, n)?;
        for seed in &chain.seed {
            corner(w, seed.as_slice())?;
        }
        writeln!(w)?;
        for line in chain.links.chunks(LINKS_PER_LINE) {
            for link in line {
                corner(w, link.as_slice())?;
            }
            writeln!(w)?;
        }
    }
    writeln!(w, "\n 0}};")?;

    // One length word per chain plus the terminator
    Ok(count + chains.len() + 1)
}
