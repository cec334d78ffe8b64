//! OBJ -> chained mesh conversion pipeline
//!
//! load -> normals -> (winding flip) -> chain -> reindex -> bounds -> styles
//! -> encode. Output is rendered into memory first, so a failed conversion
//! never leaves a partial file behind.

use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use chainmesh_format::{MESH_BIN_EXT, MESH_HEADER_EXT};

use crate::codec::{
    check_capacity, encode_binary, estimated_size_kib, face_layout, face_word_count, write_text,
    PreparedModel, TextVariant,
};
use crate::error::{MeshError, MeshResult};
use crate::mesh::{
    build_chains, fix_normals, load_obj, object_bounds, parse_obj, recenter_and_rescale, reindex,
    reverse_winding, ChainedMesh, ChainedObject, SourceMesh,
};
use crate::style::StyleProvider;

/// Output representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitFormat {
    /// C++ header for tgx
    #[default]
    Cpp,
    /// C header with flat float arrays
    C,
    /// Single-object binary blob
    Binary,
}

impl EmitFormat {
    /// Extension of files written in this format
    pub fn extension(self) -> &'static str {
        match self {
            EmitFormat::Cpp | EmitFormat::C => MESH_HEADER_EXT,
            EmitFormat::Binary => MESH_BIN_EXT,
        }
    }

    /// Text formats name C symbols after the model
    pub fn needs_identifier(self) -> bool {
        !matches!(self, EmitFormat::Binary)
    }
}

impl FromStr for EmitFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpp" | "c++" => Ok(EmitFormat::Cpp),
            "c" => Ok(EmitFormat::C),
            "bin" | "binary" => Ok(EmitFormat::Binary),
            other => Err(format!("unknown format {other:?} (expected cpp, c or bin)")),
        }
    }
}

impl fmt::Display for EmitFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmitFormat::Cpp => "cpp",
            EmitFormat::C => "c",
            EmitFormat::Binary => "bin",
        })
    }
}

/// Conversion settings for one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Symbol prefix of the generated arrays and records
    pub model_name: String,
    pub format: EmitFormat,
    /// Center the model and scale it into `[-1, 1]^3`
    pub normalize_scale: bool,
    /// Reverse every triangle and negate every normal
    pub flip_winding: bool,
}

impl ConvertOptions {
    pub fn new(model_name: impl Into<String>, format: EmitFormat) -> Self {
        Self {
            model_name: model_name.into(),
            format,
            normalize_scale: false,
            flip_winding: false,
        }
    }
}

/// Summary of a finished conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub vertex_count: usize,
    pub texcoord_count: usize,
    pub normal_count: usize,
    pub object_count: usize,
    pub triangle_count: usize,
    pub chain_count: usize,
    /// Face words over all objects, terminators included
    pub face_word_count: usize,
    pub estimated_kib: usize,
}

/// A rendered model, ready to be written
#[derive(Debug, Clone)]
pub struct ConvertedModel {
    pub format: EmitFormat,
    pub bytes: Vec<u8>,
    pub stats: ConvertStats,
}

/// Whether `name` can be used as a C identifier
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Turn an arbitrary file stem into a usable C identifier
pub fn sanitize_identifier(stem: &str) -> String {
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        name.insert(0, '_');
    }
    name
}

/// Run every stage after loading and query one style per object
pub fn prepare(
    source: SourceMesh,
    options: &ConvertOptions,
    styles: &mut dyn StyleProvider,
) -> MeshResult<PreparedModel> {
    if options.format.needs_identifier() && !is_c_identifier(&options.model_name) {
        return Err(MeshError::InvalidName(options.model_name.clone()));
    }

    let mut source = fix_normals(source);
    if options.flip_winding {
        source = reverse_winding(source);
    }

    let objects = source
        .objects
        .iter()
        .enumerate()
        .map(|(i, object)| {
            Ok(ChainedObject {
                tag: object.tag.clone(),
                chains: build_chains(&object.triangles, i)?,
            })
        })
        .collect::<MeshResult<Vec<_>>>()?;
    let mut mesh = reindex(ChainedMesh {
        attributes: source.attributes,
        objects,
    })?;
    check_capacity(&mesh.attributes)?;

    let (vertices, bounds) =
        recenter_and_rescale(&mesh.attributes.vertices, options.normalize_scale);
    mesh.attributes.vertices = vertices;
    let object_bounds = object_bounds(&mesh);
    let styles = (0..mesh.objects.len()).map(|i| styles.next(i)).collect();

    Ok(PreparedModel {
        name: options.model_name.clone(),
        mesh,
        bounds,
        object_bounds,
        styles,
    })
}

fn stats(model: &PreparedModel) -> ConvertStats {
    let mesh = &model.mesh;
    let layout = face_layout(&mesh.attributes);
    ConvertStats {
        vertex_count: mesh.attributes.vertices.len(),
        texcoord_count: mesh.attributes.texcoords.len(),
        normal_count: mesh.attributes.normals.len(),
        object_count: mesh.objects.len(),
        triangle_count: mesh.triangle_count(),
        chain_count: mesh.objects.iter().map(|o| o.chains.len()).sum(),
        face_word_count: mesh.objects.iter().map(|o| face_word_count(o, layout)).sum(),
        estimated_kib: estimated_size_kib(mesh),
    }
}

/// Render a prepared model in the requested format
pub fn render(model: &PreparedModel, format: EmitFormat) -> MeshResult<ConvertedModel> {
    let bytes = match format {
        EmitFormat::Binary => encode_binary(model)?.to_bytes(),
        EmitFormat::Cpp | EmitFormat::C => {
            let variant = if format == EmitFormat::Cpp {
                TextVariant::Cpp
            } else {
                TextVariant::C
            };
            let mut out = Vec::new();
            write_text(&mut out, model, variant)?;
            out
        }
    };
    Ok(ConvertedModel {
        format,
        bytes,
        stats: stats(model),
    })
}

fn convert_source(
    source: SourceMesh,
    options: &ConvertOptions,
    styles: &mut dyn StyleProvider,
) -> MeshResult<ConvertedModel> {
    let model = prepare(source, options, styles)?;
    let converted = render(&model, options.format)?;
    let stats = &converted.stats;
    tracing::info!(
        "{}: {} vertices, {} triangles in {} chains over {} objects (~{}kb)",
        options.model_name,
        stats.vertex_count,
        stats.triangle_count,
        stats.chain_count,
        stats.object_count,
        stats.estimated_kib
    );
    Ok(converted)
}

/// Convert an OBJ file in memory
pub fn convert(
    source: &Path,
    options: &ConvertOptions,
    styles: &mut dyn StyleProvider,
) -> MeshResult<ConvertedModel> {
    convert_source(load_obj(source)?, options, styles)
}

/// Convert OBJ text held in memory
pub fn convert_str(
    source: &str,
    options: &ConvertOptions,
    styles: &mut dyn StyleProvider,
) -> MeshResult<ConvertedModel> {
    convert_reader(source.as_bytes(), options, styles)
}

/// Convert OBJ text from any buffered reader
pub fn convert_reader<R: BufRead>(
    reader: R,
    options: &ConvertOptions,
    styles: &mut dyn StyleProvider,
) -> MeshResult<ConvertedModel> {
    convert_source(parse_obj(reader)?, options, styles)
}

/// Convert an OBJ file and write the result to `output`
///
/// The output file is only created once the conversion succeeded.
pub fn convert_to_file(
    source: &Path,
    output: &Path,
    options: &ConvertOptions,
    styles: &mut dyn StyleProvider,
) -> MeshResult<ConvertedModel> {
    let converted = convert(source, options, styles)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, &converted.bytes)?;
    Ok(converted)
}
