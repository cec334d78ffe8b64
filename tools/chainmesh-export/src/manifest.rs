//! chainmesh.toml manifest parsing and batch builds
//!
//! ```toml
//! [output]
//! dir = "build"
//!
//! [[models]]
//! id = "teapot"
//! path = "assets/teapot.obj"
//! format = "bin"
//! normalize = true
//!
//! [[models.objects]]
//! color = [1.0, 0.0, 0.0]
//! lighting = [0.1, 0.7, 0.6, 32]
//! ```

use anyhow::{bail, Context, Result};
use hashbrown::HashSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::convert::{convert_to_file, is_c_identifier, ConvertOptions, EmitFormat};
use crate::style::{Lighting, ObjectStyle, StyleList};

/// Manifest file name looked up by default
pub const DEFAULT_MANIFEST: &str = "chainmesh.toml";

/// Output directory used when the manifest names none
const DEFAULT_OUTPUT_DIR: &str = "build";

/// chainmesh.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct ChainmeshManifest {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub models: Vec<ModelEntry>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Output section
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    /// Output directory, relative to the manifest
    pub dir: Option<String>,
}

/// Single model entry
#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    /// Model name: symbol prefix and output file stem
    pub id: String,
    /// Source OBJ, relative to the manifest
    pub path: String,

    /// cpp | c | bin. Default: cpp
    #[serde(default)]
    pub format: Option<String>,

    /// Center and scale into the unit cube. Default: false
    #[serde(default)]
    pub normalize: bool,

    /// Reverse triangle winding. Default: false
    #[serde(default)]
    pub flip_winding: bool,

    /// Per-object style overrides, in object order
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
}

/// Style override for one object; missing fields keep the default
#[derive(Debug, Default, Deserialize)]
pub struct ObjectEntry {
    pub color: Option<Vec<f32>>,
    pub lighting: Option<Vec<f32>>,
}

impl ObjectEntry {
    fn style(&self) -> Result<ObjectStyle> {
        let mut style = ObjectStyle::default();
        if let Some(color) = &self.color {
            style.color = <[f32; 3]>::try_from(color.as_slice()).map_err(|_| {
                anyhow::anyhow!("color needs 3 components, got {}", color.len())
            })?;
        }
        if let Some(lighting) = &self.lighting {
            let values = <[f32; 4]>::try_from(lighting.as_slice()).map_err(|_| {
                anyhow::anyhow!(
                    "lighting needs 4 components (ambient, diffuse, specular, exponent), got {}",
                    lighting.len()
                )
            })?;
            if values[3] < 0.0 {
                bail!("lighting exponent must not be negative, got {}", values[3]);
            }
            style.lighting = Lighting::from_array(values);
        }
        Ok(style)
    }
}

impl ModelEntry {
    pub fn emit_format(&self) -> Result<EmitFormat> {
        match &self.format {
            Some(f) => f
                .parse()
                .map_err(|e: String| anyhow::anyhow!("model '{}': {}", self.id, e)),
            None => Ok(EmitFormat::default()),
        }
    }

    pub fn options(&self) -> Result<ConvertOptions> {
        Ok(ConvertOptions {
            model_name: self.id.clone(),
            format: self.emit_format()?,
            normalize_scale: self.normalize,
            flip_winding: self.flip_winding,
        })
    }

    pub fn styles(&self) -> Result<StyleList> {
        let styles = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| {
                o.style()
                    .with_context(|| format!("model '{}', object {}", self.id, i + 1))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(StyleList::new(styles))
    }
}

impl ChainmeshManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let mut manifest = Self::parse(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse chainmesh.toml")
    }

    /// Validate manifest fields
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            tracing::warn!("manifest declares no models");
        }

        let mut seen = HashSet::new();
        for model in &self.models {
            if model.id.is_empty() {
                bail!("Model with path '{}' has an empty id", model.path);
            }
            if !is_c_identifier(&model.id) {
                bail!(
                    "Invalid model id '{}' (must be a C identifier: letters, digits, '_')",
                    model.id
                );
            }
            if !seen.insert(model.id.as_str()) {
                bail!("Duplicate model id '{}'", model.id);
            }
            model.emit_format()?;
            model.styles()?;
        }
        Ok(())
    }

    /// Output directory, relative to the manifest unless overridden
    pub fn output_dir(&self, output_override: Option<&Path>) -> PathBuf {
        match output_override {
            Some(dir) => dir.to_path_buf(),
            None => self
                .base_dir
                .join(self.output.dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)),
        }
    }
}

/// Load manifest from file
pub fn load_manifest(path: &Path) -> Result<ChainmeshManifest> {
    ChainmeshManifest::load(path)
}

/// Validate manifest without building
pub fn validate(manifest: &ChainmeshManifest) -> Result<()> {
    manifest.validate()
}

/// Convert every model of the manifest, returning the written files
pub fn build_all(
    manifest: &ChainmeshManifest,
    output_override: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    manifest.validate()?;

    let output_dir = manifest.output_dir(output_override);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut written = Vec::with_capacity(manifest.models.len());
    for model in &manifest.models {
        let options = model.options()?;
        let mut styles = model.styles()?;
        let input = manifest.base_dir.join(&model.path);
        let output = output_dir
            .join(&model.id)
            .with_extension(options.format.extension());

        tracing::info!("Converting {:?} -> {:?}", input, output);
        convert_to_file(&input, &output, &options, &mut styles)
            .with_context(|| {
                format!("Failed to convert model '{}' ({})", model.id, input.display())
            })?;
        written.push(output);
    }
    Ok(written)
}
