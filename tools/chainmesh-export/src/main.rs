//! chainmesh-export - chained-triangle mesh export tool
//!
//! Converts OBJ models to compact chained-triangle meshes (.bin blobs or
//! C/C++ source-array headers)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chainmesh_export::convert::sanitize_identifier;
use chainmesh_export::{
    decode_face_stream, manifest, ConvertOptions, DefaultStyles, EmitFormat, MeshBlob,
};

#[derive(Parser)]
#[command(name = "chainmesh-export")]
#[command(about = "Chained-triangle mesh export tool")]
#[command(version)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single OBJ file
    Convert {
        /// Input OBJ file
        input: PathBuf,

        /// Output file (default: input with .h or .bin extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model name used for generated symbols (default: input file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Output format: cpp, c or bin
        #[arg(short, long, default_value = "cpp")]
        format: EmitFormat,

        /// Center the model and scale it into [-1, 1]^3
        #[arg(long)]
        normalize: bool,

        /// Reverse triangle winding and flip normals
        #[arg(long)]
        flip_winding: bool,
    },

    /// Build models from a manifest file
    Build {
        /// Path to chainmesh.toml manifest
        #[arg(default_value = manifest::DEFAULT_MANIFEST)]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to chainmesh.toml manifest
        #[arg(default_value = manifest::DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },

    /// Print the header and chain statistics of a binary mesh
    Info {
        /// Input .bin file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            name,
            format,
            normalize,
            flip_winding,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(format.extension()));
            let name = name.unwrap_or_else(|| {
                let stem = input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("mesh");
                sanitize_identifier(stem)
            });
            let options = ConvertOptions {
                model_name: name,
                format,
                normalize_scale: normalize,
                flip_winding,
            };

            tracing::info!("Converting {:?} -> {:?}", input, output);
            chainmesh_export::convert_to_file(&input, &output, &options, &mut DefaultStyles)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            tracing::info!("Done!");
        }

        Commands::Build { manifest, output } => {
            tracing::debug!("Building models from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let written = manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete! {} models written", written.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Info { input } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("Failed to read mesh: {}", input.display()))?;
            let blob = MeshBlob::from_bytes(&bytes)
                .with_context(|| format!("Invalid mesh file: {}", input.display()))?;
            let chains = decode_face_stream(&blob.faces, blob.header.layout())
                .with_context(|| format!("Invalid face stream in {}", input.display()))?;

            let h = &blob.header;
            let longest = chains.iter().map(|c| c.triangles.len()).max().unwrap_or(0);
            println!("{}", input.display());
            println!("  vertices   : {} (offset {})", h.vertex_count, h.vertex_offset);
            println!("  texcoords  : {} (offset {})", h.texcoord_count, h.texcoord_offset);
            println!("  normals    : {} (offset {})", h.normal_count, h.normal_offset);
            println!("  triangles  : {}", h.triangle_count);
            println!("  face words : {} (offset {})", h.face_word_count, h.faces_offset);
            println!("  chains     : {} (longest {})", chains.len(), longest);
            println!("  color      : {:?}", h.color);
            println!("  lighting   : {:?}", h.lighting);
            println!("  bounds     : {:?}", h.bounds);
        }
    }

    Ok(())
}
