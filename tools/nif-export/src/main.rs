//! nif-export - NIF scene to glTF batch converter
//!
//! `batch` walks an asset directory and launches one `convert` worker per
//! scene file plus one image tool process per texture.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nif_export::batch::{self, BatchRequest, WorkerOptions};
use nif_export::{convert_file, ConvertContext, ConvertRequest, ExportConfig, JsonSceneReader};

#[derive(Parser)]
#[command(name = "nif-export")]
#[command(about = "NIF scene to glTF batch converter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every scene and texture under an input directory
    Batch {
        /// Directory containing "meshes" and "textures" folders
        input: PathBuf,

        /// Directory receiving the mirrored output structure
        output: PathBuf,

        /// Maximum concurrent mesh jobs (texture jobs get a multiple of this)
        max_jobs: usize,

        /// Path to nif-export.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pipe alpha state into metalness for Unreal importers
        #[arg(short, long)]
        unreal: bool,

        /// Write single-file .glb documents
        #[arg(long)]
        glb: bool,

        /// Do not convert textures
        #[arg(long)]
        skip_textures: bool,
    },

    /// Convert a single scene file
    Convert {
        /// Scene file to convert
        path: PathBuf,

        /// Directory texture references are resolved from
        tex_root: PathBuf,

        /// Directory containing the input structure
        in_root: PathBuf,

        /// Directory containing the output structure
        out_root: PathBuf,

        /// Path to nif-export.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pipe alpha state into metalness for Unreal importers
        #[arg(short, long)]
        unreal: bool,

        /// Write a single-file .glb document
        #[arg(long)]
        glb: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Batch {
            input,
            output,
            max_jobs,
            config,
            unreal,
            glb,
            skip_textures,
        } => {
            let export_config = ExportConfig::load_or_default(config.as_deref())?;
            let worker = std::env::current_exe().context("Failed to locate nif-export binary")?;

            tracing::info!("Converting {:?} -> {:?}", input, output);
            let request = BatchRequest {
                input_root: input,
                output_root: output,
                max_jobs,
                worker,
                options: WorkerOptions {
                    config,
                    unreal,
                    glb,
                },
                skip_textures,
            };
            let report = batch::run_batch(&export_config, &request)?;

            tracing::info!(
                "Meshes: {} converted, {} failed; textures: {} converted, {} failed, {} skipped",
                report.meshes.succeeded,
                report.meshes.failed,
                report.textures.succeeded,
                report.textures.failed,
                report.textures_skipped
            );
            if report.failed() > 0 {
                anyhow::bail!("{} jobs failed", report.failed());
            }
            tracing::info!("Done!");
        }

        Commands::Convert {
            path,
            tex_root,
            in_root,
            out_root,
            config,
            unreal,
            glb,
        } => {
            let export_config = ExportConfig::load_or_default(config.as_deref())?;
            let context = ConvertContext::new(export_config, unreal, glb);
            let request = ConvertRequest {
                source: path,
                texture_root: tex_root,
                input_root: in_root,
                output_root: out_root,
            };
            convert_file(&context, &request, &JsonSceneReader)
                .with_context(|| format!("Failed to convert {}", request.source.display()))?;
        }
    }

    Ok(())
}
