//! Single-file conversion: source scene -> glTF document

use std::path::{Path, PathBuf};

use crate::assembler::{DocumentAssembler, OutputPaths};
use crate::config::{ExportConfig, OutputFormat};
use crate::error::Result;
use crate::material::{MaterialResolver, TextureLocations};
use crate::mesh::{AttributeBufferBuilder, AttributeOptions};
use crate::paths::{normalize_lexically, relative_to};
use crate::scene::{SceneReader, SceneTree};
use crate::walker::{SceneGraphWalker, WalkReport};

/// Settings shared by every conversion in one process
#[derive(Debug, Clone)]
pub struct ConvertContext {
    pub config: ExportConfig,
    /// Pipe alpha state into metalness for importers without alpha modes
    pub unreal: bool,
    pub format: OutputFormat,
}

impl ConvertContext {
    /// `glb` forces GLB output regardless of the configured format
    pub fn new(config: ExportConfig, unreal: bool, glb: bool) -> Self {
        let format = if glb {
            OutputFormat::Glb
        } else {
            config.output_format
        };
        Self {
            config,
            unreal,
            format,
        }
    }

    pub fn attribute_options(&self) -> AttributeOptions {
        AttributeOptions {
            alignment: self.config.element_alignment,
            normal_fixup: self.config.normal_fixup,
        }
    }
}

/// Source file plus the three roots that place its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub texture_root: PathBuf,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutcome {
    pub report: WalkReport,
    pub written: Vec<PathBuf>,
}

/// File name without the source extension (`wall.nif.json` -> `wall`)
pub fn document_stem(source: &Path, source_extension: &str) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = format!(".{}", source_extension.trim_start_matches('.'));
    let matches_suffix = name
        .to_ascii_lowercase()
        .ends_with(&suffix.to_ascii_lowercase());
    if name.len() > suffix.len() && matches_suffix {
        name[..name.len() - suffix.len()].to_string()
    } else {
        source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(name)
    }
}

/// `<out_root>/<source dir relative to in_root>/<stem>/<stem>.*`
pub fn output_paths(
    source: &Path,
    input_root: &Path,
    output_root: &Path,
    source_extension: &str,
) -> OutputPaths {
    let stem = document_stem(source, source_extension);
    let source_dir = source.parent().unwrap_or(Path::new(""));
    let document_dir =
        normalize_lexically(&output_root.join(relative_to(source_dir, input_root)).join(&stem));
    OutputPaths::new(document_dir, stem)
}

/// Read, walk and write one source file
pub fn convert_file(
    context: &ConvertContext,
    request: &ConvertRequest,
    reader: &dyn SceneReader,
) -> Result<ConvertOutcome> {
    let paths = output_paths(
        &request.source,
        &request.input_root,
        &request.output_root,
        &context.config.source_extension,
    );

    tracing::info!("Reading {}", request.source.display());
    let tree = SceneTree::from_source(reader.read(&request.source)?);

    let resolver = MaterialResolver::new(
        context.unreal,
        context.config.emissive(),
        TextureLocations {
            texture_root: request.texture_root.clone(),
            input_root: request.input_root.clone(),
            output_root: request.output_root.clone(),
            document_dir: paths.document_dir.clone(),
            source_extension: context.config.texture_extension.clone(),
        },
    );
    let walker = SceneGraphWalker::new(
        AttributeBufferBuilder::new(context.attribute_options()),
        &resolver,
    );

    let mut assembler = DocumentAssembler::new(context.config.element_alignment);
    let report = walker.walk(&tree, &mut assembler);
    if report.meshes_written == 0 {
        tracing::warn!("{} produced no meshes", request.source.display());
    }

    let written = assembler.finish(&paths, context.format)?;
    tracing::info!(
        "File processed: {} ({} meshes, {} skipped)",
        written
            .first()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        report.meshes_written,
        report.nodes_skipped
    );

    Ok(ConvertOutcome { report, written })
}
