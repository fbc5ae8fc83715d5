//! nif-export.toml configuration
//!
//! Every field is optional; a missing file yields the defaults below.
//!
//! ```toml
//! element_alignment = 12
//! normal_fixup = "preserve"
//! emissive_factor = [1.0, 1.0, 1.0]
//! source_extension = "nif.json"
//! exclude_dirs = ["actors", "animobjects"]
//! texture_job_multiplier = 2
//! output_format = "gltf"
//!
//! [texture_tool]
//! program = "vips"
//! args = ["affine", "{input}", "{output}", "1 0 0 1"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::ExportError;
use crate::mesh::{NormalFixup, DEFAULT_ELEMENT_ALIGNMENT};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "nif-export.toml";

/// Output container for converted documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `.gltf` JSON plus a co-located `.bin` blob
    #[default]
    Gltf,
    /// Single `.glb` container
    Glb,
}

/// External image tool used for texture conversion
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextureToolConfig {
    /// Executable name or path (resolved through PATH)
    pub program: String,
    /// Arguments; `{input}` and `{output}` are substituted per texture
    pub args: Vec<String>,
}

impl Default for TextureToolConfig {
    fn default() -> Self {
        Self {
            program: "vips".to_string(),
            args: vec![
                "affine".to_string(),
                "{input}".to_string(),
                "{output}".to_string(),
                "1 0 0 1".to_string(),
            ],
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Vertex and index counts are padded to a multiple of this
    pub element_alignment: usize,
    /// Treatment of normals that are not unit length
    pub normal_fixup: NormalFixup,
    /// Emissive factor written to every material (clamped to [0, 1])
    pub emissive_factor: [f32; 3],
    /// Extension of source scene files, without the leading dot
    pub source_extension: String,
    /// Extension of source textures, without the leading dot
    pub texture_extension: String,
    /// Directory names skipped during discovery
    pub exclude_dirs: Vec<String>,
    /// Texture pool cap = mesh cap * multiplier
    pub texture_job_multiplier: usize,
    pub output_format: OutputFormat,
    pub texture_tool: TextureToolConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            element_alignment: DEFAULT_ELEMENT_ALIGNMENT,
            normal_fixup: NormalFixup::default(),
            emissive_factor: [1.0, 1.0, 1.0],
            source_extension: "nif.json".to_string(),
            texture_extension: "dds".to_string(),
            exclude_dirs: vec!["actors".to_string(), "animobjects".to_string()],
            texture_job_multiplier: 2,
            output_format: OutputFormat::default(),
            texture_tool: TextureToolConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("In config file {}", path.display()))
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse nif-export.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config, else `nif-export.toml` if present, else defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    tracing::info!("Using config {}", fallback.display());
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        // Odd alignments would leave u16 index views off a 4-byte boundary.
        if self.element_alignment == 0 || self.element_alignment % 2 != 0 {
            return Err(ExportError::Config(format!(
                "element_alignment must be a positive even number, got {}",
                self.element_alignment
            )));
        }
        if self.texture_job_multiplier == 0 {
            return Err(ExportError::Config(
                "texture_job_multiplier must be at least 1".to_string(),
            ));
        }
        if self.texture_tool.program.trim().is_empty() {
            return Err(ExportError::Config(
                "texture_tool.program must not be empty".to_string(),
            ));
        }
        if self.source_extension.trim_start_matches('.').is_empty() {
            return Err(ExportError::Config(
                "source_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamped emissive factor
    pub fn emissive(&self) -> [f32; 3] {
        self.emissive_factor.map(|f| f.clamp(0.0, 1.0))
    }
}
