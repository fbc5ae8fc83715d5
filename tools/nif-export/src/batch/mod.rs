//! Batch conversion: discovery plus two bounded job pools

mod jobs;
mod pool;

pub use jobs::{mesh_job, resolve_program, texture_job, ProcessJob, WorkerOptions};
pub use pool::{Job, JobPool, PoolReport};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::thread;
use walkdir::WalkDir;

use crate::config::ExportConfig;
use crate::paths::texture_output_path;

/// Subdirectory of the input root holding scene files
pub const MESHES_DIR: &str = "meshes";
/// Subdirectory of the input root holding textures
pub const TEXTURES_DIR: &str = "textures";

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    /// Mesh pool cap; textures get `max_jobs * texture_job_multiplier`
    pub max_jobs: usize,
    /// Executable launched for every `convert` job
    pub worker: PathBuf,
    pub options: WorkerOptions,
    pub skip_textures: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub meshes: PoolReport,
    pub textures: PoolReport,
    /// Textures whose output already existed
    pub textures_skipped: usize,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.meshes.failed + self.textures.failed
    }
}

/// Files under `root` whose name ends in `.<extension>`, sorted
///
/// Directories named in `exclude` (case-insensitive) are not entered.
pub fn discover(root: &Path, extension: &str, exclude: &[String]) -> Vec<PathBuf> {
    let suffix = format!(".{}", extension.trim_start_matches('.').to_lowercase());
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !is_excluded(&entry.file_name().to_string_lossy(), exclude)
        })
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .ends_with(&suffix)
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn is_excluded(dir_name: &str, exclude: &[String]) -> bool {
    exclude
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(dir_name))
}

/// Texture (source, output) pairs still to convert, plus the count skipped
pub fn plan_textures(
    config: &ExportConfig,
    input_root: &Path,
    output_root: &Path,
) -> (Vec<(PathBuf, PathBuf)>, usize) {
    let mut planned = Vec::new();
    let mut skipped = 0;
    for source in discover(
        &input_root.join(TEXTURES_DIR),
        &config.texture_extension,
        &config.exclude_dirs,
    ) {
        let output =
            texture_output_path(&source, input_root, output_root, &config.texture_extension);
        if output.exists() {
            tracing::debug!("Skipping {}, output exists", source.display());
            skipped += 1;
        } else {
            planned.push((source, output));
        }
    }
    (planned, skipped)
}

/// Convert every scene and texture under the input root
///
/// Mesh and texture pools run concurrently and independently; a failed job
/// is counted in the report, never retried.
pub fn run_batch(config: &ExportConfig, request: &BatchRequest) -> Result<BatchReport> {
    if !request.input_root.is_dir() {
        anyhow::bail!("Input root {} is not a directory", request.input_root.display());
    }
    std::fs::create_dir_all(&request.output_root).with_context(|| {
        format!("Failed to create output root {}", request.output_root.display())
    })?;

    let meshes_root = request.input_root.join(MESHES_DIR);
    if !meshes_root.is_dir() {
        tracing::warn!("No {} directory under {}", MESHES_DIR, request.input_root.display());
    }
    let sources = discover(&meshes_root, &config.source_extension, &config.exclude_dirs);
    tracing::info!("Found {} scene files", sources.len());

    let mesh_jobs: Vec<ProcessJob> = sources
        .iter()
        .map(|source| {
            mesh_job(
                &request.worker,
                source,
                &request.input_root,
                &request.input_root,
                &request.output_root,
                &request.options,
            )
        })
        .collect();

    let (texture_jobs, textures_skipped) = if request.skip_textures {
        (Vec::new(), 0)
    } else {
        let (planned, skipped) =
            plan_textures(config, &request.input_root, &request.output_root);
        tracing::info!(
            "Found {} textures to convert ({} already converted)",
            planned.len(),
            skipped
        );
        let jobs = if planned.is_empty() {
            Vec::new()
        } else {
            let program = resolve_program(&config.texture_tool.program);
            planned
                .iter()
                .map(|(input, output)| texture_job(&config.texture_tool, &program, input, output))
                .collect()
        };
        (jobs, skipped)
    };

    let mesh_pool = JobPool::new("meshes", request.max_jobs);
    let texture_pool = JobPool::new(
        "textures",
        request.max_jobs.saturating_mul(config.texture_job_multiplier),
    );

    let (meshes, textures) = thread::scope(|scope| {
        let textures = scope.spawn(|| texture_pool.run(texture_jobs));
        let meshes = mesh_pool.run(mesh_jobs);
        (meshes, textures.join())
    });
    let textures = textures
        .map_err(|_| anyhow::anyhow!("Texture scheduler thread panicked"))?;

    Ok(BatchReport {
        meshes,
        textures,
        textures_skipped,
    })
}
