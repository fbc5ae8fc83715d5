//! Child-process jobs for mesh workers and texture conversion

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::pool::Job;
use crate::config::TextureToolConfig;

/// Runs one external program and waits for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessJob {
    label: String,
    program: PathBuf,
    args: Vec<OsString>,
    /// Created before launch (tools that do not create their output dir)
    output_dir: Option<PathBuf>,
}

impl ProcessJob {
    pub fn new(label: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            output_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl Job for ProcessJob {
    fn label(&self) -> &str {
        &self.label
    }

    fn run(self) -> Result<()> {
        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let status = self
            .command()
            .status()
            .with_context(|| format!("Failed to launch {}", self.program.display()))?;
        if !status.success() {
            bail!("{} exited with {}", self.program.display(), status);
        }
        Ok(())
    }
}

/// Options forwarded from `batch` to every `convert` worker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerOptions {
    pub config: Option<PathBuf>,
    pub unreal: bool,
    pub glb: bool,
}

/// `nif-export convert <path> <tex_root> <in_root> <out_root> ...`
pub fn mesh_job(
    worker: &Path,
    source: &Path,
    texture_root: &Path,
    input_root: &Path,
    output_root: &Path,
    options: &WorkerOptions,
) -> ProcessJob {
    let label = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());

    let mut job = ProcessJob::new(label, worker)
        .arg("convert")
        .arg(source)
        .arg(texture_root)
        .arg(input_root)
        .arg(output_root);
    if let Some(config) = &options.config {
        job = job.arg("--config").arg(config);
    }
    if options.unreal {
        job = job.arg("--unreal");
    }
    if options.glb {
        job = job.arg("--glb");
    }
    job
}

/// External image tool invocation with `{input}` / `{output}` substituted
pub fn texture_job(tool: &TextureToolConfig, program: &Path, input: &Path, output: &Path) -> ProcessJob {
    let label = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let mut job = ProcessJob::new(label, program);
    for arg in &tool.args {
        job = match arg.as_str() {
            "{input}" => job.arg(input),
            "{output}" => job.arg(output),
            other => job.arg(
                other
                    .replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy()),
            ),
        };
    }
    if let Some(parent) = output.parent() {
        job = job.output_dir(parent);
    }
    job
}

/// Resolve the texture tool through PATH, falling back to the bare name
pub fn resolve_program(program: &str) -> PathBuf {
    match which::which(program) {
        Ok(path) => path,
        Err(_) => {
            tracing::warn!("{} not found in PATH, texture jobs will likely fail", program);
            PathBuf::from(program)
        }
    }
}
