//! Run configuration, validated before any file is touched.

use crate::error::{FfError, Result};
use crate::genome::GenomeBuild;
use crate::output::OutputFormat;
use std::path::PathBuf;

/// Default parent directory for run output directories.
pub const DEFAULT_OUTPUT_ROOT: &str = "ff_outs";

/// Name of the run log written next to the output file.
pub const LOG_FILE_NAME: &str = "wf.log";

/// Characters not allowed anywhere in a run id or output directory name.
const FORBIDDEN_CHARS: [char; 3] = ['/', '-', '.'];

/// Check a run id or output directory name.
///
/// Names must be non-empty and contain no `/`, `-`, `.`, or whitespace.
pub fn validate_name(field: &'static str, value: &str) -> Result<()> {
    let invalid = |reason: String| FfError::InvalidName {
        field,
        value: value.to_string(),
        reason,
    };

    if value.is_empty() {
        return Err(invalid("must not be empty".to_string()));
    }
    if let Some(c) = value
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_whitespace())
    {
        return Err(invalid(format!(
            "cannot start with or contain a '/', dash (-), period (.) or whitespace (found {:?})",
            c
        )));
    }
    Ok(())
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Fragment file to filter
    pub input: PathBuf,
    /// Output file name prefix
    pub run_id: String,
    pub genome: GenomeBuild,
    pub output_format: OutputFormat,
    /// Output directory name, created under `output_root`
    pub output_dir: String,
    pub output_root: PathBuf,
    /// Load chrom sizes from this file instead of the bundled one
    pub chrom_sizes: Option<PathBuf>,
    /// Compress with this external bgzip instead of the built-in writer
    pub bgzip: Option<PathBuf>,
}

impl RunConfig {
    /// Build a validated configuration.
    pub fn new(
        input: impl Into<PathBuf>,
        run_id: impl Into<String>,
        genome: GenomeBuild,
        output_format: OutputFormat,
        output_dir: impl Into<String>,
    ) -> Result<Self> {
        let run_id = run_id.into();
        let output_dir = output_dir.into();
        validate_name("run id", &run_id)?;
        validate_name("output directory", &output_dir)?;

        Ok(Self {
            input: input.into(),
            run_id,
            genome,
            output_format,
            output_dir,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            chrom_sizes: None,
            bgzip: None,
        })
    }

    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    pub fn with_chrom_sizes(mut self, path: Option<PathBuf>) -> Self {
        self.chrom_sizes = path;
        self
    }

    pub fn with_bgzip(mut self, program: Option<PathBuf>) -> Self {
        self.bgzip = program;
        self
    }

    /// Directory receiving the output file and log.
    pub fn output_path(&self) -> PathBuf {
        self.output_root.join(&self.output_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_path().join(LOG_FILE_NAME)
    }
}
