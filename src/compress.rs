//! Block-gzip (BGZF) compression.
//!
//! The writer only needs "compress this file into that file"; the built-in
//! implementation uses noodles' BGZF writer and [`ExternalBgzip`] runs a
//! `bgzip` executable. Both produce output readable by standard indexed-gzip
//! tools.

use crate::error::{FfError, Result};
use noodles::bgzf;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Compress a file into block-gzip format.
pub trait BlockCompressor {
    /// Compress `src` into `dst`, truncating `dst`.
    fn compress(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// In-process BGZF compression.
#[derive(Debug, Clone, Copy, Default)]
pub struct BgzfCompressor;

impl BlockCompressor for BgzfCompressor {
    fn compress(&self, src: &Path, dst: &Path) -> Result<()> {
        let mut reader = BufReader::new(File::open(src)?);
        let mut writer = bgzf::Writer::new(File::create(dst)?);

        io::copy(&mut reader, &mut writer)
            .map_err(|e| FfError::Compression(format!("{}: {}", src.display(), e)))?;

        let file = writer
            .finish()
            .map_err(|e| FfError::Compression(format!("{}: {}", dst.display(), e)))?;
        file.sync_all()?;
        Ok(())
    }
}

/// Compression by an external `bgzip` executable (`bgzip -c src > dst`).
#[derive(Debug, Clone)]
pub struct ExternalBgzip {
    pub program: PathBuf,
}

impl ExternalBgzip {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ExternalBgzip {
    fn default() -> Self {
        Self::new("bgzip")
    }
}

impl BlockCompressor for ExternalBgzip {
    fn compress(&self, src: &Path, dst: &Path) -> Result<()> {
        let output = File::create(dst)?;
        let result = Command::new(&self.program)
            .arg("-c")
            .arg(src)
            .stdout(Stdio::from(output))
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                FfError::Compression(format!("failed to run {}: {}", self.program.display(), e))
            })?;

        if !result.status.success() {
            return Err(FfError::Compression(format!(
                "{} exited with {}: {}",
                self.program.display(),
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }
        Ok(())
    }
}
