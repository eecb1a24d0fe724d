//! Fragment output in `aln.bed` or `fragments.tsv.gz` form.
//!
//! Output is staged in a temporary file next to its destination and renamed
//! into place only after every byte has been written, so a failed run leaves
//! no partial output behind.

use crate::compress::BlockCompressor;
use crate::error::{FfError, Result};
use crate::fragment::FragmentRecord;
use clap::ValueEnum;
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Output buffer size (2 MB).
const DEFAULT_BUFFER_SIZE: usize = 2 * 1024 * 1024;

/// Suffix appended to every barcode in `fragments.tsv.gz` output.
pub const BARCODE_SUFFIX: &str = "-1";

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum OutputFormat {
    /// Plain tab-delimited rows, barcodes unchanged
    #[value(name = "aln.bed")]
    AlnBed,
    /// BGZF-compressed rows with `-1` appended to each barcode
    #[value(name = "fragments.tsv.gz")]
    FragmentsTsvGz,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::AlnBed => "aln.bed",
            OutputFormat::FragmentsTsvGz => "fragments.tsv.gz",
        }
    }

    /// Output file name for a run prefix.
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}_ff_{}", prefix, self.as_str())
    }

    /// Suffix appended to each barcode, if any.
    pub fn barcode_suffix(&self) -> Option<&'static str> {
        match self {
            OutputFormat::AlnBed => None,
            OutputFormat::FragmentsTsvGz => Some(BARCODE_SUFFIX),
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, OutputFormat::FragmentsTsvGz)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buffered fragment row writer.
///
/// Integers are formatted with itoa to avoid allocation per row.
pub struct FragmentWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    barcode_suffix: Option<&'static str>,
}

impl<W: Write> FragmentWriter<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            barcode_suffix: None,
        }
    }

    /// Append `suffix` to every barcode written.
    pub fn with_barcode_suffix(mut self, suffix: Option<&'static str>) -> Self {
        self.barcode_suffix = suffix;
        self
    }

    /// Write one fragment as a tab-delimited line.
    #[inline]
    pub fn write_record(&mut self, record: &FragmentRecord) -> Result<()> {
        self.writer.write_all(record.chrom.as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer
            .write_all(self.itoa_buf.format(record.start).as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer
            .write_all(self.itoa_buf.format(record.end).as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(record.cell_barcode.as_bytes())?;
        if let Some(suffix) = self.barcode_suffix {
            self.writer.write_all(suffix.as_bytes())?;
        }
        self.writer.write_all(b"\t")?;
        self.writer
            .write_all(self.itoa_buf.format(record.duplicates).as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn write_records(&mut self, records: &[FragmentRecord]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| FfError::Io(e.into_error()))
    }
}

fn staging_file(dir: &Path) -> Result<NamedTempFile> {
    Ok(tempfile::Builder::new().prefix(".ff-").tempfile_in(dir)?)
}

fn persist(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged.persist(path).map_err(|e| FfError::Io(e.error))?;
    Ok(())
}

/// Write fragments to `{dir}/{prefix}_ff_{format}` and return the path.
pub fn write_fragments(
    records: &[FragmentRecord],
    format: OutputFormat,
    prefix: &str,
    dir: &Path,
    compressor: &dyn BlockCompressor,
) -> Result<PathBuf> {
    let path = dir.join(format.file_name(prefix));

    let mut rows = staging_file(dir)?;
    {
        let mut writer = FragmentWriter::new(rows.as_file_mut())
            .with_barcode_suffix(format.barcode_suffix());
        writer.write_records(records)?;
        writer.into_inner()?.sync_all()?;
    }

    if format.is_compressed() {
        let compressed = staging_file(dir)?;
        compressor.compress(rows.path(), compressed.path())?;
        persist(compressed, &path)?;
    } else {
        persist(rows, &path)?;
    }

    Ok(path)
}
