//! Fragment records and the tab-delimited fragment file reader.
//!
//! A fragment file has exactly five tab-separated columns and no header:
//! `chrom  start  end  cellBarcode  duplicates`. Input may be plain text,
//! gzip, or BGZF; compression is detected from the gzip magic bytes.

use crate::error::{FfError, Result};
use flate2::read::MultiGzDecoder;
use memchr::memchr_iter;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Number of columns in a fragment row.
pub const FRAGMENT_COLUMNS: usize = 5;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A single fragment: a mapped read-pair span tagged with its cell barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub cell_barcode: String,
    pub duplicates: u64,
}

impl FragmentRecord {
    /// Create a new fragment record.
    #[inline]
    pub fn new(
        chrom: impl Into<String>,
        start: u64,
        end: u64,
        cell_barcode: impl Into<String>,
        duplicates: u64,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            cell_barcode: cell_barcode.into(),
            duplicates,
        }
    }
}

impl fmt::Display for FragmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.chrom, self.start, self.end, self.cell_barcode, self.duplicates
        )
    }
}

/// A streaming fragment file reader.
pub struct FragmentReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: String,
}

impl FragmentReader<Box<dyn Read + Send>> {
    /// Open a fragment file, decompressing it if it starts with the gzip magic.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(open_input(path.as_ref())?))
    }
}

impl<R: Read> FragmentReader<R> {
    /// Create a new fragment reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::with_capacity(256),
        }
    }

    /// Read the next fragment, skipping blank lines.
    pub fn read_record(&mut self) -> Result<Option<FragmentRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }

            return self.parse_line(line).map(Some);
        }
    }

    fn parse_line(&self, line: &str) -> Result<FragmentRecord> {
        let fields = split_fields(line).ok_or_else(|| FfError::Parse {
            line: self.line_number,
            message: format!(
                "Expected {} tab-separated fields, got {}",
                FRAGMENT_COLUMNS,
                line.split('\t').count()
            ),
        })?;

        Ok(FragmentRecord {
            chrom: fields[0].to_string(),
            start: self.parse_integer(fields[1], "start")?,
            end: self.parse_integer(fields[2], "end")?,
            cell_barcode: fields[3].to_string(),
            duplicates: self.parse_integer(fields[4], "duplicates")?,
        })
    }

    fn parse_integer(&self, s: &str, field_name: &str) -> Result<u64> {
        s.parse().map_err(|_| FfError::Parse {
            line: self.line_number,
            message: format!("Invalid {} value: '{}'", field_name, s),
        })
    }

    /// Get an iterator over all records.
    pub fn records(self) -> FragmentIter<R> {
        FragmentIter { reader: self }
    }
}

/// Split a row into exactly [`FRAGMENT_COLUMNS`] fields.
#[inline]
fn split_fields(line: &str) -> Option<[&str; FRAGMENT_COLUMNS]> {
    let mut fields = [""; FRAGMENT_COLUMNS];
    let mut field_start = 0;
    let mut idx = 0;

    for tab in memchr_iter(b'\t', line.as_bytes()) {
        if idx == FRAGMENT_COLUMNS - 1 {
            return None;
        }
        fields[idx] = &line[field_start..tab];
        field_start = tab + 1;
        idx += 1;
    }

    if idx != FRAGMENT_COLUMNS - 1 {
        return None;
    }
    fields[idx] = &line[field_start..];
    Some(fields)
}

/// Iterator over fragment records.
pub struct FragmentIter<R: Read> {
    reader: FragmentReader<R>,
}

impl<R: Read> Iterator for FragmentIter<R> {
    type Item = Result<FragmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Open an input file, transparently decoding gzip and BGZF.
///
/// BGZF is a series of gzip members, so `MultiGzDecoder` handles both.
pub fn open_input(path: &Path) -> Result<Box<dyn Read + Send>> {
    let mut file = File::open(path)?;

    let mut magic = [0u8; 2];
    let is_gzip = match file.read_exact(&mut magic) {
        Ok(()) => magic == GZIP_MAGIC,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e.into()),
    };
    file.seek(SeekFrom::Start(0))?;

    if is_gzip {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Read all fragments from a file.
pub fn read_fragments<P: AsRef<Path>>(path: P) -> Result<Vec<FragmentRecord>> {
    FragmentReader::from_path(path)?.records().collect()
}

/// Parse fragments from a string (useful for testing).
pub fn parse_fragments(content: &str) -> Result<Vec<FragmentRecord>> {
    FragmentReader::new(content.as_bytes()).records().collect()
}
