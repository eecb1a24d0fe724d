//! Chromosome-size registry.
//!
//! Each supported reference build ships a chrom sizes file
//! (whitespace-separated: `name length`, no header). The bundled files are
//! compiled into the binary and parsed with the same strict parser used for
//! files on disk.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::error::{FfError, Result};

/// Reference genome builds with a bundled chrom sizes file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum GenomeBuild {
    Hg38,
    Mm10,
    Rnor6,
}

impl GenomeBuild {
    /// All supported builds.
    pub const ALL: [GenomeBuild; 3] = [GenomeBuild::Hg38, GenomeBuild::Mm10, GenomeBuild::Rnor6];

    /// Identifier accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            GenomeBuild::Hg38 => "hg38",
            GenomeBuild::Mm10 => "mm10",
            GenomeBuild::Rnor6 => "rnor6",
        }
    }

    /// Path of the reference file, relative to the crate root.
    pub fn chrom_sizes_path(&self) -> &'static str {
        match self {
            GenomeBuild::Hg38 => "chrom_sizes/hg38.chrom.sizes",
            GenomeBuild::Mm10 => "chrom_sizes/mm10.chrom.sizes",
            GenomeBuild::Rnor6 => "chrom_sizes/rn6.chrom.sizes",
        }
    }

    fn bundled_contents(&self) -> &'static str {
        match self {
            GenomeBuild::Hg38 => include_str!("../chrom_sizes/hg38.chrom.sizes"),
            GenomeBuild::Mm10 => include_str!("../chrom_sizes/mm10.chrom.sizes"),
            GenomeBuild::Rnor6 => include_str!("../chrom_sizes/rn6.chrom.sizes"),
        }
    }
}

impl fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chromosome name to length. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct ChromSizes {
    sizes: HashMap<String, u64>,
}

#[allow(clippy::len_without_is_empty)]
impl ChromSizes {
    /// Load the bundled chrom sizes for a genome build.
    pub fn for_build(build: GenomeBuild) -> Result<Self> {
        Self::from_reader(
            build.bundled_contents().as_bytes(),
            Path::new(build.chrom_sizes_path()),
        )
    }

    /// Load chrom sizes from a file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FfError::ChromSizes {
            path: path.to_path_buf(),
            line: 0,
            message: e.to_string(),
        })?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Parse chrom sizes. Every line must hold exactly two whitespace-separated
    /// tokens, the second an integer; any other line fails the whole load.
    pub fn from_reader<R: BufRead>(reader: R, source: &Path) -> Result<Self> {
        let mut sizes = Self::default();
        let err = |line: usize, message: String| FfError::ChromSizes {
            path: PathBuf::from(source),
            line,
            message,
        };

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|e| err(line_num + 1, e.to_string()))?;
            let mut tokens = line.split_whitespace();

            let (chrom, length) = match (tokens.next(), tokens.next(), tokens.next()) {
                (Some(chrom), Some(length), None) => (chrom, length),
                _ => {
                    return Err(err(
                        line_num + 1,
                        format!(
                            "expected 2 whitespace-separated fields, got {}",
                            line.split_whitespace().count()
                        ),
                    ))
                }
            };

            let length: u64 = length
                .parse()
                .map_err(|_| err(line_num + 1, format!("invalid chromosome length: {}", length)))?;

            sizes.insert(chrom.to_string(), length);
        }

        Ok(sizes)
    }

    /// Get the length of a chromosome.
    #[inline]
    pub fn chrom_size(&self, chrom: &str) -> Option<u64> {
        self.sizes.get(chrom).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Insert a chromosome length. A repeated name overwrites the earlier length.
    pub fn insert(&mut self, chrom: String, size: u64) {
        self.sizes.insert(chrom, size);
    }
}

impl FromIterator<(String, u64)> for ChromSizes {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut sizes = Self::default();
        for (chrom, size) in iter {
            sizes.insert(chrom, size);
        }
        sizes
    }
}
