//! Fragment fixer
//!
//! Drops fragments whose chromosome is unknown or whose coordinates run past
//! the end of their chromosome, then writes the survivors as `aln.bed` or
//! BGZF-compressed `fragments.tsv.gz`.
//!
//! # Example
//!
//! ```rust,no_run
//! use ff_genomics::{filter_oob, read_fragments, ChromSizes, GenomeBuild};
//!
//! let sizes = ChromSizes::for_build(GenomeBuild::Hg38).unwrap();
//! let records = read_fragments("fragments.tsv.gz").unwrap();
//! let outcome = filter_oob(records, &sizes);
//! println!("{}", outcome.stats);
//! ```

pub mod compress;
pub mod config;
pub mod error;
pub mod filter;
pub mod fragment;
pub mod genome;
pub mod logging;
pub mod output;
pub mod pipeline;

// Re-export commonly used types
pub use config::RunConfig;
pub use error::{FfError, Result};
pub use filter::{check_bounds, filter_oob, is_in_bounds, FilterOutcome, FilterStats, Rejection};
pub use fragment::{parse_fragments, read_fragments, FragmentReader, FragmentRecord};
pub use genome::{ChromSizes, GenomeBuild};
pub use output::{write_fragments, OutputFormat};
