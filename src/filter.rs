//! Out-of-bounds fragment filter.
//!
//! A fragment is kept when its chromosome is in the size map and neither
//! coordinate exceeds the chromosome length. A coordinate equal to the length
//! is kept; only strictly greater is rejected.

use crate::fragment::FragmentRecord;
use crate::genome::ChromSizes;
use log::warn;
use rayon::prelude::*;
use std::fmt;

/// Minimum number of records before checking bounds in parallel.
/// Below this threshold, sequential processing is faster due to
/// thread spawn overhead.
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Why a fragment was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Chromosome is not in the size map.
    UnknownChrom { chrom: String, start: u64, end: u64 },
    /// Start or end lies past the end of the chromosome.
    BeyondChromEnd {
        chrom: String,
        start: u64,
        end: u64,
        chrom_length: u64,
    },
}

impl Rejection {
    /// Stable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::UnknownChrom { .. } => "unknown_chrom",
            Rejection::BeyondChromEnd { .. } => "beyond_chrom_end",
        }
    }

    pub fn chrom(&self) -> &str {
        match self {
            Rejection::UnknownChrom { chrom, .. } | Rejection::BeyondChromEnd { chrom, .. } => chrom,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnknownChrom { chrom, start, end } => {
                write!(f, "Wrong chromosome found: ({}, {}, {})", chrom, start, end)
            }
            Rejection::BeyondChromEnd {
                chrom,
                start,
                end,
                chrom_length,
            } => write!(
                f,
                "Found one beyond chrom={}, chrom_length={}: ({}, {}, {})",
                chrom, chrom_length, chrom, start, end
            ),
        }
    }
}

/// Check a single fragment against the size map.
///
/// Returns `None` when the fragment is in bounds.
#[inline]
pub fn check_bounds(record: &FragmentRecord, sizes: &ChromSizes) -> Option<Rejection> {
    match sizes.chrom_size(&record.chrom) {
        None => Some(Rejection::UnknownChrom {
            chrom: record.chrom.clone(),
            start: record.start,
            end: record.end,
        }),
        Some(chrom_length) if record.start > chrom_length || record.end > chrom_length => {
            Some(Rejection::BeyondChromEnd {
                chrom: record.chrom.clone(),
                start: record.start,
                end: record.end,
                chrom_length,
            })
        }
        Some(_) => None,
    }
}

/// Returns true if the fragment lies on a known chromosome and within its length.
#[inline]
pub fn is_in_bounds(record: &FragmentRecord, sizes: &ChromSizes) -> bool {
    check_bounds(record, sizes).is_none()
}

/// Counts from one filter pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterStats {
    /// Number of fragments examined
    pub total: usize,
    /// Number of fragments kept
    pub kept: usize,
    /// Fragments dropped for an unknown chromosome
    pub unknown_chrom: usize,
    /// Fragments dropped for a coordinate past the chromosome end
    pub beyond_chrom_end: usize,
}

impl FilterStats {
    pub fn dropped(&self) -> usize {
        self.unknown_chrom + self.beyond_chrom_end
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fragments: {}, Kept: {}, Unknown chromosome: {}, Beyond chromosome end: {}",
            self.total, self.kept, self.unknown_chrom, self.beyond_chrom_end
        )
    }
}

/// Result of filtering a batch of fragments.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Kept fragments, in input order
    pub kept: Vec<FragmentRecord>,
    /// One entry per dropped fragment, in input order
    pub rejections: Vec<Rejection>,
    pub stats: FilterStats,
}

/// Drop out-of-bounds fragments, preserving input order.
///
/// Bounds are checked in parallel for large inputs; each rejection is logged
/// once at warn level, in input order.
pub fn filter_oob(records: Vec<FragmentRecord>, sizes: &ChromSizes) -> FilterOutcome {
    let verdicts: Vec<Option<Rejection>> = if records.len() >= PARALLEL_THRESHOLD {
        records.par_iter().map(|r| check_bounds(r, sizes)).collect()
    } else {
        records.iter().map(|r| check_bounds(r, sizes)).collect()
    };

    let mut outcome = FilterOutcome {
        kept: Vec::with_capacity(records.len()),
        rejections: Vec::new(),
        stats: FilterStats {
            total: records.len(),
            ..Default::default()
        },
    };

    for (record, verdict) in records.into_iter().zip(verdicts) {
        match verdict {
            None => outcome.kept.push(record),
            Some(rejection) => {
                warn!("{}", rejection);
                match rejection {
                    Rejection::UnknownChrom { .. } => outcome.stats.unknown_chrom += 1,
                    Rejection::BeyondChromEnd { .. } => outcome.stats.beyond_chrom_end += 1,
                }
                outcome.rejections.push(rejection);
            }
        }
    }
    outcome.stats.kept = outcome.kept.len();

    outcome
}
