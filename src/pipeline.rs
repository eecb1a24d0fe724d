//! One fragment-fixing run: load chrom sizes, filter, write.

use crate::compress::{BgzfCompressor, BlockCompressor, ExternalBgzip};
use crate::config::RunConfig;
use crate::error::Result;
use crate::filter::{filter_oob, FilterStats};
use crate::fragment::read_fragments;
use crate::genome::ChromSizes;
use crate::output::write_fragments;
use log::info;
use std::fs;
use std::path::PathBuf;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_file: PathBuf,
    pub stats: FilterStats,
}

/// Load the chrom sizes for a run: the override file if given, else the bundled build.
pub fn load_chrom_sizes(config: &RunConfig) -> Result<ChromSizes> {
    match &config.chrom_sizes {
        Some(path) => {
            info!("Loading chrom sizes from {}", path.display());
            ChromSizes::from_file(path)
        }
        None => {
            info!("Loading chrom sizes for {}", config.genome);
            ChromSizes::for_build(config.genome)
        }
    }
}

/// Execute a run. Fatal errors return before any output file is placed.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let sizes = load_chrom_sizes(config)?;
    info!("Loaded {} chromosome sizes", sizes.len());

    info!("Filtering OOB...");
    let records = read_fragments(&config.input)?;
    let outcome = filter_oob(records, &sizes);
    info!("{}", outcome.stats);

    info!("Saving new fragment files...");
    let out_dir = config.output_path();
    fs::create_dir_all(&out_dir)?;

    let compressor: Box<dyn BlockCompressor> = match &config.bgzip {
        Some(program) => Box::new(ExternalBgzip::new(program)),
        None => Box::new(BgzfCompressor),
    };
    let output_file = write_fragments(
        &outcome.kept,
        config.output_format,
        &config.run_id,
        &out_dir,
        compressor.as_ref(),
    )?;
    info!("Wrote {}", output_file.display());

    Ok(RunSummary {
        output_file,
        stats: outcome.stats,
    })
}
