//! Fragment fixer: remove out-of-bounds fragments.
//!
//! Usage: ff --input <FILE> --run-id <ID> --genome <GENOME> --output-type <TYPE> --output-dir <DIR>

use clap::Parser;
use log::{error, info};
use std::fs;
use std::path::PathBuf;
use std::process;

use ff_genomics::config::DEFAULT_OUTPUT_ROOT;
use ff_genomics::{logging, pipeline, FfError, GenomeBuild, OutputFormat, RunConfig};

#[derive(Parser)]
#[command(name = "ff")]
#[command(version)]
#[command(about = "Fragment fixer: drop fragments outside chromosome bounds and re-serialize them", long_about = None)]
struct Cli {
    /// Fragment file from Chromap or a similar aligner (aln.bed or fragments.tsv.gz)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file prefix (no '/', '-', '.' or whitespace)
    #[arg(short, long)]
    run_id: String,

    /// Reference genome used to make the input file
    #[arg(short, long, value_enum)]
    genome: GenomeBuild,

    /// Output file type
    #[arg(short = 'f', long, value_enum)]
    output_type: OutputFormat,

    /// Output directory name, created under --output-root (no '/', '-', '.' or whitespace)
    #[arg(short, long)]
    output_dir: String,

    /// Parent directory for output directories
    #[arg(long, default_value = DEFAULT_OUTPUT_ROOT)]
    output_root: PathBuf,

    /// Chrom sizes file to use instead of the bundled one for --genome
    #[arg(long)]
    chrom_sizes: Option<PathBuf>,

    /// Compress with this bgzip executable instead of the built-in BGZF writer
    #[arg(long)]
    bgzip: Option<PathBuf>,

    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't')]
    threads: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    let config = match RunConfig::new(
        cli.input,
        cli.run_id,
        cli.genome,
        cli.output_type,
        cli.output_dir,
    ) {
        Ok(config) => config
            .with_output_root(cli.output_root)
            .with_chrom_sizes(cli.chrom_sizes)
            .with_bgzip(cli.bgzip),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            eprintln!("Error: failed to initialize thread pool: {}", e);
            process::exit(1);
        }
    }

    if let Err(e) = init_logging(&config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    match pipeline::run(&config) {
        Ok(summary) => {
            info!(
                "Done: {} ({} of {} fragments kept)",
                summary.output_file.display(),
                summary.stats.kept,
                summary.stats.total
            );
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

fn init_logging(config: &RunConfig) -> Result<(), FfError> {
    fs::create_dir_all(config.output_path())?;
    logging::init(&config.log_path())?;
    Ok(())
}
