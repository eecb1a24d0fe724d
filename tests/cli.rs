//! End-to-end tests for the `ff` binary.
//!
//! Tests cover:
//! 1. Both output formats, including barcode rewriting and BGZF validity
//! 2. Inclusive chromosome-end boundary
//! 3. Run log contents (one warning per dropped fragment)
//! 4. Fatal errors leave no output file behind
//! 5. Configuration rejected before anything is created

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to write a file into the scratch directory.
fn create_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    path
}

/// Helper to run ff with an output root inside the scratch directory.
fn run_ff(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ff"))
        .args(args)
        .arg("--output-root")
        .arg(dir.path().join("ff_outs"))
        .env("RUST_LOG", "info")
        .output()
        .expect("Failed to run ff")
}

fn out_dir(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join("ff_outs").join(name)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn read_gz(path: &Path) -> String {
    let mut content = String::new();
    MultiGzDecoder::new(File::open(path).unwrap())
        .read_to_string(&mut content)
        .unwrap();
    content
}

// =============================================================================
// Test fixtures
// =============================================================================

/// Size map with a single 1000bp chromosome.
fn chr1_sizes() -> &'static str {
    "chr1\t1000\n"
}

/// Two kept fragments, one past the chromosome end, one on an unknown chromosome.
fn scenario_fragments() -> &'static str {
    "chr1\t10\t20\tAAA\t1\nchr1\t999\t1000\tBBB\t1\nchr1\t500\t1001\tCCC\t1\nchr2\t1\t2\tDDD\t1\n"
}

fn scenario_args<'a>(input: &'a str, sizes: &'a str, output_type: &'a str) -> Vec<&'a str> {
    vec![
        "-i",
        input,
        "-r",
        "run1",
        "-g",
        "hg38",
        "-f",
        output_type,
        "-o",
        "out1",
        "--chrom-sizes",
        sizes,
    ]
}

// =============================================================================
// Output formats
// =============================================================================

#[test]
fn test_aln_bed_output() {
    let dir = TempDir::new().unwrap();
    let input = create_file(&dir, "aln.bed", scenario_fragments());
    let sizes = create_file(&dir, "sizes", chr1_sizes());

    let output = run_ff(
        &dir,
        &scenario_args(input.to_str().unwrap(), sizes.to_str().unwrap(), "aln.bed"),
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let written = fs::read_to_string(out_dir(&dir, "out1").join("run1_ff_aln.bed")).unwrap();
    assert_eq!(written, "chr1\t10\t20\tAAA\t1\nchr1\t999\t1000\tBBB\t1\n");
}

#[test]
fn test_fragments_gz_output() {
    let dir = TempDir::new().unwrap();
    let input = create_file(&dir, "aln.bed", scenario_fragments());
    let sizes = create_file(&dir, "sizes", chr1_sizes());

    let output = run_ff(
        &dir,
        &scenario_args(
            input.to_str().unwrap(),
            sizes.to_str().unwrap(),
            "fragments.tsv.gz",
        ),
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let path = out_dir(&dir, "out1").join("run1_ff_fragments.tsv.gz");
    let mut header = [0u8; 14];
    File::open(&path).unwrap().read_exact(&mut header).unwrap();
    assert_eq!(&header[12..14], b"BC", "output is not BGZF");

    assert_eq!(
        read_gz(&path),
        "chr1\t10\t20\tAAA-1\t1\nchr1\t999\t1000\tBBB-1\t1\n"
    );
    // intermediate uncompressed file is not left behind
    let mut entries: Vec<_> = fs::read_dir(out_dir(&dir, "out1"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    entries.sort();
    assert_eq!(entries, ["run1_ff_fragments.tsv.gz", "wf.log"]);
}

#[test]
fn test_gzip_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("fragments.tsv.gz");
    {
        let mut encoder = GzEncoder::new(File::create(&input).unwrap(), Compression::default());
        encoder.write_all(scenario_fragments().as_bytes()).unwrap();
        encoder.finish().unwrap();
    }
    let sizes = create_file(&dir, "sizes", chr1_sizes());

    let output = run_ff(
        &dir,
        &scenario_args(input.to_str().unwrap(), sizes.to_str().unwrap(), "aln.bed"),
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let written = fs::read_to_string(out_dir(&dir, "out1").join("run1_ff_aln.bed")).unwrap();
    assert_eq!(written.lines().count(), 2);
}

#[test]
fn test_bundled_genome() {
    let dir = TempDir::new().unwrap();
    // mm10 chrM is 16299bp
    let input = create_file(
        &dir,
        "aln.bed",
        "chrM\t16200\t16299\tA\t1\nchrM\t16200\t16300\tB\t1\nchr1\t1\t2\tC\t1\n",
    );

    let output = run_ff(
        &dir,
        &[
            "-i",
            input.to_str().unwrap(),
            "-r",
            "mouse",
            "-g",
            "mm10",
            "-f",
            "aln.bed",
            "-o",
            "mouse_out",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let written =
        fs::read_to_string(out_dir(&dir, "mouse_out").join("mouse_ff_aln.bed")).unwrap();
    assert_eq!(written, "chrM\t16200\t16299\tA\t1\nchr1\t1\t2\tC\t1\n");
}

// =============================================================================
// Run log
// =============================================================================

#[test]
fn test_log_has_one_warning_per_dropped_fragment() {
    let dir = TempDir::new().unwrap();
    let input = create_file(&dir, "aln.bed", scenario_fragments());
    let sizes = create_file(&dir, "sizes", chr1_sizes());

    let output = run_ff(
        &dir,
        &scenario_args(input.to_str().unwrap(), sizes.to_str().unwrap(), "aln.bed"),
    );
    assert!(output.status.success());

    let log = fs::read_to_string(out_dir(&dir, "out1").join("wf.log")).unwrap();
    let warnings: Vec<_> = log.lines().filter(|l| l.contains("[WARN]")).collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("chrom_length=1000"));
    assert!(warnings[0].contains("(chr1, 500, 1001)"));
    assert!(warnings[1].contains("Wrong chromosome found: (chr2, 1, 2)"));
    // timestamped
    assert!(warnings[0].as_bytes()[4] == b'-' && warnings[0].as_bytes()[13] == b':');

    // also echoed to stderr
    assert!(stderr(&output).contains("Wrong chromosome found"));
}

#[test]
fn test_empty_input() {
    let dir = TempDir::new().unwrap();
    let input = create_file(&dir, "empty.bed", "");
    let sizes = create_file(&dir, "sizes", chr1_sizes());

    for format in ["aln.bed", "fragments.tsv.gz"] {
        let output = run_ff(
            &dir,
            &scenario_args(input.to_str().unwrap(), sizes.to_str().unwrap(), format),
        );
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    }

    let out = out_dir(&dir, "out1");
    assert_eq!(fs::read_to_string(out.join("run1_ff_aln.bed")).unwrap(), "");
    assert_eq!(read_gz(&out.join("run1_ff_fragments.tsv.gz")), "");
    let log = fs::read_to_string(out.join("wf.log")).unwrap();
    assert!(!log.contains("[WARN]"));
}

// =============================================================================
// Fatal errors
// =============================================================================

#[test]
fn test_malformed_chrom_sizes() {
    let dir = TempDir::new().unwrap();
    let input = create_file(&dir, "aln.bed", scenario_fragments());
    let sizes = create_file(&dir, "sizes", "chr1\t1000\nchr2\n");

    let output = run_ff(
        &dir,
        &scenario_args(input.to_str().unwrap(), sizes.to_str().unwrap(), "aln.bed"),
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("line 2"));
    assert!(!out_dir(&dir, "out1").join("run1_ff_aln.bed").exists());
    let log = fs::read_to_string(out_dir(&dir, "out1").join("wf.log")).unwrap();
    assert!(log.contains("[ERROR]"));
    assert!(!log.contains("Filtering OOB"));
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    let sizes = create_file(&dir, "sizes", chr1_sizes());
    let missing = dir.path().join("missing.bed");

    let output = run_ff(
        &dir,
        &scenario_args(missing.to_str().unwrap(), sizes.to_str().unwrap(), "aln.bed"),
    );

    assert!(!output.status.success());
    assert!(!out_dir(&dir, "out1").join("run1_ff_aln.bed").exists());
}

#[test]
fn test_failed_bgzip() {
    let dir = TempDir::new().unwrap();
    let input = create_file(&dir, "aln.bed", scenario_fragments());
    let sizes = create_file(&dir, "sizes", chr1_sizes());
    let mut args = scenario_args(
        input.to_str().unwrap(),
        sizes.to_str().unwrap(),
        "fragments.tsv.gz",
    );
    args.extend(["--bgzip", "/nonexistent/bgzip"]);

    let output = run_ff(&dir, &args);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Compression failed"));
    assert!(!out_dir(&dir, "out1")
        .join("run1_ff_fragments.tsv.gz")
        .exists());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_invalid_run_id() {
    let dir = TempDir::new().unwrap();
    let input = create_file(&dir, "aln.bed", scenario_fragments());

    for run_id in ["run-1", "run.1", "run 1", "/run"] {
        let output = run_ff(
            &dir,
            &[
                "-i",
                input.to_str().unwrap(),
                "-r",
                run_id,
                "-g",
                "hg38",
                "-f",
                "aln.bed",
                "-o",
                "out1",
            ],
        );
        assert!(!output.status.success(), "{run_id:?} was accepted");
        assert!(stderr(&output).contains("Invalid run id"));
    }
    assert!(!dir.path().join("ff_outs").exists());
}

#[test]
fn test_invalid_output_dir() {
    let dir = TempDir::new().unwrap();
    let input = create_file(&dir, "aln.bed", scenario_fragments());

    let output = run_ff(
        &dir,
        &[
            "-i",
            input.to_str().unwrap(),
            "-r",
            "run1",
            "-g",
            "hg38",
            "-f",
            "aln.bed",
            "-o",
            "out.dir",
        ],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid output directory"));
    assert!(!dir.path().join("ff_outs").exists());
}

#[test]
fn test_unknown_genome_and_format() {
    let dir = TempDir::new().unwrap();
    let input = create_file(&dir, "aln.bed", scenario_fragments());

    let bad_genome = run_ff(
        &dir,
        &["-i", input.to_str().unwrap(), "-r", "r", "-g", "hg19", "-f", "aln.bed", "-o", "o"],
    );
    assert!(!bad_genome.status.success());

    let bad_format = run_ff(
        &dir,
        &["-i", input.to_str().unwrap(), "-r", "r", "-g", "hg38", "-f", "bam", "-o", "o"],
    );
    assert!(!bad_format.status.success());
    assert!(!dir.path().join("ff_outs").exists());
}
