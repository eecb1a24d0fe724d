//! Run logging.
//!
//! Every log line goes to stderr and to the run log file, formatted as
//! `YYYY-MM-DD HH:MM:SS [LEVEL] message`.

use env_logger::{Env, Target, WriteStyle};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Copies each write to stderr and a file.
pub struct TeeWriter {
    file: File,
}

impl TeeWriter {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        // stderr is best effort; the log file is the record
        let _ = io::stderr().write_all(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}

/// Format one log line.
pub fn format_line(timestamp: &str, level: log::Level, message: &str) -> String {
    format!("{} [{}] {}", timestamp, level, message)
}

/// Install the global logger, appending to `log_path`.
///
/// Defaults to `info`; `RUST_LOG` overrides.
pub fn init(log_path: &Path) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(TeeWriter::new(file))))
        .write_style(WriteStyle::Never)
        .format(|buf, record| {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            writeln!(
                buf,
                "{}",
                format_line(&timestamp, record.level(), &record.args().to_string())
            )
        })
        .try_init()
        .map_err(io::Error::other)
}
