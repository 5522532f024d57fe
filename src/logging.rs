//! File logging bootstrap.
//!
//! The interactive editor owns the terminal, so log lines only ever go to
//! rotating files under the configured directory.

use std::path::Path;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

use crate::error::Error;

const LOG_FILE_BASENAME: &str = "tokenforge";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// Starts file logging. The returned handle must be kept alive for the whole
/// process; dropping it flushes and stops the logger.
pub(crate) fn init_logging(level: &str, log_dir: &Path) -> Result<LoggerHandle, Error> {
    std::fs::create_dir_all(log_dir).map_err(|err| Error::io("create", log_dir, err))?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    info!(
        "event=app_start status=ok platform={} version={} level={} log_dir={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );
    Ok(handle)
}
