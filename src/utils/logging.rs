use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

pub const CLI_PREFIX: &str = "cli";
pub const WATCH_PREFIX: &str = "watch";
pub const LOG_FILES_KEPT: usize = 5;
const DEFAULT_LEVEL: &str = "info";

/// Filter for this crate only. An explicit level wins over `RUST_LOG`.
fn crate_filter(log_level: Option<LevelFilter>) -> EnvFilter {
    let level = match log_level {
        Some(level) => level.to_string(),
        None => std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LEVEL.into()),
    };
    EnvFilter::new(format!(
        "{}={level}",
        env!("CARGO_PKG_NAME").replace("-", "_"),
    ))
}

/// Sets up logging into `<application_data_path>/logs`, one file per day and per `prefix`.
/// Output is mirrored to stdout only with `show_std`. The live view owns the terminal, so it
/// never sets it.
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let files = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(LOG_FILES_KEPT)
        .filename_prefix(prefix)
        .build(application_data_path.join("logs"))?;
    let stdout = std::io::stdout.with_filter(move |_| show_std);

    tracing_subscriber::fmt()
        .with_env_filter(crate_filter(log_level))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(files))
        .pretty()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
