//! Console and rename-log sinks
//!
//! Every component logs through `tracing`; the sinks are composed here. The
//! console gets bare messages, the rename log gets
//! `<YYYY-MM-DD HH:MM:SS> [<LEVEL>] <message>` lines.

use chrono::Local;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Event format for both sinks
#[derive(Debug, Clone, Copy)]
pub struct LogLine {
    timestamps: bool,
}

impl LogLine {
    /// Bare message, as printed on the console
    pub fn message_only() -> Self {
        Self { timestamps: false }
    }

    /// Timestamp and level prefix, as written to the rename log
    pub fn with_timestamps() -> Self {
        Self { timestamps: true }
    }
}

impl<S, N> FormatEvent<S, N> for LogLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        if self.timestamps {
            write!(
                writer,
                "{} [{}] ",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                event.metadata().level()
            )?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Move an existing log at `path` to `<path>.<N>`, N the smallest unused positive integer
pub fn rotate_existing(path: &Path) -> io::Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut n = 1u32;
    let rotated = loop {
        let mut candidate = OsString::from(path.as_os_str());
        candidate.push(format!(".{}", n));
        let candidate = PathBuf::from(candidate);
        if !candidate.exists() {
            break candidate;
        }
        n += 1;
    };

    fs::rename(path, &rotated)?;
    Ok(Some(rotated))
}

/// Rotate any previous log and open a fresh one
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    rotate_existing(path)?;

    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

/// Install the global subscriber: console always, rename log when `log_path` is given
///
/// The returned guard flushes the log file when dropped.
pub fn init(verbose: bool, log_path: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (file_layer, guard) = match log_path {
        Some(path) => {
            let file = open_log_file(path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_ansi(false)
                .event_format(LogLine::with_timestamps())
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .event_format(LogLine::message_only())
                .with_writer(io::stdout),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}
