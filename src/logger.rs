//! Debug logging to a file.
//!
//! Two front ends share one sink: the `log` macros used throughout the crate and the
//! `tracing` spans around a pipeline run. Nothing is written until a log file is set.

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{LazyLock, OnceLock};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Default log file used by `--log` when no path is given
pub const DEFAULT_LOG_FILE: &str = "herald-debug.log";

/// Set to any value to let HTTP stack logs through
pub const VERBOSE_ENV: &str = "HERALD_VERBOSE";

/// HTTP stack targets hidden unless verbose logging is on
const NOISY_TARGETS: &[&str] = &["reqwest", "hyper", "h2", "rustls", "want", "mio"];

#[derive(Default)]
struct LogState {
    file: Option<File>,
    verbose: bool,
}

impl LogState {
    fn accepts(&self, metadata: &Metadata) -> bool {
        if self.file.is_none() {
            return false;
        }
        let target = metadata.target();
        if target.starts_with("herald") {
            return metadata.level() <= Level::Debug;
        }
        if !self.verbose && NOISY_TARGETS.iter().any(|noisy| target.starts_with(noisy)) {
            return false;
        }
        metadata.level() <= Level::Info
    }

    fn write(&mut self, bytes: &[u8]) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(bytes);
            let _ = file.flush();
        }
    }
}

static STATE: LazyLock<Mutex<LogState>> = LazyLock::new(Mutex::default);

struct HeraldLogger;

static LOGGER: HeraldLogger = HeraldLogger;

impl log::Log for HeraldLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        STATE.lock().accepts(metadata)
    }

    fn log(&self, record: &Record) {
        let mut state = STATE.lock();
        if !state.accepts(record.metadata()) {
            return;
        }

        let line = format!(
            "{} {} [{}] - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );
        state.write(line.as_bytes());
    }

    fn flush(&self) {
        if let Some(file) = STATE.lock().file.as_mut() {
            let _ = file.flush();
        }
    }
}

/// Tracing output goes to the same file as the `log` records
#[derive(Clone, Copy)]
struct FileSink;

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        STATE.lock().write(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> fmt::MakeWriter<'a> for FileSink {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}

/// Install the `log` logger and the tracing subscriber. Safe to call more than once.
pub fn init() -> Result<(), String> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();

    INIT.get_or_init(|| {
        STATE.lock().verbose = std::env::var_os(VERBOSE_ENV).is_some();

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "herald=debug,warn".into());
        let fmt_layer = fmt::Layer::new()
            .with_target(true)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .with_writer(FileSink);

        let tracing_result = Registry::default().with(env_filter).with(fmt_layer).try_init();
        let log_result =
            log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug));

        match (tracing_result, log_result) {
            (Err(tracing_err), Err(log_err)) => Err(format!(
                "failed to initialize logging: tracing={tracing_err}, log={log_err}"
            )),
            _ => Ok(()),
        }
    })
    .clone()
}

/// Start appending debug output to `path`
pub fn set_log_file(path: impl AsRef<Path>) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    STATE.lock().file = Some(file);
    Ok(())
}

/// Stop writing debug output
pub fn disable_logging() {
    STATE.lock().file = None;
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}
