//! Frame-aware logging for the locator pipeline.
//!
//! Every stage logs through the `log` facade. While a [`FrameScope`] is
//! alive on a thread, its records carry that frame's index, so the
//! interleaved light, pose and stability messages of one frame group
//! together:
//!
//! ```text
//! [  0.412s DEBUG pose::estimator #17] solved pose from 8 tags, rms 0.21 px
//! ```
//!
//! [`init_with_level`] installs a small stderr logger that prints this
//! format. With the `tracing` feature, [`frame_scope`] also enters an
//! `info` span named `frame`, and [`init_tracing`] reports those spans as
//! they close, which gives per-frame timings.

use std::cell::Cell;
use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

/// Crate-name prefix dropped from record targets.
const TARGET_PREFIX: &str = "basefinder_";

thread_local! {
    static CURRENT_FRAME: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Marks the log records of this thread with a frame index until dropped.
///
/// Scopes nest: dropping an inner scope restores the outer frame index.
#[must_use = "the frame index is cleared as soon as the scope is dropped"]
pub struct FrameScope {
    previous: Option<u64>,
    #[cfg(feature = "tracing")]
    _span: tracing::span::EnteredSpan,
}

impl Drop for FrameScope {
    fn drop(&mut self) {
        CURRENT_FRAME.with(|f| f.set(self.previous));
    }
}

/// Open a [`FrameScope`] for `index`.
pub fn frame_scope(index: u64) -> FrameScope {
    let previous = CURRENT_FRAME.with(|f| f.replace(Some(index)));
    FrameScope {
        previous,
        #[cfg(feature = "tracing")]
        _span: tracing::info_span!("frame", index).entered(),
    }
}

/// Frame index of the innermost live [`FrameScope`] on this thread.
pub fn current_frame() -> Option<u64> {
    CURRENT_FRAME.with(Cell::get)
}

/// `basefinder_lights::filter` -> `lights::filter`.
fn stage(target: &str) -> &str {
    target.strip_prefix(TARGET_PREFIX).unwrap_or(target)
}

fn write_line(
    out: &mut impl Write,
    elapsed: f64,
    level: Level,
    target: &str,
    frame: Option<u64>,
    args: &fmt::Arguments<'_>,
) -> std::io::Result<()> {
    write!(out, "[{elapsed:7.3}s {level:>5} {}", stage(target))?;
    if let Some(frame) = frame {
        write!(out, " #{frame}")?;
    }
    writeln!(out, "] {args}")
}

struct FrameLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for FrameLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = write_line(
            &mut std::io::stderr().lock(),
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            current_frame(),
            record.args(),
        );
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<FrameLogger> = OnceLock::new();

/// Install the stderr frame logger with the provided level filter.
///
/// Only the first call installs the logger; later calls are no-ops.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| FrameLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber on stderr, filtered by `RUST_LOG`
/// (default `info`). `frame` spans are reported when they close.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
