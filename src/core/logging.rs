//! Per-fixture logging pipeline.
//!
//! Each pipeline owns a private `tracing` dispatcher whose formatting layer
//! writes into an [`InjectableSink`]. The dispatcher is never installed as
//! the global default; it is entered per call (or per scope) on the current
//! thread only, so fixtures running in parallel never share output.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::dispatcher::{self, DefaultGuard, Dispatch};
use tracing::level_filters::LevelFilter;
use tracing::Level;

use super::sink::{InjectableSink, OutputSink};
use crate::error::{FixtureError, Result};

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines without timestamps.
    #[default]
    Human,
    /// JSON lines (one event per line).
    Json,
    /// Compact lines (single line, terse).
    Compact,
}

impl LogFormat {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Shared state behind every logger handle cut from one pipeline.
struct LoggerCore {
    dispatch: Dispatch,
    released: AtomicBool,
}

/// The logging resources owned by one fixture.
pub struct LoggerPipeline {
    core: Arc<LoggerCore>,
    adapter: Arc<InjectableSink>,
    format: LogFormat,
}

impl LoggerPipeline {
    /// Build a pipeline that routes every event to `sink`.
    ///
    /// The sink is bound before the subscriber is built, so no event can
    /// reach an unbound adapter.
    pub fn build(sink: Arc<dyn OutputSink>, format: LogFormat) -> Result<Self> {
        let adapter = Arc::new(InjectableSink::new());
        adapter.inject(sink)?;

        let dispatch = build_dispatch(&adapter, format);

        Ok(Self {
            core: Arc::new(LoggerCore {
                dispatch,
                released: AtomicBool::new(false),
            }),
            adapter,
            format,
        })
    }

    /// Logger handle for category `C`.
    #[must_use]
    pub fn logger<C>(&self) -> Logger<C> {
        Logger {
            core: Some(Arc::clone(&self.core)),
            category: type_name::<C>(),
            _category: PhantomData,
        }
    }

    /// The output adapter this pipeline writes to.
    #[must_use]
    pub fn adapter(&self) -> &Arc<InjectableSink> {
        &self.adapter
    }

    /// Format used for every line.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }

    /// Whether the provider has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.core.released.load(Ordering::SeqCst)
    }

    /// Release the provider: every handle becomes a no-op.
    ///
    /// Returns `false` if it was already released.
    pub fn release_provider(&self) -> bool {
        !self.core.released.swap(true, Ordering::SeqCst)
    }

    /// Release the provider, then the adapter.
    ///
    /// Both steps are attempted; adapter failures are reported as a
    /// teardown error.
    pub async fn shutdown(&self) -> Result<()> {
        let mut failures = Vec::new();

        self.release_provider();
        if let Err(err) = self.adapter.dispose().await {
            failures.push(format!("output adapter: {err}"));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(FixtureError::Teardown { failures })
        }
    }
}

impl fmt::Debug for LoggerPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerPipeline")
            .field("format", &self.format)
            .field("released", &self.is_released())
            .field("adapter", &self.adapter)
            .finish()
    }
}

fn build_dispatch(adapter: &Arc<InjectableSink>, format: LogFormat) -> Dispatch {
    let builder = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_ansi(false)
        .with_writer(adapter.writer());

    match format {
        LogFormat::Json => Dispatch::new(
            builder
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .finish(),
        ),
        LogFormat::Compact => Dispatch::new(builder.compact().with_target(true).finish()),
        LogFormat::Human => Dispatch::new(builder.with_target(false).without_time().finish()),
    }
}

/// Read-only logger handle typed for a category.
///
/// A disabled handle (no pipeline) accepts every call and emits nothing.
pub struct Logger<C = crate::fixture::UnitTest> {
    core: Option<Arc<LoggerCore>>,
    category: &'static str,
    _category: PhantomData<fn() -> C>,
}

impl<C> Logger<C> {
    /// A handle that discards everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            core: None,
            category: type_name::<C>(),
            _category: PhantomData,
        }
    }

    /// Whether events from this handle reach a sink.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.active().is_some()
    }

    /// Category recorded on every event.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        self.category
    }

    fn active(&self) -> Option<&Dispatch> {
        self.core
            .as_deref()
            .filter(|core| !core.released.load(Ordering::SeqCst))
            .map(|core| &core.dispatch)
    }

    /// Emit one event at `level`.
    pub fn log(&self, level: Level, message: &str) {
        let Some(dispatch) = self.active() else {
            return;
        };
        let category = self.category;
        dispatcher::with_default(dispatch, || match level {
            Level::TRACE => tracing::trace!(category, "{message}"),
            Level::DEBUG => tracing::debug!(category, "{message}"),
            Level::INFO => tracing::info!(category, "{message}"),
            Level::WARN => tracing::warn!(category, "{message}"),
            _ => tracing::error!(category, "{message}"),
        });
    }

    /// Emit `message` at `TRACE`.
    pub fn trace(&self, message: &str) {
        self.log(Level::TRACE, message);
    }

    /// Emit `message` at `DEBUG`.
    pub fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    /// Emit `message` at `INFO`.
    pub fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    /// Emit `message` at `WARN`.
    pub fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    /// Emit `message` at `ERROR`.
    pub fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    /// Run `f` with this fixture's dispatcher as the thread's default and
    /// the handle's category, or skip it entirely for a disabled handle.
    ///
    /// This is the hook behind [`log_event!`](crate::log_event); events
    /// raised inside `f` never reach the ambient subscriber.
    pub fn emit(&self, f: impl FnOnce(&'static str)) {
        if let Some(dispatch) = self.active() {
            dispatcher::with_default(dispatch, || f(self.category));
        }
    }

    /// Run `f` with this fixture's dispatcher as the thread's default, so
    /// plain `tracing` macros and spans inside it go to this test's sink.
    ///
    /// A disabled handle runs `f` unchanged.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        match self.active() {
            Some(dispatch) => dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }

    /// Make this fixture's dispatcher the thread's default until the guard
    /// is dropped. Returns `None` for a disabled handle.
    #[must_use]
    pub fn scope(&self) -> Option<DefaultGuard> {
        self.active().map(dispatcher::set_default)
    }
}

/// Emit a structured event through a [`Logger`] handle.
///
/// Takes the same field and message syntax as `tracing::event!`; the
/// handle's category is recorded alongside the given fields.
///
/// ```rust,ignore
/// log_event!(logger, Level::INFO, order_id = 17, total = %amount, "order placed");
/// ```
#[macro_export]
macro_rules! log_event {
    ($logger:expr, $level:expr, $($rest:tt)+) => {
        $logger.emit(|category| {
            $crate::__private::tracing::event!($level, category, $($rest)+)
        })
    };
}

impl<C> Clone for Logger<C> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            category: self.category,
            _category: PhantomData,
        }
    }
}

impl<C> fmt::Debug for Logger<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
