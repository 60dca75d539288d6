//! The unit test base fixture.
//!
//! A [`UnitTest`] provides a fake-data generator, an auto-faker and an
//! optional logger, all realized on first use. It does not resolve services;
//! there is no container involved in building one.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::config::FixtureConfig;
use crate::core::auto_fake::{AutoFaker, AutoFakerConfig};
use crate::core::deferred::DeferredValue;
use crate::core::faker::FakeGenerator;
use crate::core::logging::{LogFormat, Logger, LoggerPipeline};
use crate::core::sink::OutputSink;
use crate::error::{FixtureError, Result};

/// Lifecycle state of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FixtureState {
    /// Built; no hook or accessor has run.
    Constructed = 0,
    /// `initialize` completed.
    Initialized = 1,
    /// A generator or logger has been used.
    Active = 2,
    /// `dispose` ran. Terminal.
    Disposed = 3,
}

impl FixtureState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Constructed,
            1 => Self::Initialized,
            2 => Self::Active,
            _ => Self::Disposed,
        }
    }
}

impl fmt::Display for FixtureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Constructed => "constructed",
            Self::Initialized => "initialized",
            Self::Active => "active",
            Self::Disposed => "disposed",
        };
        write!(f, "{s}")
    }
}

/// Construction options for a [`UnitTest`].
#[derive(Default)]
pub struct UnitTestOptions {
    output: Option<Arc<dyn OutputSink>>,
    auto_faker: Option<AutoFaker>,
    create_logger: Option<bool>,
    config: FixtureConfig,
}

impl UnitTestOptions {
    /// Options with built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options seeded from [`FixtureConfig::load`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::new().config(FixtureConfig::load()?))
    }

    /// Route log output to `sink`. Without a sink there is no logger.
    #[must_use]
    pub fn output(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.output = Some(sink);
        self
    }

    /// Use a pre-built auto-faker instead of building one.
    #[must_use]
    pub fn auto_faker(mut self, auto_faker: AutoFaker) -> Self {
        self.auto_faker = Some(auto_faker);
        self
    }

    /// Force the logger on or off. Defaults to "on when a sink is given".
    #[must_use]
    pub const fn create_logger(mut self, create: bool) -> Self {
        self.create_logger = Some(create);
        self
    }

    /// Override the log line format.
    #[must_use]
    pub const fn log_format(mut self, format: LogFormat) -> Self {
        self.config.log_format = format;
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: FixtureConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for UnitTestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitTestOptions")
            .field("output", &self.output)
            .field("auto_faker", &self.auto_faker)
            .field("create_logger", &self.create_logger)
            .field("config", &self.config)
            .finish()
    }
}

/// Base fixture providing `faker`, `auto_faker` and an optional logger.
pub struct UnitTest {
    auto_faker: Arc<DeferredValue<AutoFaker>>,
    faker: DeferredValue<FakeGenerator>,
    logger: Option<DeferredValue<Result<LoggerPipeline>>>,
    state: AtomicU8,
}

impl UnitTest {
    /// A fixture without logger capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None, None, FixtureConfig::default())
    }

    /// A fixture whose logger writes to `sink`.
    #[must_use]
    pub fn with_output(sink: Arc<dyn OutputSink>) -> Self {
        Self::build(Some(sink), None, FixtureConfig::default())
    }

    /// Build from options.
    ///
    /// Fails fast when a logger is requested without a sink, or when the
    /// configuration is invalid.
    pub fn from_options(options: UnitTestOptions) -> Result<Self> {
        let UnitTestOptions {
            output,
            auto_faker,
            create_logger,
            config,
        } = options;
        config.validate()?;

        let wants_logger = create_logger.unwrap_or(output.is_some());
        let sink = match (wants_logger, output) {
            (true, None) => return Err(FixtureError::MissingSink),
            (true, Some(sink)) => Some(sink),
            (false, _) => None,
        };

        Ok(Self::build(sink, auto_faker, config))
    }

    /// `config` must already be validated.
    fn build(
        sink: Option<Arc<dyn OutputSink>>,
        auto_faker: Option<AutoFaker>,
        config: FixtureConfig,
    ) -> Self {
        let log_format = config.log_format;
        let auto_config = AutoFakerConfig::from(&config);

        let auto_faker = Arc::new(DeferredValue::new(move || {
            auto_faker.unwrap_or_else(|| AutoFaker::from_validated(&auto_config))
        }));

        let shared = Arc::clone(&auto_faker);
        let faker = DeferredValue::new(move || shared.get().faker().clone());

        let logger = sink
            .map(|sink| DeferredValue::new(move || LoggerPipeline::build(sink, log_format)));

        Self {
            auto_faker,
            faker,
            logger,
            state: AtomicU8::new(FixtureState::Constructed as u8),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> FixtureState {
        FixtureState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn touch(&self) {
        for from in [FixtureState::Constructed, FixtureState::Initialized] {
            if self
                .state
                .compare_exchange(
                    from as u8,
                    FixtureState::Active as u8,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_ok()
            {
                return;
            }
        }
    }

    /// Fake-data generator; shares its random source with [`UnitTest::auto_faker`].
    #[must_use]
    pub fn faker(&self) -> &FakeGenerator {
        self.touch();
        self.faker.get()
    }

    /// Generator for fully populated objects, without mocking.
    #[must_use]
    pub fn auto_faker(&self) -> &AutoFaker {
        self.touch();
        self.auto_faker.get()
    }

    /// Logger typed for this fixture.
    ///
    /// Returns a disabled handle when the fixture has no logger, and the
    /// cached error if the pipeline failed to build.
    pub fn logger(&self) -> Result<Logger<Self>> {
        self.logger_for::<Self>()
    }

    /// Logger typed for a derived test case.
    pub fn logger_for<C>(&self) -> Result<Logger<C>> {
        match self.logger_pipeline() {
            None => Ok(Logger::disabled()),
            Some(Ok(pipeline)) => Ok(pipeline.logger()),
            Some(Err(err)) => Err(err.clone()),
        }
    }

    /// The logging pipeline, realized if needed; `None` without a logger.
    pub fn logger_pipeline(&self) -> Option<std::result::Result<&LoggerPipeline, &FixtureError>> {
        let deferred = self.logger.as_ref()?;
        self.touch();
        Some(deferred.get().as_ref())
    }

    /// Whether this fixture was built with logger capabilities.
    #[must_use]
    pub const fn has_logger(&self) -> bool {
        self.logger.is_some()
    }

    /// Whether the logging pipeline has been built.
    #[must_use]
    pub fn is_logger_realized(&self) -> bool {
        self.logger.as_ref().is_some_and(DeferredValue::is_realized)
    }

    /// Whether the auto-faker has been built.
    #[must_use]
    pub fn is_auto_faker_realized(&self) -> bool {
        self.auto_faker.is_realized()
    }

    /// Async setup hook. Accepted once, before any other use.
    pub async fn initialize(&self) -> Result<()> {
        self.state
            .compare_exchange(
                FixtureState::Constructed as u8,
                FixtureState::Initialized as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map(|_| ())
            .map_err(|current| FixtureError::Lifecycle {
                operation: "initialize",
                state: FixtureState::from_u8(current),
            })
    }

    /// Release owned logging resources: the provider first, then the
    /// output adapter. Later calls are no-ops.
    pub async fn dispose(&self) -> Result<()> {
        let previous = self
            .state
            .swap(FixtureState::Disposed as u8, Ordering::SeqCst);
        if previous == FixtureState::Disposed as u8 {
            return Ok(());
        }

        match self
            .logger
            .as_ref()
            .and_then(DeferredValue::get_if_realized)
        {
            Some(Ok(pipeline)) => pipeline.shutdown().await,
            _ => Ok(()),
        }
    }
}

impl Default for UnitTest {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UnitTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitTest")
            .field("state", &self.state())
            .field("auto_faker", &self.auto_faker)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}
