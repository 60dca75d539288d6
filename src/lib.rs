//! unit-fixture - base fixture for unit tests
//!
//! Provides a fake-data generator, an auto-populating object generator and
//! an optional per-test logger that routes `tracing` output to the test's
//! captured output. Everything is built lazily, once per fixture.

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod core;
pub mod error;
pub mod fixture;
pub mod lifecycle;

pub use config::FixtureConfig;
pub use self::core::{
    AutoFaker, AutoFakerConfig, CapturedOutput, DeferredValue, FakeGenerator, InjectableSink,
    LogFormat, Logger, LoggerPipeline, OutputSink, TestOutput,
};
pub use error::{ErrorCategory, FixtureError, Result};
pub use fixture::{FixtureState, UnitTest, UnitTestOptions};
pub use lifecycle::{UnitTestCase, run_case};

// Re-export so test crates can `#[derive(Dummy)]` without a direct dependency.
pub use fake;

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
