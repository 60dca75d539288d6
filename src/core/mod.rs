//! Deferred values, generators, sinks and the logging pipeline.

pub mod auto_fake;
pub mod deferred;
pub mod faker;
pub mod logging;
pub mod sink;

pub use auto_fake::{AutoFaker, AutoFakerConfig};
pub use deferred::DeferredValue;
pub use faker::FakeGenerator;
pub use logging::{LogFormat, Logger, LoggerPipeline};
pub use sink::{AdapterWriter, CapturedOutput, InjectableSink, OutputSink, TestOutput};
