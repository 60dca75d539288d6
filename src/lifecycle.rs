//! Lifecycle hooks for test cases built on a [`UnitTest`].
//!
//! A test case embeds a `UnitTest` and implements [`UnitTestCase`] to get
//! the generators and logger through composition. [`run_case`] drives the
//! hooks the way a test runner would: initialize, body, dispose, each once.

use std::future::Future;

use crate::core::auto_fake::AutoFaker;
use crate::core::faker::FakeGenerator;
use crate::core::logging::Logger;
use crate::error::Result;
use crate::fixture::UnitTest;

/// A test case composed over a [`UnitTest`].
///
/// ```rust,ignore
/// struct OrderTests {
///     base: UnitTest,
/// }
///
/// impl UnitTestCase for OrderTests {
///     fn fixture(&self) -> &UnitTest {
///         &self.base
///     }
/// }
/// ```
#[allow(async_fn_in_trait)]
pub trait UnitTestCase: Sized {
    /// The embedded base fixture.
    fn fixture(&self) -> &UnitTest;

    fn faker(&self) -> &FakeGenerator {
        self.fixture().faker()
    }

    fn auto_faker(&self) -> &AutoFaker {
        self.fixture().auto_faker()
    }

    /// Logger whose category is this test case's type.
    fn logger(&self) -> Result<Logger<Self>> {
        self.fixture().logger_for::<Self>()
    }

    /// Async setup before the test body. Overrides should call the default
    /// through `self.fixture().initialize()` to keep the lifecycle state.
    async fn initialize(&self) -> Result<()> {
        self.fixture().initialize().await
    }

    /// Async teardown after the test body.
    async fn dispose(&self) -> Result<()> {
        self.fixture().dispose().await
    }
}

/// Run `body` between `initialize` and `dispose`.
///
/// `dispose` runs even when `initialize` or the body fails. The first
/// failure wins; a teardown failure that follows a body failure is attached
/// as context rather than replacing it.
pub async fn run_case<'a, C, F, Fut, T>(case: &'a C, body: F) -> anyhow::Result<T>
where
    C: UnitTestCase,
    F: FnOnce(&'a C) -> Fut,
    Fut: Future<Output = anyhow::Result<T>> + 'a,
{
    let outcome = match case.initialize().await {
        Ok(()) => body(case).await,
        Err(err) => Err(anyhow::Error::new(err).context("test case initialization failed")),
    };
    let teardown = case.dispose().await;

    match (outcome, teardown) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(anyhow::Error::new(err).context("test case teardown failed")),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(teardown)) => Err(err.context(format!("teardown also failed: {teardown}"))),
    }
}
