//! End-to-end scenarios for the unit test base fixture.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use unit_fixture::{
    AutoFaker, CapturedOutput, FixtureError, FixtureState, LogFormat, OutputSink, TestOutput,
    UnitTest, UnitTestOptions,
};

mod common;
use common::records::{Person, Team};

#[test]
fn test_hello_reaches_only_its_own_sink() {
    let s1 = Arc::new(CapturedOutput::new());
    let s2 = Arc::new(CapturedOutput::new());
    let first = UnitTest::with_output(s1.clone());
    let _second = UnitTest::with_output(s2.clone());

    first.logger().unwrap().info("hello");

    assert_eq!(s1.count_containing("hello"), 1);
    assert_eq!(s1.lines().len(), 1);
    assert!(s2.lines().is_empty());
}

#[test]
fn test_parallel_fixtures_never_cross_route() {
    const FIXTURES: usize = 8;
    let sinks: Vec<_> = (0..FIXTURES)
        .map(|_| Arc::new(CapturedOutput::new()))
        .collect();

    std::thread::scope(|scope| {
        for (i, sink) in sinks.iter().enumerate() {
            let sink = sink.clone();
            scope.spawn(move || {
                let fixture = UnitTest::with_output(sink);
                let logger = fixture.logger().unwrap();
                for n in 0..25 {
                    logger.debug(&format!("fixture-{i} line-{n}"));
                }
            });
        }
    });

    for (i, sink) in sinks.iter().enumerate() {
        let lines = sink.lines();
        assert_eq!(lines.len(), 25);
        assert!(lines.iter().all(|l| l.contains(&format!("fixture-{i} "))));
    }
}

#[test]
fn test_auto_faker_populates_plain_record() {
    let fixture = UnitTest::new();

    let person: Person = fixture.auto_faker().generate();
    let defaults = Person::default();

    assert_ne!(person.name, defaults.name);
    assert_ne!(person.age, defaults.age);
    assert_ne!(person.email, defaults.email);
    assert!(!fixture.has_logger());
}

#[test]
fn test_auto_faker_populates_nested_graph() {
    let fixture = UnitTest::from_options(
        UnitTestOptions::new().auto_faker(AutoFaker::with_seed(2024)),
    )
    .unwrap();

    let team: Team = fixture.auto_faker().generate();
    assert!(!team.title.is_empty());
    assert!((18..90).contains(&team.lead.age));

    let roster: Vec<Person> = fixture.auto_faker().generate_many();
    assert!((1..=3).contains(&roster.len()));
}

#[test]
fn test_shared_seed_reproduces_a_run() {
    let run = |seed| {
        let fixture =
            UnitTest::from_options(UnitTestOptions::new().auto_faker(AutoFaker::with_seed(seed)))
                .unwrap();
        let person: Person = fixture.auto_faker().generate();
        let number = fixture.faker().int_between(0, 1_000);
        (person, number)
    };

    assert_eq!(run(31), run(31));
}

#[test]
fn test_json_lines_are_parseable() {
    let capture = Arc::new(CapturedOutput::new());
    let fixture = UnitTest::from_options(
        UnitTestOptions::new()
            .output(capture.clone())
            .log_format(LogFormat::Json),
    )
    .unwrap();

    fixture.logger().unwrap().trace("structured hello");

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["level"], "TRACE");
    assert_eq!(value["fields"]["message"], "structured hello");
    assert!(
        value["fields"]["category"]
            .as_str()
            .unwrap()
            .ends_with("UnitTest")
    );
}

#[test]
fn test_requested_logger_without_sink_fails_fast() {
    let err = UnitTest::from_options(UnitTestOptions::new().create_logger(true)).unwrap_err();
    assert_eq!(err, FixtureError::MissingSink);
    assert_eq!(err.code(), "UFX-C001");
}

#[test]
fn test_stdout_sink_is_accepted() {
    let fixture = UnitTest::with_output(Arc::new(TestOutput));
    let logger = fixture.logger().unwrap();
    assert!(logger.is_enabled());
    logger.info("shown only when this test fails or with --nocapture");
}

#[test]
fn test_sync_teardown_with_block_on() {
    let capture = Arc::new(CapturedOutput::new());
    let fixture = UnitTest::with_output(capture.clone());
    fixture.logger().unwrap().warn("tearing down");

    tokio_test::block_on(fixture.dispose()).unwrap();

    assert_eq!(fixture.state(), FixtureState::Disposed);
    assert_eq!(capture.close_calls(), 1);
}

#[tokio::test]
async fn test_double_dispose_releases_adapter_once() {
    let capture = Arc::new(CapturedOutput::new());
    let fixture = UnitTest::with_output(capture.clone());
    let pipeline_logger = fixture.logger().unwrap();
    pipeline_logger.info("first");

    fixture.dispose().await.unwrap();
    fixture.dispose().await.unwrap();

    assert_eq!(capture.close_calls(), 1);
    assert!(!pipeline_logger.is_enabled());
    match fixture.logger_pipeline() {
        Some(Ok(pipeline)) => {
            assert!(pipeline.is_released());
            assert!(pipeline.adapter().is_released());
        }
        other => panic!("expected a realized pipeline, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_sink_fixture_never_builds_pipeline() {
    let fixture = UnitTest::new();
    fixture.initialize().await.unwrap();

    let logger = fixture.logger().unwrap();
    logger.error("goes nowhere");
    let _ = fixture.faker().email();

    fixture.dispose().await.unwrap();
    assert!(!logger.is_enabled());
    assert!(!fixture.is_logger_realized());
    assert!(fixture.logger_pipeline().is_none());
}

#[test]
fn test_dispose_without_tokio_runtime() {
    let capture = Arc::new(CapturedOutput::new());
    let fixture = UnitTest::with_output(capture.clone());
    fixture.logger().unwrap().info("x");

    futures::executor::block_on(fixture.dispose()).unwrap();

    assert_eq!(fixture.state(), FixtureState::Disposed);
    assert_eq!(capture.close_calls(), 1);
    capture.assert_logged("x");
}

/// Sink whose `close` always fails.
#[derive(Debug, Default)]
struct FailingClose {
    lines: AtomicUsize,
    closes: AtomicUsize,
}

impl OutputSink for FailingClose {
    fn write_line(&self, _line: &str) -> io::Result<()> {
        self.lines.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::other("close failed"))
    }
}

#[tokio::test]
async fn test_close_failure_is_reported_once_as_teardown() {
    let sink = Arc::new(FailingClose::default());
    let fixture = UnitTest::with_output(sink.clone());
    let logger = fixture.logger().unwrap();
    logger.info("before teardown");

    let err = fixture.dispose().await.unwrap_err();
    match &err {
        FixtureError::Teardown { failures } => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].contains("close failed"));
        }
        other => panic!("expected a teardown error, got {other:?}"),
    }

    fixture.dispose().await.unwrap();

    assert_eq!(sink.closes.load(Ordering::SeqCst), 1);
    assert_eq!(sink.lines.load(Ordering::SeqCst), 1);
    assert!(!logger.is_enabled());
    assert_eq!(fixture.state(), FixtureState::Disposed);
}
