//! Integration tests for HarpBench
//!
//! These tests drive whole campaigns against a scripted in-memory device.

use futures::StreamExt;
use harpbench::prelude::*;
use harpbench::{
    CancellationToken, Cancelled, DeviceConfig, HarpConfig, MethodResult, Report, ReportBuilder,
    RunnerError, SuitesConfig, Value, default_runner, generate_json_report, parse_json_report,
};
use harpbench::internal::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Scripted device
// ============================================================================

#[derive(Clone)]
struct Script {
    who_am_i: Option<u16>,
    /// Seconds between consecutive round trip replies
    reply_interval: f64,
    /// Added to the written timestamp when it is read back
    clock_drift: f64,
    fail_open: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            who_am_i: Some(1216),
            reply_interval: 0.001,
            clock_drift: 0.002,
            fail_open: false,
        }
    }
}

struct ScriptedConnector {
    script: Script,
    opened: AtomicUsize,
}

impl ScriptedConnector {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            opened: AtomicUsize::new(0),
        })
    }
}

struct ScriptedDevice {
    script: Script,
    clock: f64,
}

impl Connector for ScriptedConnector {
    fn open<'a>(
        &'a self,
        endpoint: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn Device>, DeviceError>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let result: Result<Box<dyn Device>, DeviceError> = if self.script.fail_open {
            Err(DeviceError::Open {
                endpoint: endpoint.to_string(),
                reason: "port busy".to_string(),
            })
        } else {
            Ok(Box::new(ScriptedDevice {
                script: self.script.clone(),
                clock: 0.0,
            }))
        };
        Box::pin(std::future::ready(result))
    }
}

impl Device for ScriptedDevice {
    fn read_who_am_i(&mut self) -> BoxFuture<'_, Result<u16, DeviceError>> {
        Box::pin(std::future::ready(
            self.script.who_am_i.ok_or(DeviceError::Disconnected),
        ))
    }

    fn write_timestamp_seconds(&mut self, seconds: u32) -> BoxFuture<'_, Result<(), DeviceError>> {
        self.clock = f64::from(seconds) + self.script.clock_drift;
        Box::pin(std::future::ready(Ok(())))
    }

    fn read_timestamp_seconds(&mut self) -> BoxFuture<'_, Result<f64, DeviceError>> {
        Box::pin(std::future::ready(Ok(self.clock)))
    }

    fn probe_round_trip(&mut self) -> BoxFuture<'_, Result<f64, DeviceError>> {
        self.clock += self.script.reply_interval;
        Box::pin(std::future::ready(Ok(self.clock)))
    }
}

fn small_config() -> SuitesConfig {
    let mut config = SuitesConfig::default();
    config.round_trip.samples = 20;
    config.timestamp.settle = "0ms".to_string();
    config
}

async fn run_to_end(runner: &Runner) -> Vec<(String, MethodResult)> {
    let cancel = CancellationToken::new();
    runner
        .run_all("COM3", &cancel)
        .map(|item| {
            let (suite, result) = item.expect("run was not cancelled");
            (suite.name().to_string(), result)
        })
        .collect()
        .await
}

// ============================================================================
// Discovery and containment
// ============================================================================

#[derive(Default)]
struct Scripted {
    calls: Mutex<Vec<&'static str>>,
}

impl Scripted {
    fn called(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

#[suite(description = "Scripted suite", name = "ScriptedSuite")]
impl Scripted {
    #[harp_test(description = "synchronous assertion")]
    fn first(&self, _port: &str) -> AssertionResult {
        self.called("first");
        AssertionResult::assertion(true, "ok")
    }

    #[harp_test]
    async fn second(&self, port: &str) -> anyhow::Result<ValueResult<String>> {
        self.called("second");
        if port.is_empty() {
            anyhow::bail!("no port");
        }
        Err(DeviceError::Timeout(Duration::from_millis(5)).into())
    }

    fn not_a_test(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    #[harp_test(description = "panics")]
    async fn third(&self, _port: &str) -> TestResult {
        self.called("third");
        panic!("device exploded")
    }

    #[harp_test(description = "still runs")]
    async fn fourth(&self, port: &str) -> ValueResult<String> {
        self.called("fourth");
        ValueResult::evaluate(port.to_string(), |p| p.starts_with("COM"))
    }
}

#[test]
fn test_suite_discovers_cases_in_declaration_order() {
    let suite = Scripted::default();
    assert_eq!(Suite::name(&suite), "ScriptedSuite");
    assert_eq!(Suite::description(&suite), "Scripted suite");
    assert_eq!(Suite::test_count(&suite), 4);

    let cases = suite.cases();
    let names: Vec<_> = cases.iter().map(|c| c.name).collect();
    assert_eq!(names, ["first", "second", "third", "fourth"]);
    assert_eq!(cases[0].description, "synchronous assertion");
    assert_eq!(cases[1].description, "");
}

#[tokio::test]
async fn test_failures_do_not_stop_the_suite() {
    let suite = Scripted::default();
    let cancel = CancellationToken::new();
    let results: Vec<MethodResult> = suite
        .run_all("COM3", &cancel)
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(results.len(), 4);
    assert_eq!(*suite.calls.lock().unwrap(), ["first", "second", "third", "fourth"]);
    assert_eq!(suite.not_a_test(), 4);

    assert_eq!(results[0].result.status(), Status::Passed);
    assert_eq!(results[0].result.message(), Some("ok"));

    let timeout = results[1].result.as_error().unwrap();
    assert_eq!(timeout.kind(), "Timeout");
    assert_eq!(results[1].description, "");

    let panic = results[2].result.as_error().unwrap();
    assert_eq!(panic.kind(), "panic");
    assert_eq!(panic.message(), Some("device exploded"));

    assert_eq!(results[3].result.status(), Status::Passed);
    match &results[3].result {
        TestResult::Value(value) => assert_eq!(value.value(), &Value::Text("COM3".to_string())),
        other => panic!("unexpected result: {other:?}"),
    }
}

// ============================================================================
// Runner composition
// ============================================================================

#[tokio::test]
async fn test_runner_flattens_suites_in_order() {
    let connector = ScriptedConnector::new(Script::default());
    let runner = Runner::new()
        .with_suite(harpbench::WhoAmISuite::new(connector.clone()))
        .with_suite(Scripted::default());
    assert_eq!(runner.test_count(), 5);

    let results = run_to_end(&runner).await;
    let labels: Vec<_> = results
        .iter()
        .map(|(suite, r)| format!("{}::{}", suite, r.name))
        .collect();
    assert_eq!(
        labels,
        [
            "WhoAmISuite::check_who_am_i",
            "ScriptedSuite::first",
            "ScriptedSuite::second",
            "ScriptedSuite::third",
            "ScriptedSuite::fourth",
        ]
    );
}

#[tokio::test]
async fn test_cancel_after_second_result() {
    let connector = ScriptedConnector::new(Script::default());
    let runner = Runner::new()
        .with_suite(harpbench::WhoAmISuite::new(connector.clone()))
        .with_suite(Scripted::default());
    let cancel = CancellationToken::new();

    let mut stream = runner.run_all("COM3", &cancel);
    let mut completed = Vec::new();
    let mut cancelled = false;
    while let Some(item) = stream.next().await {
        match item {
            Ok((_, result)) => {
                completed.push(result.name);
                if completed.len() == 2 {
                    cancel.cancel();
                }
            }
            Err(Cancelled) => cancelled = true,
        }
    }

    assert!(cancelled);
    assert_eq!(completed, ["check_who_am_i", "first"]);
}

#[test]
fn test_runner_rejects_missing_suites() {
    let mut runner = Runner::new();
    assert_eq!(runner.add_suite(None), Err(RunnerError::InvalidArgument("suite")));
    assert_eq!(runner.remove_suite(None), Err(RunnerError::InvalidArgument("suite")));

    let suite: Arc<dyn Suite> = Arc::new(Scripted::default());
    runner.add_suite(Some(Arc::clone(&suite))).unwrap();
    assert_eq!(runner.test_count(), 4);
    assert_eq!(runner.remove_suite(Some(&suite)), Ok(true));
    assert_eq!(runner.remove_suite(Some(&suite)), Ok(false));
}

// ============================================================================
// Built-in suites
// ============================================================================

#[tokio::test]
async fn test_default_runner_passes_on_healthy_device() {
    let connector = ScriptedConnector::new(Script::default());
    let runner = default_runner(connector.clone(), &small_config()).unwrap();
    assert_eq!(runner.test_count(), 3);

    let results = run_to_end(&runner).await;
    let suites: Vec<_> = results.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(suites, ["WhoAmISuite", "RoundTripSuite", "TimestampSecondsSuite"]);
    for (_, result) in &results {
        assert_eq!(result.result.status(), Status::Passed, "{}", result.name);
    }

    assert_eq!(
        results[0].1.result.message(),
        Some("WhoAmI register contains valid value: 1216.")
    );

    let benchmark = results[1].1.result.as_benchmark().unwrap();
    assert_eq!(benchmark.values().len(), 19);
    assert!((benchmark.summary().mean() - 1.0).abs() < 1e-6);

    // One handle per test case
    assert_eq!(connector.opened.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_default_runner_reports_device_faults() {
    let connector = ScriptedConnector::new(Script {
        who_am_i: Some(10_000),
        reply_interval: 0.010,
        clock_drift: 3.0,
        ..Script::default()
    });
    let runner = default_runner(connector, &small_config()).unwrap();
    let results = run_to_end(&runner).await;

    assert_eq!(results[0].1.result.status(), Status::Failed);
    assert_eq!(
        results[0].1.result.message(),
        Some("WhoAmI register contains invalid value: 10000.")
    );

    assert_eq!(results[1].1.result.status(), Status::Failed);
    assert_eq!(
        results[1].1.result.message(),
        Some("Round trip WhoAmI read benchmark exceeded maximum allowed delay of 4 ms.")
    );

    assert_eq!(results[2].1.result.status(), Status::Failed);
    assert_eq!(
        results[2].1.result.message(),
        Some("`TimestampSeconds` register is not writable, Expected value: 42, read value: 45.")
    );
}

#[tokio::test]
async fn test_unreachable_device_becomes_error_results() {
    let connector = ScriptedConnector::new(Script {
        fail_open: true,
        ..Script::default()
    });
    let runner = default_runner(connector, &small_config()).unwrap();
    let results = run_to_end(&runner).await;

    assert_eq!(results.len(), 3);
    for (_, result) in &results {
        let error = result.result.as_error().unwrap();
        assert_eq!(error.kind(), "OpenError");
        assert_eq!(error.message(), Some("failed to open device on COM3: port busy"));
    }
}

#[test]
fn test_default_runner_rejects_bad_settle_time() {
    let connector = ScriptedConnector::new(Script::default());
    let mut config = SuitesConfig::default();
    config.timestamp.settle = "soon".to_string();
    assert!(default_runner(connector, &config).is_err());
}

// ============================================================================
// Reporting
// ============================================================================

async fn record_campaign(runner: &Runner) -> Report {
    let cancel = CancellationToken::new();
    let mut builder = ReportBuilder::new("Harp Device (COM3)");
    let mut stream = runner.run_all("COM3", &cancel);
    while let Some(item) = stream.next().await {
        let (suite, result) = item.unwrap();
        builder.record(suite.name(), suite.description(), result);
    }
    drop(stream);
    builder.finish()
}

#[tokio::test]
async fn test_report_round_trips_through_json() {
    let connector = ScriptedConnector::new(Script {
        who_am_i: None,
        ..Script::default()
    });
    let runner = default_runner(connector, &small_config()).unwrap();
    let report = record_campaign(&runner).await;

    assert_eq!(report.suites.len(), 3);
    assert_eq!(report.suites[0].description, "WhoAmI Register Tests");
    let summary = report.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.passed, 2);

    let json = generate_json_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["suites"][0]["results"][0]["result"]["type"], "error");
    assert_eq!(value["suites"][0]["results"][0]["result"]["kind"], "Disconnected");
    assert_eq!(value["suites"][1]["results"][0]["result"]["type"], "benchmark");

    let restored = parse_json_report(&json).unwrap();
    assert_eq!(restored.suites, report.suites);
}

#[tokio::test]
async fn test_healthy_report_round_trips_through_json() {
    let connector = ScriptedConnector::new(Script::default());
    let runner = default_runner(connector, &small_config()).unwrap();
    let report = record_campaign(&runner).await;
    assert!(report.summary().is_success());

    let json = generate_json_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["suites"][0]["results"][0]["result"]["value"],
        serde_json::json!({ "kind": "uint", "value": 1216 })
    );

    let restored = parse_json_report(&json).unwrap();
    assert_eq!(restored.device_name, report.device_name);
    assert_eq!(restored.suites, report.suites);
    match &restored.suites[0].results[0].result {
        TestResult::Value(result) => assert_eq!(result.value(), &Value::Uint(1216)),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_report_with_nan_timings_reloads() {
    let connector = ScriptedConnector::new(Script {
        reply_interval: f64::NAN,
        ..Script::default()
    });
    let runner = default_runner(connector, &small_config()).unwrap();
    let report = record_campaign(&runner).await;

    let json = generate_json_report(&report).unwrap();
    let restored = parse_json_report(&json).unwrap();

    assert_eq!(restored.suites.len(), 3);
    let bench = restored.suites[1].results[0].result.as_benchmark().unwrap();
    assert_eq!(bench.values().len(), 19);
    assert!(bench.values().iter().all(|v| v.is_nan()));
    assert!(bench.summary().max().is_nan());
    assert_eq!(restored.suites[2].results, report.suites[2].results);
}

#[test]
fn test_value_result_predicates() {
    assert_eq!(ValueResult::evaluate(7, |v| *v > 0).status(), Status::Passed);
    assert_eq!(ValueResult::evaluate(-1, |v| *v > 0).status(), Status::Failed);
}

#[test]
fn test_config_defaults_drive_default_runner() {
    let config = HarpConfig::default();
    assert!(matches!(config.device, DeviceConfig { port: None }));
    let connector = ScriptedConnector::new(Script::default());
    let runner = default_runner(connector, &config.suites).unwrap();
    let names: Vec<_> = runner.suites().iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, ["WhoAmISuite", "RoundTripSuite", "TimestampSecondsSuite"]);
}
