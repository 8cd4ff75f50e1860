use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use autoapply::agents::history::compute_metrics;
use autoapply::agents::{AgentConfig, AgentOptions, INVALID_INPUT_ERROR};
use autoapply::{Agent, AgentContext, AgentError, AgentResult, AgentStatus, ExecutionRecord, ManagedAgent};
use chrono::Utc;
use serde_json::{json, Value};

/// Behaviour is selected by the `action` key of the input map.
struct Scripted;

#[async_trait]
impl Agent for Scripted {
    type Input = HashMap<String, Value>;
    type Output = Value;

    fn validate_input(&self, input: &Self::Input) -> bool {
        if input.get("action") == Some(&json!("corrupt")) {
            panic!("validator read a corrupt payload");
        }
        input.contains_key("action")
    }

    async fn execute(&self, input: Self::Input, ctx: &AgentContext) -> Result<AgentResult<Value>, AgentError> {
        let action = input["action"].as_str().unwrap_or_default().to_string();
        match action.as_str() {
            "ok" => Ok(AgentResult::success_result(json!({"echo": input["value"]}), None)),
            "raise" => Err(AgentError::execution("upstream service unavailable")),
            "fail" => Ok(AgentResult::failure_result("no matching jobs", None)),
            "panic" => panic!("boom"),
            "sleep" => {
                let ms = input["value"].as_u64().unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(AgentResult::success_result(json!(ms), None))
            }
            "wait_cancel" => {
                ctx.cancellation().cancelled().await;
                Ok(AgentResult::failure_result("stopped on request", None))
            }
            "config" => Ok(AgentResult::success_result(
                ctx.get_config("model").unwrap_or(Value::Null),
                None,
            )),
            "seq" => Ok(AgentResult::success_result(Value::Null, None).with_metadata("seq", input["value"].clone())),
            other => Ok(AgentResult::failure_result(format!("unknown action {}", other), None)),
        }
    }
}

fn input(action: &str, value: Value) -> HashMap<String, Value> {
    HashMap::from([
        ("action".to_string(), json!(action)),
        ("value".to_string(), value),
    ])
}

fn agent() -> ManagedAgent<Scripted> {
    ManagedAgent::new("scripted", Scripted)
}

#[tokio::test]
async fn rejected_input_is_recorded_without_touching_status() {
    let agent = agent();
    let result = agent.run(HashMap::new()).await;

    assert!(!result.is_success());
    assert_eq!(result.error(), Some(INVALID_INPUT_ERROR));
    assert_eq!(result.execution_time(), 0.0);
    assert_eq!(agent.get_status(), AgentStatus::Idle);

    let history = agent.get_execution_history();
    assert_eq!(history.len(), 1);
    assert!(!history[0].success);
    assert_eq!(history[0].input_summary, "map with keys: []");
}

#[tokio::test]
async fn raised_error_becomes_failed_result() {
    let agent = agent();
    let result = agent.run(input("raise", Value::Null)).await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("upstream service unavailable"));
    assert!(result.execution_time() >= 0.0);
    assert_eq!(agent.get_status(), AgentStatus::Failed);
    assert_eq!(
        agent.get_execution_history()[0].input_summary,
        "map with keys: [action, value]"
    );
}

#[tokio::test]
async fn expected_failure_is_failed_status() {
    let agent = agent();
    let result = agent.run(input("fail", Value::Null)).await;
    assert_eq!(result.error(), Some("no matching jobs"));
    assert_eq!(agent.get_status(), AgentStatus::Failed);
}

#[tokio::test]
async fn success_carries_data_and_time() {
    let agent = agent();
    let result = agent.run(input("sleep", json!(15))).await;

    assert!(result.is_success());
    assert_eq!(result.data(), Some(&json!(15)));
    assert!(result.execution_time() >= 0.015);
    assert_eq!(agent.get_status(), AgentStatus::Completed);

    let record = &agent.get_execution_history()[0];
    assert!(record.success);
    assert!(record.error.is_none());
    assert_eq!(record.execution_time, result.execution_time());
}

#[tokio::test]
async fn panic_in_execute_is_contained() {
    let agent = agent();
    let result = agent.run(input("panic", Value::Null)).await;
    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("boom"));
    assert_eq!(agent.get_status(), AgentStatus::Failed);

    let next = agent.run(input("ok", json!(1))).await;
    assert!(next.is_success());
}

#[tokio::test]
async fn panic_in_validation_is_contained() {
    let agent = agent();
    let outcome = tokio::spawn({
        let agent = agent.clone();
        async move { agent.run(input("corrupt", Value::Null)).await }
    })
    .await;

    let result = outcome.expect("panic escaped run");
    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("validator read a corrupt payload"));
    assert_eq!(agent.get_status(), AgentStatus::Failed);
    assert_eq!(agent.get_execution_history().len(), 1);
}

#[tokio::test]
async fn parallel_validation_panic_is_isolated() {
    let agent = agent();
    let results = agent
        .execute_parallel(vec![
            input("ok", json!(1)),
            input("corrupt", Value::Null),
            input("ok", json!(3)),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_success());
    assert!(results[1].error().unwrap().contains("corrupt payload"));
    assert!(results[2].is_success());
}

#[tokio::test]
async fn history_keeps_latest_hundred_runs() {
    let agent = agent();
    for i in 1..=101 {
        agent.run(input("seq", json!(i))).await;
    }

    let history = agent.get_execution_history();
    assert_eq!(history.len(), 100);
    assert_eq!(history.first().unwrap().metadata["seq"], json!(2));
    assert_eq!(history.last().unwrap().metadata["seq"], json!(101));
}

#[tokio::test]
async fn history_capacity_is_configurable() {
    let options = AgentOptions { history_capacity: 3, ..Default::default() };
    let agent = ManagedAgent::with_options("small", Scripted, AgentConfig::new(), options);
    for i in 1..=5 {
        agent.run(input("seq", json!(i))).await;
    }
    let seqs: Vec<Value> = agent
        .get_execution_history()
        .into_iter()
        .map(|r| r.metadata["seq"].clone())
        .collect();
    assert_eq!(seqs, vec![json!(3), json!(4), json!(5)]);
}

#[tokio::test]
async fn history_is_a_copy() {
    let agent = agent();
    agent.run(input("ok", json!(1))).await;
    let mut snapshot = agent.get_execution_history();
    snapshot.clear();
    assert_eq!(agent.get_execution_history().len(), 1);
}

#[test]
fn metrics_from_mixed_history() {
    let record = |success: bool, secs: f64| ExecutionRecord {
        timestamp: Utc::now(),
        input_summary: "Job".to_string(),
        success,
        error: (!success).then(|| "failed".to_string()),
        execution_time: secs,
        metadata: Default::default(),
    };
    let records = [record(true, 1.0), record(true, 2.0), record(true, 3.0), record(false, 4.0)];

    let metrics = compute_metrics(records.iter()).unwrap();
    assert_eq!(metrics.total_executions, 4);
    assert_eq!(metrics.successful_executions, 3);
    assert_eq!(metrics.failed_executions, 1);
    assert_eq!(metrics.success_rate, 75.0);
    assert_eq!(metrics.average_execution_time, 2.5);
    assert_eq!(metrics.average_successful_execution_time, Some(2.0));
}

#[tokio::test]
async fn metrics_track_runs_and_rejections() {
    let agent = agent();
    assert!(agent.get_performance_metrics().is_none());

    agent.run(input("ok", json!(1))).await;
    agent.run(input("ok", json!(2))).await;
    agent.run(input("fail", Value::Null)).await;
    agent.run(HashMap::new()).await;

    let metrics = agent.get_performance_metrics().unwrap();
    assert_eq!(metrics.total_executions, 4);
    assert_eq!(metrics.successful_executions, 2);
    assert_eq!(metrics.success_rate, 50.0);
    assert!(metrics.last_execution.is_some());
}

#[tokio::test]
async fn config_is_readable_inside_execute() {
    let config = AgentConfig::from([("model".to_string(), json!("gpt-4"))]);
    let agent = ManagedAgent::with_config("configured", Scripted, config);

    assert_eq!(agent.get_config("model"), Some(json!("gpt-4")));
    assert_eq!(agent.get_config_or("missing", json!(7)), json!(7));

    let first = agent.run(input("config", Value::Null)).await;
    assert_eq!(first.data(), Some(&json!("gpt-4")));

    agent.update_config("model", "claude-3-sonnet");
    let second = agent.run(input("config", Value::Null)).await;
    assert_eq!(second.data(), Some(&json!("claude-3-sonnet")));
}

#[tokio::test]
async fn timeout_yields_failure() {
    let options = AgentOptions { timeout: Some(Duration::from_millis(20)), ..Default::default() };
    let agent = ManagedAgent::with_options("bounded", Scripted, AgentConfig::new(), options);

    let result = agent.run(input("sleep", json!(5_000))).await;
    assert!(!result.is_success());
    assert!(result.error().unwrap().starts_with("Execution timed out after"));
    assert_eq!(agent.get_status(), AgentStatus::Failed);
}

#[tokio::test]
async fn cancel_during_run_keeps_cancelled_status() {
    let agent = agent();
    let running = {
        let agent = agent.clone();
        tokio::spawn(async move { agent.run(input("wait_cancel", Value::Null)).await })
    };

    while agent.get_status() != AgentStatus::Running {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    agent.cancel();

    let result = running.await.unwrap();
    assert_eq!(result.error(), Some("stopped on request"));
    assert_eq!(agent.get_status(), AgentStatus::Cancelled);
    assert_eq!(agent.get_execution_history().len(), 1);
}

#[tokio::test]
async fn reset_from_cancelled_allows_new_runs() {
    let agent = agent();
    agent.cancel();
    assert_eq!(agent.get_status(), AgentStatus::Cancelled);
    assert!(agent.cancellation_token().is_cancelled());

    agent.reset();
    assert_eq!(agent.get_status(), AgentStatus::Idle);
    assert!(!agent.cancellation_token().is_cancelled());

    let result = agent.run(input("ok", json!(3))).await;
    assert!(result.is_success());
    assert_eq!(agent.get_status(), AgentStatus::Completed);
}

#[tokio::test]
async fn parallel_results_keep_input_order() {
    let agent = agent();
    let results = agent
        .execute_parallel(vec![
            input("sleep", json!(60)),
            input("sleep", json!(0)),
            input("sleep", json!(30)),
        ])
        .await;

    let data: Vec<Value> = results.iter().map(|r| r.data().cloned().unwrap()).collect();
    assert_eq!(data, vec![json!(60), json!(0), json!(30)]);

    // History is in completion order: the second task finished first.
    let history = agent.get_execution_history();
    assert_eq!(history.len(), 3);
    assert!(history[0].execution_time < 0.03);
    assert!(history[2].execution_time >= 0.06);
    assert_eq!(agent.get_status(), AgentStatus::Completed);
}

#[tokio::test]
async fn parallel_panic_is_isolated() {
    let agent = agent();
    let results = agent
        .execute_parallel(vec![
            input("ok", json!(1)),
            input("panic", Value::Null),
            input("ok", json!(3)),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_success());
    assert!(!results[1].is_success());
    assert!(results[1].error().unwrap().contains("boom"));
    assert_eq!(results[2].data(), Some(&json!({"echo": 3})));
}

#[tokio::test]
async fn chain_stops_at_first_failure() {
    let a = ManagedAgent::new("a", Forward { fail: false });
    let b = ManagedAgent::new("b", Forward { fail: true });
    let c = ManagedAgent::new("c", Forward { fail: false });

    let result = a.chain(&b).chain(&c).run_chain(json!({"step": 0})).await;

    assert!(!result.is_success());
    assert_eq!(result.error(), Some("b refused"));
    assert_eq!(a.get_execution_history().len(), 1);
    assert_eq!(b.get_execution_history().len(), 1);
    assert!(c.get_execution_history().is_empty());
    assert_eq!(c.get_status(), AgentStatus::Idle);
}

#[tokio::test]
async fn chain_passes_payload_through_every_link() {
    let a = ManagedAgent::new("a", Forward { fail: false });
    let b = ManagedAgent::new("b", Forward { fail: false });
    let c = ManagedAgent::new("c", Forward { fail: false });

    let result = a.chain(&b).chain(&c).run_chain(json!({"step": 0})).await;
    assert_eq!(result.data(), Some(&json!({"step": 3})));
}

struct Forward {
    fail: bool,
}

#[async_trait]
impl Agent for Forward {
    type Input = Value;
    type Output = Value;

    fn validate_input(&self, input: &Value) -> bool {
        input.get("step").is_some()
    }

    async fn execute(&self, input: Value, ctx: &AgentContext) -> Result<AgentResult<Value>, AgentError> {
        if self.fail {
            return Ok(AgentResult::failure_result(format!("{} refused", ctx.name()), None));
        }
        let step = input["step"].as_u64().unwrap_or(0);
        Ok(AgentResult::success_result(json!({"step": step + 1}), None))
    }
}
