//! Control loop behavior against a scripted model and fake tools

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use drover_agent::{run_agent, CompletionService, ModelResponse, StopReason};
use drover_core::{
    ContentBlock, DroverError, Message, Result, Role, ToolKind, ToolOutcome, ToolParams, Usage,
};
use drover_instance::{Instance, InstanceClient};
use drover_tools::{Tool, ToolCollection};
use serde_json::{json, Value};

struct ScriptedModel {
    responses: Mutex<VecDeque<ModelResponse>>,
    histories: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            histories: Mutex::new(Vec::new()),
        }
    }

    fn push_response(&self, content: Vec<ContentBlock>, usage: Option<Usage>) {
        let id = format!("msg_{:02}", self.responses.lock().unwrap().len());
        self.responses.lock().unwrap().push_back(ModelResponse {
            id,
            content,
            stop_reason: None,
            usage,
        });
    }

    fn histories(&self) -> Vec<Vec<Message>> {
        self.histories.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedModel {
    async fn complete(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        _tools: &[ToolParams],
    ) -> Result<ModelResponse> {
        self.histories.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DroverError::Api("no scripted response queued".to_string()))
    }
}

/// Fake tool that records invocation order and answers with its own name.
struct EchoTool {
    name: &'static str,
    delay: Duration,
    log: Arc<Mutex<Vec<String>>>,
}

impl EchoTool {
    fn new(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Arc<dyn Tool> {
        Arc::new(Self {
            name,
            delay: Duration::ZERO,
            log,
        })
    }

    fn slow(name: &'static str, delay_ms: u64, log: Arc<Mutex<Vec<String>>>) -> Arc<dyn Tool> {
        Arc::new(Self {
            name,
            delay: Duration::from_millis(delay_ms),
            log,
        })
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn params(&self) -> ToolParams {
        ToolParams::new(self.name, "echo_test")
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Shell
    }

    async fn invoke(&self, _input: Value, _instance: &Instance) -> Result<ToolOutcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.log.lock().unwrap().push(self.name.to_string());
        Ok(ToolOutcome {
            output: Some(format!("{} ran", self.name)),
            ..Default::default()
        })
    }
}

fn test_instance() -> Instance {
    InstanceClient::new("http://127.0.0.1:0", "test").attach("inst_test")
}

fn text(t: &str) -> ContentBlock {
    ContentBlock::Text {
        text: t.to_string(),
    }
}

fn tool_use(id: &str, name: &str) -> ContentBlock {
    ContentBlock::ToolUse {
        id: id.to_string(),
        name: name.to_string(),
        input: json!({}),
    }
}

/// Tool-result ids of a user turn, in content order.
fn result_ids(message: &Message) -> Vec<String> {
    message
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn click_then_report_scenario() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tools = ToolCollection::new(vec![EchoTool::new("computer", log.clone())]);

    let model = ScriptedModel::new();
    model.push_response(
        vec![
            text("Clicking the login button."),
            tool_use("toolu_01", "computer"),
        ],
        Some(Usage {
            input_tokens: 100,
            output_tokens: 30,
        }),
    );
    model.push_response(
        vec![text("Page title: Example")],
        Some(Usage {
            input_tokens: 150,
            output_tokens: 10,
        }),
    );

    let result = run_agent(&model, "system", "click the login button", &tools, &test_instance(), 0)
        .await
        .unwrap();

    assert_eq!(result.final_text, "Page title: Example");
    assert_eq!(result.iterations, 2);
    assert_eq!(result.stop_reason, StopReason::Finished);
    assert_eq!(result.total_usage.input_tokens, 250);
    assert_eq!(result.total_usage.output_tokens, 40);
    assert_eq!(log.lock().unwrap().as_slice(), ["computer"]);
}

#[tokio::test]
async fn dispatch_order_matches_request_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tools = ToolCollection::new(vec![
        EchoTool::slow("alpha", 20, log.clone()),
        EchoTool::new("beta", log.clone()),
        EchoTool::new("gamma", log.clone()),
    ]);

    let model = ScriptedModel::new();
    model.push_response(
        vec![
            tool_use("toolu_a", "alpha"),
            tool_use("toolu_b", "beta"),
            tool_use("toolu_c", "gamma"),
        ],
        None,
    );
    model.push_response(vec![text("done")], None);

    let result = run_agent(&model, "system", "go", &tools, &test_instance(), 0)
        .await
        .unwrap();
    assert_eq!(result.final_text, "done");

    // The slow tool ran to completion before the next dispatch started.
    assert_eq!(log.lock().unwrap().as_slice(), ["alpha", "beta", "gamma"]);

    // The tool-result turn preserves request order on the wire.
    let histories = model.histories();
    let second_history = &histories[1];
    let results_turn = &second_history[2];
    assert_eq!(results_turn.role, Role::User);
    assert_eq!(result_ids(results_turn), ["toolu_a", "toolu_b", "toolu_c"]);
}

#[tokio::test]
async fn unknown_tool_produces_no_result_block() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tools = ToolCollection::new(vec![EchoTool::new("alpha", log.clone())]);

    let model = ScriptedModel::new();
    model.push_response(
        vec![
            tool_use("toolu_known", "alpha"),
            tool_use("toolu_missing", "no_such_tool"),
        ],
        None,
    );
    model.push_response(vec![text("recovered")], None);

    let result = run_agent(&model, "system", "go", &tools, &test_instance(), 0)
        .await
        .unwrap();
    assert_eq!(result.final_text, "recovered");

    let histories = model.histories();
    let results_turn = &histories[1][2];
    assert_eq!(result_ids(results_turn), ["toolu_known"]);
}

#[tokio::test]
async fn unknown_only_round_terminates_loop() {
    let tools = ToolCollection::new(vec![]);

    let model = ScriptedModel::new();
    model.push_response(
        vec![text("trying a tool"), tool_use("toolu_x", "ghost")],
        None,
    );

    let result = run_agent(&model, "system", "go", &tools, &test_instance(), 0)
        .await
        .unwrap();

    // No dispatchable call produced a result, so the round ends the loop
    // and the final answer is that turn's text.
    assert_eq!(result.final_text, "trying a tool");
    assert_eq!(result.iterations, 1);
    assert_eq!(result.stop_reason, StopReason::Finished);
}

#[tokio::test]
async fn history_grows_append_only() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tools = ToolCollection::new(vec![EchoTool::new("alpha", log.clone())]);

    let model = ScriptedModel::new();
    model.push_response(vec![tool_use("toolu_01", "alpha")], None);
    model.push_response(vec![tool_use("toolu_02", "alpha")], None);
    model.push_response(vec![text("finished")], None);

    run_agent(&model, "system", "the task", &tools, &test_instance(), 0)
        .await
        .unwrap();

    let histories = model.histories();
    assert_eq!(histories.len(), 3);

    // Seeded with exactly one user turn holding the instruction.
    assert_eq!(histories[0].len(), 1);
    assert_eq!(histories[0][0], Message::user_text("the task"));

    // Each round appends one assistant turn and one tool-result user turn,
    // leaving every earlier turn untouched.
    for round in 1..histories.len() {
        let prev = &histories[round - 1];
        let next = &histories[round];
        assert_eq!(next.len(), prev.len() + 2);
        assert_eq!(&next[..prev.len()], prev.as_slice());
        assert_eq!(next[next.len() - 2].role, Role::Assistant);
        assert_eq!(next[next.len() - 1].role, Role::User);
    }
}

#[tokio::test]
async fn iteration_cap_stops_loop() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tools = ToolCollection::new(vec![EchoTool::new("alpha", log.clone())]);

    let model = ScriptedModel::new();
    for i in 0..10 {
        model.push_response(vec![tool_use(&format!("toolu_{:02}", i), "alpha")], None);
    }

    let result = run_agent(&model, "system", "go", &tools, &test_instance(), 3)
        .await
        .unwrap();

    assert_eq!(result.stop_reason, StopReason::MaxIterations);
    assert_eq!(result.iterations, 3);
    assert_eq!(model.histories().len(), 3);
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn model_failure_aborts_run() {
    let tools = ToolCollection::new(vec![]);
    let model = ScriptedModel::new(); // nothing queued -> complete() errors

    let result = run_agent(&model, "system", "go", &tools, &test_instance(), 0).await;
    assert!(matches!(result, Err(DroverError::Api(_))));
}

#[tokio::test]
async fn tool_result_carries_outcome_content() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tools = ToolCollection::new(vec![EchoTool::new("alpha", log.clone())]);

    let model = ScriptedModel::new();
    model.push_response(vec![tool_use("toolu_01", "alpha")], None);
    model.push_response(vec![text("done")], None);

    run_agent(&model, "system", "go", &tools, &test_instance(), 0)
        .await
        .unwrap();

    let histories = model.histories();
    let results_turn = &histories[1][2];
    match &results_turn.content[0] {
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => {
            assert_eq!(tool_use_id.as_str(), "toolu_01");
            assert!(!*is_error);
            match content {
                drover_core::ToolResultContent::Parts(parts) => {
                    assert_eq!(parts.len(), 1);
                    assert_eq!(parts[0], text("alpha ran"));
                }
                other => panic!("expected parts, got {:?}", other),
            }
        }
        other => panic!("expected tool result, got {:?}", other),
    }
}
