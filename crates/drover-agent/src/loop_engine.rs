//! The agent control loop
//!
//! Request a completion, dispatch any requested tool calls in order, feed
//! the normalized results back, repeat. A response with no tool calls is
//! the termination signal: the model only answers in plain text when it
//! has nothing further to act on.
//!
//! Tool dispatch is strictly sequential within a round: actions mutate
//! screen state, so a click must land before the next action's coordinates
//! mean anything. A failed dispatch (unknown tool, tool error) simply
//! contributes no result for that call; a failed completion request aborts
//! the run.

use drover_core::{ContentBlock, Message, Result, Usage};
use drover_instance::Instance;
use drover_tools::ToolCollection;
use tracing::{debug, info, warn};

use crate::client::CompletionService;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model replied without tool calls
    Finished,
    /// The configured iteration cap was reached
    MaxIterations,
}

/// Result of a completed loop run
#[derive(Debug, Clone)]
pub struct LoopResult {
    /// Text of the final assistant turn (last text block wins)
    pub final_text: String,
    /// Completed request/act rounds
    pub iterations: usize,
    /// Token usage accumulated across all rounds
    pub total_usage: Usage,
    pub stop_reason: StopReason,
}

/// Drive the loop to completion.
///
/// `max_iterations` of 0 means unbounded; otherwise the loop stops after
/// that many completed rounds and reports [`StopReason::MaxIterations`].
pub async fn run_agent(
    model: &dyn CompletionService,
    system_prompt: &str,
    user_prompt: &str,
    tools: &ToolCollection,
    instance: &Instance,
    max_iterations: usize,
) -> Result<LoopResult> {
    let tool_params = tools.to_params();

    let mut messages = vec![Message::user_text(user_prompt)];
    let mut total_usage = Usage::default();
    let mut iteration: usize = 0;

    loop {
        iteration += 1;
        if max_iterations > 0 && iteration > max_iterations {
            warn!("Max iterations ({}) reached", max_iterations);
            return Ok(LoopResult {
                final_text: final_assistant_text(&messages),
                iterations: iteration - 1,
                total_usage,
                stop_reason: StopReason::MaxIterations,
            });
        }

        let response = model
            .complete(system_prompt, &messages, &tool_params)
            .await?;

        if let Some(usage) = &response.usage {
            total_usage.add(usage);
        }

        // Dispatch tool calls in response order, one at a time.
        let mut tool_results = Vec::new();
        for block in &response.content {
            match block {
                ContentBlock::Text { text } => {
                    info!("Assistant: {}", text);
                }
                ContentBlock::ToolUse { id, name, input } => {
                    info!("Running tool: {}", name);
                    debug!("Tool input: {}", input);

                    if let Some(outcome) = tools.run(name, input.clone(), instance).await {
                        if let Some(output) = &outcome.output {
                            if !output.is_empty() {
                                info!("Tool output: {}", output);
                            }
                        }
                        tool_results.push(outcome.into_result_block(id));
                    }
                }
                _ => {}
            }
        }

        // The assistant turn carries the raw response content unmodified.
        messages.push(Message::assistant(response.content));

        if tool_results.is_empty() {
            info!("Loop finished after {} iterations", iteration);
            return Ok(LoopResult {
                final_text: final_assistant_text(&messages),
                iterations: iteration,
                total_usage,
                stop_reason: StopReason::Finished,
            });
        }

        messages.push(Message::user(tool_results));
    }
}

/// Text of the last assistant turn; when it carries several text blocks
/// the last one wins.
fn final_assistant_text(messages: &[Message]) -> String {
    let mut text = String::new();
    if let Some(last) = messages
        .iter()
        .rev()
        .find(|m| m.role == drover_core::Role::Assistant)
    {
        for block in &last.content {
            if let ContentBlock::Text { text: t } = block {
                text = t.clone();
            }
        }
    }
    text
}
