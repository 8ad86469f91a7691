//! Caller-facing operations
//!
//! [`launch`] runs a free-form instruction; [`scrape`] runs the same loop
//! as a typed extractor. Both own the instance lifecycle: the instance is
//! started before the loop and stopped on every exit path, including when
//! the loop or the extraction fails.

use chrono::Utc;
use drover_core::{InstanceSize, Result};
use drover_instance::{open_url, Instance, InstanceClient};
use drover_tools::ToolCollection;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::CompletionService;
use crate::extract::extract_json;
use crate::loop_engine::run_agent;
use crate::prompt::{derive_task, launch_prompt, scrape_prompt, ScrapeTarget};

/// Options shared by [`launch`] and [`scrape`]
#[derive(Clone, Default)]
pub struct RunOptions {
    /// URL to open in the instance browser before the agent starts
    pub url: Option<String>,
    /// Instance size class
    pub size: InstanceSize,
    /// Iteration cap for the loop; 0 means unbounded
    pub max_iterations: usize,
    /// Tool set override; defaults to the standard computer-use set
    pub tools: Option<ToolCollection>,
}

/// Run a computer-use agent against a fresh instance.
///
/// Returns the agent's final answer text. Fails on provisioning or model
/// service errors; the instance is stopped either way.
pub async fn launch(
    model: &dyn CompletionService,
    instances: &InstanceClient,
    cmd: &str,
    options: RunOptions,
) -> Result<String> {
    let RunOptions {
        url,
        size,
        max_iterations,
        tools,
    } = options;
    let tools = tools.unwrap_or_else(ToolCollection::default_set);

    let instance = instances.start(size).await?;
    announce_stream(instances, &instance).await;

    let result = async {
        if let Some(url) = &url {
            open_url(&instance, url).await;
        }
        let system_prompt = launch_prompt(Utc::now());
        run_agent(model, &system_prompt, cmd, &tools, &instance, max_iterations).await
    }
    .await;

    release(instances, &instance).await;
    Ok(result?.final_text)
}

/// Use the agent as a typed information retriever.
///
/// The query type's schema defines the response contract; its doc string
/// (or `cmd`) defines the instruction. Validation failures propagate to
/// the caller untouched; there is no automatic re-prompt.
pub async fn scrape<T: ScrapeTarget>(
    model: &dyn CompletionService,
    instances: &InstanceClient,
    cmd: Option<String>,
    options: RunOptions,
) -> Result<T> {
    let (schema, command) = derive_task::<T>(cmd)?;
    let value = scrape_value(model, instances, &schema, &command, options).await?;
    Ok(serde_json::from_value(value)?)
}

/// Schema-driven extraction without a concrete Rust type.
///
/// Embeds `schema` in the system prompt, runs the loop, and returns the
/// JSON object extracted from the final answer. The caller is responsible
/// for any validation beyond JSON well-formedness.
pub async fn scrape_value(
    model: &dyn CompletionService,
    instances: &InstanceClient,
    schema: &Value,
    cmd: &str,
    options: RunOptions,
) -> Result<Value> {
    let RunOptions {
        url,
        size,
        max_iterations,
        tools,
    } = options;
    let tools = tools.unwrap_or_else(ToolCollection::default_set);

    let instance = instances.start(size).await?;
    announce_stream(instances, &instance).await;

    let result = async {
        if let Some(url) = &url {
            open_url(&instance, url).await;
        }
        let system_prompt = scrape_prompt(Utc::now(), schema);
        run_agent(model, &system_prompt, cmd, &tools, &instance, max_iterations).await
    }
    .await;

    release(instances, &instance).await;
    extract_json(&result?.final_text)
}

/// Stop the instance, logging rather than propagating failures so teardown
/// never masks the run's own result.
async fn release(instances: &InstanceClient, instance: &Instance) {
    if let Err(e) = instances.stop(instance).await {
        warn!("Failed to stop instance {}: {}", instance.id(), e);
    }
}

/// Best-effort live-view announcement for watching the run.
async fn announce_stream(instances: &InstanceClient, instance: &Instance) {
    match instances.stream_url(instance).await {
        Ok(url) => info!("Instance live view: {}", url),
        Err(e) => debug!("No live view available: {}", e),
    }
}
