//! System prompt construction for the two task modes
//!
//! Pure templating: the same inputs always render the same text, with the
//! current time injected by the caller so tests stay deterministic. The
//! scrape variant embeds the caller's JSON schema verbatim so the model
//! knows the exact output contract it must satisfy.

use chrono::{DateTime, Utc};
use drover_core::Result;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Instruction used when a scrape query carries neither an explicit
/// command nor a documentation string.
pub const PASSIVE_EXTRACTION_FALLBACK: &str = "No explicit instructions provided. \
Passively extract the requested information from what is currently visible \
on the page. Do not perform complex actions.";

const CAPABILITY_PREAMBLE: &str = "\
You are operating a sandboxed virtual computer. You control its mouse and \
keyboard, a persistent bash shell, and a file editor through the tools \
provided.

* Coordinates are screen pixels with the origin at the top-left corner.
* Take a screenshot whenever you need to confirm the current screen state \
before acting on it.
* Prefer keyboard shortcuts over long sequences of pointer actions where \
possible.
* The browser may already be open on a relevant page; check before \
navigating manually.";

/// System prompt for an open-ended task
pub fn launch_prompt(now: DateTime<Utc>) -> String {
    format!(
        "{preamble}\n\n\
         Work step by step towards the user's goal. When the task is \
         complete, reply with a plain-text summary of the result and make \
         no further tool calls.\n\n\
         The current time is {time}.",
        preamble = CAPABILITY_PREAMBLE,
        time = now.format(TIME_FORMAT),
    )
}

/// System prompt for a structured-extraction task
///
/// The schema is serialized compactly and embedded verbatim.
pub fn scrape_prompt(now: DateTime<Utc>, schema: &Value) -> String {
    format!(
        "{preamble}\n\n\
         Your goal is to collect the information described below and answer \
         with a single JSON object that matches this JSON schema exactly:\n\n\
         {schema}\n\n\
         Once the information has been gathered, reply with the JSON object \
         and nothing else, and make no further tool calls.\n\n\
         The current time is {time}.",
        preamble = CAPABILITY_PREAMBLE,
        schema = schema,
        time = now.format(TIME_FORMAT),
    )
}

/// A typed scrape query: deserializable from the model's JSON answer, with
/// a derivable JSON schema. The schema's doc comment doubles as the task
/// instruction when no override is given.
pub trait ScrapeTarget: DeserializeOwned + JsonSchema {}

impl<T: DeserializeOwned + JsonSchema> ScrapeTarget for T {}

/// Resolve a scrape query into its JSON schema and instruction text.
///
/// The instruction falls back in three steps: the explicit override if
/// given, else the query type's documentation string (carried in the
/// schema metadata), else [`PASSIVE_EXTRACTION_FALLBACK`].
pub fn derive_task<T: ScrapeTarget>(command: Option<String>) -> Result<(Value, String)> {
    let root = schemars::schema_for!(T);
    let description = root
        .schema
        .metadata
        .as_ref()
        .and_then(|m| m.description.clone());
    let schema = serde_json::to_value(root)?;

    let command = command
        .or(description)
        .unwrap_or_else(|| PASSIVE_EXTRACTION_FALLBACK.to_string());

    Ok((schema, command))
}
