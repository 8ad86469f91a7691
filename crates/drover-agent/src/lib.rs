//! # drover-agent
//!
//! The agent control loop and its collaborators.
//!
//! This crate turns a natural-language goal into a bounded sequence of
//! model-proposed actions against one remote instance:
//!
//! - [`ModelClient`] speaks the completion API; the [`CompletionService`]
//!   trait is the seam that lets tests script responses
//! - [`launch_prompt`] / [`scrape_prompt`] render the system prompt for the
//!   two task modes; [`derive_task`] resolves a typed scrape query into its
//!   schema and instruction text
//! - [`run_agent`] drives the request/act/observe cycle to completion
//! - [`extract_json`] pulls the JSON object out of a scrape run's answer
//! - [`launch`] and [`scrape`] are the caller-facing operations, owning the
//!   instance lifecycle end to end
//!
//! Everything is dependency-injected: the loop takes the model client,
//! tool collection, and instance handle as arguments, never from globals.

mod auth;
mod client;
mod extract;
mod loop_engine;
mod prompt;
mod run;

pub use auth::get_api_key;
pub use client::{CompletionService, ModelClient, ModelResponse};
pub use extract::extract_json;
pub use loop_engine::{run_agent, LoopResult, StopReason};
pub use prompt::{
    derive_task, launch_prompt, scrape_prompt, ScrapeTarget, PASSIVE_EXTRACTION_FALLBACK,
};
pub use run::{launch, scrape, scrape_value, RunOptions};
