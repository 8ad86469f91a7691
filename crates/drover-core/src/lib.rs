//! # drover-core
//!
//! Core types for Drover, an agent that drives a remote sandboxed computer
//! through an LLM tool-use loop.
//!
//! This crate holds everything the other crates agree on:
//!
//! - The unified [`DroverError`] type and [`Result`] alias
//! - The message protocol spoken with the model service ([`Message`],
//!   [`ContentBlock`], [`ToolParams`], [`Usage`])
//! - The outcome shape reported by session surfaces ([`ToolOutcome`])
//! - Repository-level configuration ([`DroverConfig`])

mod config;
mod error;
mod types;

pub use config::{
    DisplayConfig, DroverConfig, InstanceConfig, LoopDefaults, ModelConfig,
};
pub use error::{DroverError, Result};
pub use types::*;
