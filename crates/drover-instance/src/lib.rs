//! # drover-instance
//!
//! Client for the instance provisioning service and the per-instance
//! session surfaces.
//!
//! [`InstanceClient`] starts and stops remote sandboxed computers;
//! [`Instance`] is the handle to one live computer and exposes its three
//! actuation surfaces (pointer/keyboard, shell, file editor), each a single
//! HTTP call returning a [`drover_core::ToolOutcome`].
//!
//! The caller owns the instance lifecycle: whoever calls
//! [`InstanceClient::start`] must see [`InstanceClient::stop`] run on every
//! exit path, including failures.

mod browser;
mod client;

pub use browser::open_url;
pub use client::{
    BashRequest, ComputerRequest, EditRequest, Instance, InstanceClient,
};
