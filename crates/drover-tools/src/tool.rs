//! The tool capability trait

use async_trait::async_trait;
use drover_core::{Result, ToolKind, ToolOutcome, ToolParams};
use drover_instance::Instance;
use serde_json::Value;

/// A capability the model can invoke against a session.
///
/// Implementations translate the model's structured arguments into one
/// session surface call. Expected failure modes (a bad path, a failing
/// command) must come back as a [`ToolOutcome`] with its error channel set,
/// not as `Err`; `Err` is reserved for transport problems and malformed
/// argument shapes, and the registry soft-fails those.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Descriptor advertised to the model
    fn params(&self) -> ToolParams;

    /// Capability classification
    fn kind(&self) -> ToolKind;

    /// Execute against the given instance
    async fn invoke(&self, input: Value, instance: &Instance) -> Result<ToolOutcome>;
}
