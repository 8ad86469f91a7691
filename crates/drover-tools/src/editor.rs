//! Remote file editing tool

use async_trait::async_trait;
use drover_core::{DroverError, Result, ToolKind, ToolOutcome, ToolParams};
use drover_instance::{EditRequest, Instance};
use serde_json::Value;

use crate::tool::Tool;

const API_TYPE: &str = "text_editor_20241022";
const NAME: &str = "str_replace_editor";

/// View, create, and edit files on the instance. Command-specific fields
/// (view range, old/new string, insert line) forward verbatim; the remote
/// surface validates them.
#[derive(Debug, Clone, Default)]
pub struct EditTool;

#[async_trait]
impl Tool for EditTool {
    fn params(&self) -> ToolParams {
        ToolParams::new(NAME, API_TYPE)
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Editor
    }

    async fn invoke(&self, input: Value, instance: &Instance) -> Result<ToolOutcome> {
        let request: EditRequest = serde_json::from_value(input)
            .map_err(|e| DroverError::Tool(format!("Bad editor arguments: {}", e)))?;
        instance.edit(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_shape() {
        let value = serde_json::to_value(EditTool.params()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "name": "str_replace_editor", "type": "text_editor_20241022" })
        );
    }
}
