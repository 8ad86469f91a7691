//! Shell execution tool

use async_trait::async_trait;
use drover_core::{DroverError, Result, ToolKind, ToolOutcome, ToolParams};
use drover_instance::{BashRequest, Instance};
use serde_json::Value;

use crate::tool::Tool;

const API_TYPE: &str = "bash_20241022";
const NAME: &str = "bash";

/// Runs commands in the instance's persistent shell context; the optional
/// restart flag recycles that context.
#[derive(Debug, Clone, Default)]
pub struct BashTool;

#[async_trait]
impl Tool for BashTool {
    fn params(&self) -> ToolParams {
        ToolParams::new(NAME, API_TYPE)
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Shell
    }

    async fn invoke(&self, input: Value, instance: &Instance) -> Result<ToolOutcome> {
        let request: BashRequest = serde_json::from_value(input)
            .map_err(|e| DroverError::Tool(format!("Bad bash arguments: {}", e)))?;
        instance.bash(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_shape() {
        let value = serde_json::to_value(BashTool.params()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "name": "bash", "type": "bash_20241022" })
        );
    }
}
