//! Pointer/keyboard control tool

use async_trait::async_trait;
use drover_core::{DroverError, Result, ToolKind, ToolOutcome, ToolParams};
use drover_instance::{ComputerRequest, Instance};
use serde_json::{json, Value};

use crate::tool::Tool;

const API_TYPE: &str = "computer_20241022";
const NAME: &str = "computer";

/// Mouse and keyboard control of the instance display.
///
/// The parameter schema is fixed by the provider; only the display
/// geometry advertised in the descriptor is ours to choose.
#[derive(Debug, Clone)]
pub struct ComputerTool {
    width: u32,
    height: u32,
    display_number: u32,
}

impl ComputerTool {
    pub fn new(width: u32, height: u32, display_number: u32) -> Self {
        Self {
            width,
            height,
            display_number,
        }
    }
}

impl Default for ComputerTool {
    fn default() -> Self {
        Self::new(1024, 768, 1)
    }
}

#[async_trait]
impl Tool for ComputerTool {
    fn params(&self) -> ToolParams {
        ToolParams::new(NAME, API_TYPE)
            .with_field("display_width_px", json!(self.width))
            .with_field("display_height_px", json!(self.height))
            .with_field("display_number", json!(self.display_number))
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Computer
    }

    async fn invoke(&self, input: Value, instance: &Instance) -> Result<ToolOutcome> {
        let request: ComputerRequest = serde_json::from_value(input)
            .map_err(|e| DroverError::Tool(format!("Bad computer arguments: {}", e)))?;
        instance.computer(request).await
    }
}
