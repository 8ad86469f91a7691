//! Name-keyed tool registry
//!
//! Advertises tool descriptors in registration order (the model sees a
//! deterministic schema list) and dispatches one named invocation at a
//! time. Dispatch is deliberately soft-failing: an unknown name or a tool
//! that errors yields `None` rather than aborting the caller's loop.

use std::collections::HashMap;
use std::sync::Arc;

use drover_core::{ToolOutcome, ToolParams};
use drover_instance::Instance;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::tool::Tool;
use crate::{BashTool, ComputerTool, EditTool};

/// Ordered, name-keyed collection of tools.
///
/// Duplicate names: the last registered tool wins, replacing the earlier
/// one while keeping its position in the advertised descriptor list.
#[derive(Clone, Default)]
pub struct ToolCollection {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolCollection {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut collection = Self::default();
        for tool in tools {
            collection.push(tool);
        }
        collection
    }

    /// The standard computer-use set: pointer/keyboard, shell, editor.
    pub fn default_set() -> Self {
        Self::new(vec![
            Arc::new(ComputerTool::default()),
            Arc::new(BashTool),
            Arc::new(EditTool),
        ])
    }

    /// Register one tool, replacing any earlier tool of the same name.
    pub fn push(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.params().name;
        match self.index.get(&name) {
            Some(&slot) => {
                warn!("Tool {} registered twice, last registration wins", name);
                self.tools[slot] = tool;
            }
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Descriptors to advertise to the model, in registration order.
    pub fn to_params(&self) -> Vec<ToolParams> {
        self.tools.iter().map(|tool| tool.params()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch one invocation.
    ///
    /// Returns `None` when the name is unknown and when the tool itself
    /// errors (logged); callers treat `None` as "no result to report".
    pub async fn run(&self, name: &str, input: Value, instance: &Instance) -> Option<ToolOutcome> {
        let tool = match self.index.get(name) {
            Some(&slot) => &self.tools[slot],
            None => {
                debug!("Model requested unknown tool {}", name);
                return None;
            }
        };

        debug!("Dispatching {:?} tool {} on {}", tool.kind(), name, instance.id());
        match tool.invoke(input, instance).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Error running tool {}: {}", name, e);
                None
            }
        }
    }
}
