//! Protocol type definitions shared across Drover crates
//!
//! These types mirror the wire shapes exchanged with the model service
//! (messages made of typed content blocks) and with the instance service
//! (tool outcomes reported by the computer, shell, and editor surfaces).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Size class of a provisioned instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl std::fmt::Display for InstanceSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for InstanceSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(format!("Invalid instance size: {}. Use small, medium, or large.", s)),
        }
    }
}

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in the conversation history
///
/// History is append-only: a run seeds it with a single user turn and only
/// ever pushes new turns onto the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// User turn from prepared content blocks
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// User turn wrapping a single text block (the task instruction shape)
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentBlock::Text { text: text.into() }])
    }

    /// Assistant turn from the model's raw response content
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

/// Typed content unit within a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain prose from either side
    Text { text: String },

    /// Model-requested tool invocation
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },

    /// Result for a prior tool invocation, correlated by `tool_use_id`
    ToolResult {
        tool_use_id: String,
        content: ToolResultContent,
        is_error: bool,
    },

    /// Inline image (screenshots travel base64-encoded)
    Image { source: ImageSource },
}

/// Payload of a tool-result block: a bare error string, or an ordered list
/// of text/image parts. Part order is significant on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Raw(String),
    Parts(Vec<ContentBlock>),
}

/// Base64 image source descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    /// Screenshot payload as delivered by the instance surfaces
    pub fn png_base64(data: impl Into<String>) -> Self {
        Self {
            source_type: "base64".to_string(),
            media_type: "image/png".to_string(),
            data: data.into(),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl Usage {
    /// Accumulate another round's usage into a running total
    pub fn add(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Raw outcome of one tool invocation against a session surface
///
/// Exactly one of `output` / `error` carries the useful channel; a
/// screenshot may accompany `output`. Created fresh per invocation and
/// consumed immediately by [`ToolOutcome::into_result_block`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub base64_image: Option<String>,
    #[serde(default)]
    pub system: Option<String>,
}

impl ToolOutcome {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Normalize this outcome into the tool-result block the model expects.
    ///
    /// On error the error string is forwarded verbatim with `is_error`
    /// set. Otherwise the content is an ordered list: text part first (if
    /// any non-empty output), then the screenshot part (if any).
    pub fn into_result_block(self, tool_use_id: &str) -> ContentBlock {
        if let Some(error) = self.error {
            return ContentBlock::ToolResult {
                tool_use_id: tool_use_id.to_string(),
                content: ToolResultContent::Raw(error),
                is_error: true,
            };
        }

        let mut parts = Vec::new();
        if let Some(output) = self.output {
            if !output.is_empty() {
                parts.push(ContentBlock::Text { text: output });
            }
        }
        if let Some(data) = self.base64_image {
            parts.push(ContentBlock::Image {
                source: ImageSource::png_base64(data),
            });
        }

        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content: ToolResultContent::Parts(parts),
            is_error: false,
        }
    }
}

/// Capability classification of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Pointer/keyboard control of the instance display
    Computer,
    /// Persistent shell on the instance
    Shell,
    /// Remote file viewing and editing
    Editor,
}

/// Tool descriptor advertised to the model
///
/// Serializes to the provider's tool declaration shape: `name`, a versioned
/// `type`, and any tool-specific fields (display geometry for the computer
/// tool) flattened alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParams {
    pub name: String,
    #[serde(rename = "type")]
    pub api_type: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ToolParams {
    pub fn new(name: impl Into<String>, api_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_type: api_type.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
