//! Provisioning client and session surface calls
//!
//! One [`InstanceClient`] talks to the provisioning service; each started
//! [`Instance`] keeps a clone of the client so surface calls need no extra
//! wiring. Expected remote failures (a bad path, a failed command) come
//! back inside [`ToolOutcome`] with its `error` channel set; only transport
//! and protocol problems surface as `Err`.

use drover_core::{DroverError, InstanceConfig, InstanceSize, Result, ToolOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::{debug, info};

/// Session surfaces can be slow (screenshots, long shell commands)
const SURFACE_TIMEOUT_SECS: u64 = 180;

/// Client for the instance provisioning service
#[derive(Debug, Clone)]
pub struct InstanceClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl InstanceClient {
    /// Create a client for the given service endpoint
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(SURFACE_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from configuration, resolving the API key from the
    /// configured environment variable
    pub fn from_config(config: &InstanceConfig) -> Result<Self> {
        let api_key = env::var(&config.api_key_env).map_err(|_| {
            DroverError::Auth(format!(
                "No instance service key found. Set {} to the provisioning API key.",
                config.api_key_env
            ))
        })?;
        Ok(Self::new(config.base_url.clone(), api_key))
    }

    /// Start a fresh instance of the given size class
    pub async fn start(&self, size: InstanceSize) -> Result<Instance> {
        info!("Starting {} instance", size);

        let body = self
            .post(
                "/v1/instances",
                &serde_json::json!({ "size": size.to_string() }),
            )
            .await?;

        let id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| DroverError::Instance("Start response missing instance id".to_string()))?
            .to_string();

        info!("Instance {} started", id);
        Ok(Instance {
            id,
            client: self.clone(),
        })
    }

    /// Stop a running instance
    pub async fn stop(&self, instance: &Instance) -> Result<()> {
        info!("Stopping instance {}", instance.id);
        self.post(&format!("/v1/instances/{}/stop", instance.id), &Value::Null)
            .await?;
        Ok(())
    }

    /// Attach to an already running instance by id
    ///
    /// Useful for reconnecting after a crash and for constructing handles
    /// in tests; the id is not verified against the service.
    pub fn attach(&self, id: impl Into<String>) -> Instance {
        Instance {
            id: id.into(),
            client: self.clone(),
        }
    }

    /// URL of the live view stream for an instance, for watching a run
    pub async fn stream_url(&self, instance: &Instance) -> Result<String> {
        let body = self
            .get(&format!("/v1/instances/{}/stream", instance.id))
            .await?;
        body.get("url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DroverError::Instance("Stream response missing url".to_string()))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let mut request = self.http.post(&url).header("x-api-key", &self.api_key);
        if !body.is_null() {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DroverError::Instance(format!("Request to {} failed: {}", path, e)))?;

        Self::parse_response(path, response).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| DroverError::Instance(format!("Request to {} failed: {}", path, e)))?;

        Self::parse_response(path, response).await
    }

    async fn parse_response(path: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(DroverError::Instance(format!(
                "Instance service error {} on {}: {}",
                status, path, error_text
            )));
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        response
            .json()
            .await
            .map_err(|e| DroverError::Instance(format!("Failed to parse response from {}: {}", path, e)))
    }
}

/// Handle to one live remote computer
///
/// Remote-side state (mouse position, shell cwd, open files) is mutated by
/// every surface call; callers must keep dispatch sequential within a run.
#[derive(Debug, Clone)]
pub struct Instance {
    id: String,
    client: InstanceClient,
}

impl Instance {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pointer/keyboard surface
    pub async fn computer(&self, request: ComputerRequest) -> Result<ToolOutcome> {
        self.surface("computer", &request).await
    }

    /// Persistent shell surface
    pub async fn bash(&self, request: BashRequest) -> Result<ToolOutcome> {
        self.surface("bash", &request).await
    }

    /// File editing surface
    pub async fn edit(&self, request: EditRequest) -> Result<ToolOutcome> {
        self.surface("edit", &request).await
    }

    /// Start the instance's browser, returning its CDP endpoint
    pub async fn browser_start(&self) -> Result<String> {
        let body = self
            .client
            .post(&format!("/v1/instances/{}/browser/start", self.id), &Value::Null)
            .await?;
        body.get("cdp_url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DroverError::Instance("Browser start response missing cdp_url".to_string()))
    }

    async fn surface<R: Serialize>(&self, name: &str, request: &R) -> Result<ToolOutcome> {
        let body = serde_json::to_value(request)?;
        let response = self
            .client
            .post(&format!("/v1/instances/{}/{}", self.id, name), &body)
            .await?;
        Ok(serde_json::from_value(response)?)
    }
}

/// Arguments for the pointer/keyboard surface, forwarded verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputerRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<(u32, u32)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Arguments for the shell surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BashRequest {
    pub command: String,
    /// Recycle the persistent shell context before running
    #[serde(default)]
    pub restart: bool,
}

/// Arguments for the file editing surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    pub command: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_range: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_line: Option<u64>,
}
