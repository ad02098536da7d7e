//! HTTP client for the application's remote command API.
//!
//! Workflow tests trigger server-side transform jobs and poll their
//! status over the same JSON API the application's own clients use.
//! Commands are small serializable descriptions; [`Connection`] owns
//! the base URL, the Basic credentials, and the `reqwest` client.

use crate::result::{BancadaError, BancadaResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, info};

/// HTTP method of a remote command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET, payload ignored
    Get,
    /// POST with a JSON body
    Post,
}

/// A serializable command against the remote API
pub trait RemoteCommand {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Path relative to the connection's base URL
    fn endpoint(&self) -> String;

    /// HTTP method
    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    /// JSON request body
    fn payload(&self) -> BancadaResult<Value>;
}

/// Status and decoded JSON body of an executed command
#[derive(Debug, Clone)]
pub struct CommandResponse {
    /// HTTP status code
    pub status: u16,
    /// Decoded response body ([`Value::Null`] when the body is not JSON)
    pub body: Value,
}

impl CommandResponse {
    /// Whether the status is in the 2xx range
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// A top-level field of the response body
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// A top-level string field of the response body
    #[must_use]
    pub fn string_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}

/// Render an HTTP Basic `Authorization` header value
#[must_use]
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let credentials = STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {credentials}")
}

/// Authenticated connection to the remote command API
pub struct Connection {
    base_url: String,
    auth_header: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Create a connection with Basic credentials
    pub fn new(
        base_url: impl Into<String>,
        username: &str,
        password: &str,
    ) -> BancadaResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| BancadaError::Driver {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        let base_url = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: basic_auth_header(username, password),
            client,
        })
    }

    /// Full URL for a command endpoint
    #[must_use]
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Execute a command and decode the response.
    ///
    /// Non-2xx responses become [`BancadaError::Http`] carrying the
    /// command name, status, and the body's `exception` field when the
    /// server provides one.
    pub async fn execute(&self, command: &impl RemoteCommand) -> BancadaResult<CommandResponse> {
        let url = self.url_for(&command.endpoint());
        info!(command = command.name(), %url, "executing remote command");

        let request = match command.method() {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url).json(&command.payload()?),
        };
        let response = request
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .send()
            .await
            .map_err(|e| BancadaError::Http {
                command: command.name().to_string(),
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        debug!(command = command.name(), status, "remote command response");

        let decoded = CommandResponse { status, body };
        if decoded.is_success() {
            Ok(decoded)
        } else {
            let message = decoded
                .string_field("exception")
                .unwrap_or("request failed")
                .to_string();
            Err(BancadaError::Http {
                command: command.name().to_string(),
                status,
                message,
            })
        }
    }
}

/// Trigger a named transform job
#[derive(Debug, Clone)]
pub struct RunTransformCommand {
    /// Transform descriptor name
    pub name: String,
    /// Job parameters passed through to the server
    pub params: Value,
}

impl RunTransformCommand {
    /// Command for a transform with no parameters
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Value::Null,
        }
    }

    /// Attach job parameters
    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

impl RemoteCommand for RunTransformCommand {
    fn name(&self) -> &str {
        "runTransform"
    }

    fn endpoint(&self) -> String {
        "etl-run.api".to_string()
    }

    fn payload(&self) -> BancadaResult<Value> {
        Ok(serde_json::json!({
            "transformId": self.name,
            "parameters": self.params,
        }))
    }
}

/// Query the status of a previously triggered transform job
#[derive(Debug, Clone)]
pub struct TransformStatusCommand {
    /// Job id returned by [`RunTransformCommand`]
    pub job_id: String,
}

impl TransformStatusCommand {
    /// Status query for a job
    #[must_use]
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
        }
    }
}

impl RemoteCommand for TransformStatusCommand {
    fn name(&self) -> &str {
        "transformStatus"
    }

    fn endpoint(&self) -> String {
        "etl-status.api".to_string()
    }

    fn payload(&self) -> BancadaResult<Value> {
        Ok(serde_json::json!({ "jobId": self.job_id }))
    }
}
