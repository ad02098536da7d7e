//! ETL job workflow: trigger server-side transforms and poll status.
//!
//! Runs entirely over the remote command API; no browser involved.

use bancada::remote::{
    CommandResponse, Connection, RunTransformCommand, TransformStatusCommand,
};
use bancada::{poll_until, BancadaError, BancadaResult, WaitOptions};
use tracing::info;

/// Server-side state of a transform job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformStatus {
    /// Queued, not yet started
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Complete,
    /// Failed with a server-reported message
    Error(String),
}

impl TransformStatus {
    /// Decode a status response body.
    ///
    /// The server reports `{"status": "...", "error": "..."}`; unknown
    /// status strings are a [`BancadaError::Driver`] so protocol drift
    /// fails loudly.
    pub fn from_response(response: &CommandResponse) -> BancadaResult<Self> {
        let status = response
            .string_field("status")
            .ok_or_else(|| BancadaError::Driver {
                message: "status response has no 'status' field".to_string(),
            })?;
        match status {
            "PENDING" => Ok(Self::Pending),
            "RUNNING" => Ok(Self::Running),
            "COMPLETE" => Ok(Self::Complete),
            "ERROR" => Ok(Self::Error(
                response
                    .string_field("error")
                    .unwrap_or("unreported failure")
                    .to_string(),
            )),
            other => Err(BancadaError::Driver {
                message: format!("unknown transform status '{other}'"),
            }),
        }
    }

    /// Whether the job has stopped, successfully or not
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error(_))
    }
}

/// Extract the job id from a run-transform response
pub fn job_id_of(response: &CommandResponse) -> BancadaResult<String> {
    response
        .string_field("jobId")
        .map(ToString::to_string)
        .ok_or_else(|| BancadaError::Driver {
            message: "run response has no 'jobId' field".to_string(),
        })
}

/// Workflow wrapper for triggering and tracking ETL transforms
pub struct EtlJobPage {
    connection: Connection,
}

impl std::fmt::Debug for EtlJobPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtlJobPage").finish_non_exhaustive()
    }
}

impl EtlJobPage {
    /// Bind to an authenticated API connection
    #[must_use]
    pub const fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Trigger a transform and return its job id
    pub async fn run_transform(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> BancadaResult<String> {
        info!(transform = name, "triggering transform");
        let command = RunTransformCommand::new(name).with_params(params);
        let response = self.connection.execute(&command).await?;
        job_id_of(&response)
    }

    /// Current status of a job
    pub async fn status(&self, job_id: &str) -> BancadaResult<TransformStatus> {
        let response = self
            .connection
            .execute(&TransformStatusCommand::new(job_id))
            .await?;
        TransformStatus::from_response(&response)
    }

    /// Poll until the job completes.
    ///
    /// A job that ends in `ERROR` fails immediately with the server's
    /// message; a job that never terminates exhausts the wait budget.
    pub async fn wait_until_complete(
        &self,
        job_id: &str,
        options: WaitOptions,
    ) -> BancadaResult<()> {
        let condition = format!("transform job '{job_id}' to complete");
        poll_until(&condition, options, move || async move {
            match self.status(job_id).await? {
                TransformStatus::Complete => Ok(true),
                TransformStatus::Error(message) => Err(BancadaError::Driver {
                    message: format!("transform job '{job_id}' failed: {message}"),
                }),
                TransformStatus::Pending | TransformStatus::Running => Ok(false),
            }
        })
        .await?;
        Ok(())
    }
}
