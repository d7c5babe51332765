//! Long-running operation polling
//!
//! Corpus creation and file import return a `google.longrunning.Operation`;
//! the call is complete once the operation reports `done`.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;

use super::api::VertexApi;
use crate::error::{Error, Result};

/// A long-running operation resource
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationStatus>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Error status of a failed operation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl Operation {
    /// Result of a finished operation
    fn into_result(self, label: &str) -> Result<serde_json::Value> {
        if let Some(status) = self.error {
            return Err(Error::operation(format!(
                "{} failed (code {}): {}",
                label, status.code, status.message
            )));
        }
        Ok(self.response.unwrap_or(serde_json::Value::Null))
    }
}

/// Waits for long-running operations by polling them
pub struct OperationPoller<'a> {
    api: &'a VertexApi,
    interval: Duration,
    timeout: Duration,
}

impl<'a> OperationPoller<'a> {
    pub fn new(api: &'a VertexApi, interval: Duration, timeout: Duration) -> Self {
        Self {
            api,
            interval,
            timeout,
        }
    }

    /// Poll until the operation is done and return its `response` payload
    pub async fn wait(&self, operation: Operation, label: &str) -> Result<serde_json::Value> {
        if operation.done {
            return operation.into_result(label);
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Waiting for {}", label));
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = self.poll(operation, label).await;
        spinner.finish_and_clear();
        result
    }

    async fn poll(&self, mut operation: Operation, label: &str) -> Result<serde_json::Value> {
        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            if operation.done {
                tracing::debug!(operation = %operation.name, polls, "Operation finished");
                return operation.into_result(label);
            }
            if operation.name.is_empty() {
                return Err(Error::operation(format!(
                    "{} returned an unfinished operation without a name",
                    label
                )));
            }
            if started.elapsed() >= self.timeout {
                return Err(Error::operation(format!(
                    "{} did not finish within {:?} (operation {})",
                    label, self.timeout, operation.name
                )));
            }

            tokio::time::sleep(self.interval).await;
            polls += 1;
            operation = self.api.get(&operation.name).await?;
        }
    }
}
