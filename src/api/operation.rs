//! Long-running operations.

use serde::Deserialize;
use tracing::{debug, warn};

use super::ApiClient;
use crate::error::ProviderError;

/// Error reported by a failed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OperationError {
    /// Status code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
}

/// A mutating API call in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    /// Operation id.
    pub id: String,
    /// Whether the operation finished.
    pub done: bool,
    /// Set when the operation failed.
    pub error: Option<OperationError>,
    /// Id of the object the operation acts on.
    pub resource_id: String,
}

impl ApiClient {
    /// Poll an operation until it is done, returning the remote error if it failed.
    pub async fn wait(&self, operation: Operation) -> Result<Operation, ProviderError> {
        let mut operation = operation;
        loop {
            if operation.done {
                return match operation.error {
                    Some(err) => {
                        warn!(operation_id = %operation.id, message = %err.message, "Operation failed");
                        Err(ProviderError::Operation {
                            id: operation.id,
                            message: err.message,
                        })
                    }
                    None => Ok(operation),
                };
            }

            debug!(operation_id = %operation.id, "Waiting for operation");
            tokio::time::sleep(self.poll_interval()).await;
            operation = self
                .get(&format!("/operation/v1/operations/{}", operation.id))
                .await?;
        }
    }

    /// Wait for an operation and return the id of the object it acted on.
    pub async fn wait_for_resource(&self, operation: Operation) -> Result<String, ProviderError> {
        let done = self.wait(operation).await?;
        if done.resource_id.is_empty() {
            return Err(ProviderError::Operation {
                id: done.id,
                message: "operation returned no resource id".to_string(),
            });
        }
        Ok(done.resource_id)
    }
}
