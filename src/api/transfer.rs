//! `/transfer/v1/transfers` service.

use serde::{Deserialize, Serialize};

use super::{ApiClient, Empty, Operation};
use crate::error::ProviderError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transfer {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub source_id: String,
    pub target_id: String,
    /// `SNAPSHOT_ONLY`, `INCREMENT_ONLY` or `SNAPSHOT_AND_INCREMENT`.
    #[serde(rename = "type")]
    pub transfer_type: String,
    /// `CREATED`, `RUNNING`, `STOPPED`, ...
    pub status: String,
}

impl Transfer {
    /// Whether the transfer is running or on its way there.
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_str(), "RUNNING" | "STARTING" | "DONE")
    }

    /// Whether the transfer has not yet caught up with an activation change.
    pub fn is_settling(&self) -> bool {
        matches!(self.status.as_str(), "CREATED" | "STARTING" | "STOPPING")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub transfer_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransferRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Handle for the transfer service.
pub struct TransferService<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// Transfer service.
    pub fn transfers(&self) -> TransferService<'_> {
        TransferService { client: self }
    }
}

impl TransferService<'_> {
    pub async fn get(&self, id: &str) -> Result<Transfer, ProviderError> {
        self.client
            .get(&format!("/transfer/v1/transfers/{}", id))
            .await
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Transfer>, ProviderError> {
        self.client
            .list_all("/transfer/v1/transfers", project_id, "transfers")
            .await
    }

    pub async fn create(&self, request: &CreateTransferRequest) -> Result<Operation, ProviderError> {
        self.client.post("/transfer/v1/transfers", request).await
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateTransferRequest,
    ) -> Result<Operation, ProviderError> {
        self.client
            .patch(&format!("/transfer/v1/transfers/{}", id), request)
            .await
    }

    pub async fn activate(&self, id: &str) -> Result<Operation, ProviderError> {
        self.client
            .post(&format!("/transfer/v1/transfers/{}:activate", id), &Empty {})
            .await
    }

    pub async fn deactivate(&self, id: &str) -> Result<Operation, ProviderError> {
        self.client
            .post(&format!("/transfer/v1/transfers/{}:deactivate", id), &Empty {})
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Operation, ProviderError> {
        self.client
            .delete(&format!("/transfer/v1/transfers/{}", id))
            .await
    }
}
