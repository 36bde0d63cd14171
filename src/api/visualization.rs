//! `/visualization/v1/workbooks` service.
//!
//! Workbook and connection configs are opaque JSON documents. Connection
//! names are user-chosen and escaped as a single path segment.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiClient, Operation};
use crate::error::ProviderError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Workbook {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub config: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookConnection {
    pub name: String,
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkbookRequest {
    pub project_id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct GetWorkbookResponse {
    workbook: Workbook,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListConnectionsResponse {
    connections: Vec<WorkbookConnection>,
}

#[derive(Serialize)]
struct TitleBody<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct ConfigBody<'a> {
    config: &'a Value,
}

/// Handle for the visualization workbook service.
pub struct VisualizationService<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// Visualization workbook service.
    pub fn workbooks(&self) -> VisualizationService<'_> {
        VisualizationService { client: self }
    }
}

fn connection_path(id: &str, name: &str) -> String {
    format!(
        "/visualization/v1/workbooks/{}/connections/{}",
        id,
        urlencoding::encode(name)
    )
}

impl VisualizationService<'_> {
    pub async fn get(&self, id: &str) -> Result<Workbook, ProviderError> {
        let response: GetWorkbookResponse = self
            .client
            .get(&format!("/visualization/v1/workbooks/{}", id))
            .await?;
        Ok(response.workbook)
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Workbook>, ProviderError> {
        self.client
            .list_all("/visualization/v1/workbooks", project_id, "workbooks")
            .await
    }

    pub async fn create(&self, request: &CreateWorkbookRequest) -> Result<Operation, ProviderError> {
        self.client.post("/visualization/v1/workbooks", request).await
    }

    pub async fn rename(&self, id: &str, title: &str) -> Result<Operation, ProviderError> {
        self.client
            .patch(
                &format!("/visualization/v1/workbooks/{}", id),
                &TitleBody { title },
            )
            .await
    }

    pub async fn put_config(&self, id: &str, config: &Value) -> Result<Operation, ProviderError> {
        self.client
            .put(
                &format!("/visualization/v1/workbooks/{}/config", id),
                &ConfigBody { config },
            )
            .await
    }

    pub async fn connections(&self, id: &str) -> Result<Vec<WorkbookConnection>, ProviderError> {
        let response: Option<ListConnectionsResponse> = self
            .client
            .get(&format!("/visualization/v1/workbooks/{}/connections", id))
            .await?;
        Ok(response.unwrap_or_default().connections)
    }

    /// Create or replace a named connection.
    pub async fn put_connection(
        &self,
        id: &str,
        name: &str,
        config: &Value,
    ) -> Result<Operation, ProviderError> {
        self.client
            .put(&connection_path(id, name), &ConfigBody { config })
            .await
    }

    pub async fn delete_connection(&self, id: &str, name: &str) -> Result<Operation, ProviderError> {
        self.client.delete(&connection_path(id, name)).await
    }

    pub async fn delete(&self, id: &str) -> Result<Operation, ProviderError> {
        self.client
            .delete(&format!("/visualization/v1/workbooks/{}", id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_name_is_one_segment() {
        assert_eq!(
            connection_path("wb1", "clickhouse"),
            "/visualization/v1/workbooks/wb1/connections/clickhouse"
        );
        assert_eq!(
            connection_path("wb1", "sales/eu"),
            "/visualization/v1/workbooks/wb1/connections/sales%2Feu"
        );
        assert_eq!(
            connection_path("wb1", "q?x=1"),
            "/visualization/v1/workbooks/wb1/connections/q%3Fx%3D1"
        );
    }
}
