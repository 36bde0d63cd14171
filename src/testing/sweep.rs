//! Sweepers for objects leaked by acceptance runs.
//!
//! Each sweeper lists one kind of object in a project and deletes those whose
//! name starts with [`TEST_PREFIX`]. A failure on one object does not stop
//! the sweep; all failures are collected into a [`SweepError`].

use tracing::{info, warn};

use super::acc::TEST_PREFIX;
use crate::api::{ApiClient, AuthorizedKey, ClientOptions};
use crate::error::ProviderError;

/// Environment variable naming the project to sweep.
pub const PROJECT_ENV: &str = "DC_PROJECT_ID";

/// One kind of sweepable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweeper {
    /// `doublecloud_transfer`
    Transfer,
    /// `doublecloud_transfer_endpoint`
    Endpoint,
    /// `doublecloud_clickhouse_cluster`
    Clickhouse,
    /// `doublecloud_kafka_cluster`
    Kafka,
    /// `doublecloud_workbook`
    Workbook,
    /// `doublecloud_network`
    Network,
}

impl Sweeper {
    /// Every sweeper, dependents before their dependencies.
    pub const ALL: [Sweeper; 6] = [
        Sweeper::Transfer,
        Sweeper::Endpoint,
        Sweeper::Clickhouse,
        Sweeper::Kafka,
        Sweeper::Workbook,
        Sweeper::Network,
    ];

    /// Object kind, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Sweeper::Transfer => "transfer",
            Sweeper::Endpoint => "transfer endpoint",
            Sweeper::Clickhouse => "clickhouse cluster",
            Sweeper::Kafka => "kafka cluster",
            Sweeper::Workbook => "workbook",
            Sweeper::Network => "network",
        }
    }

    /// Ids of the test objects in `project_id`.
    async fn candidates(
        &self,
        client: &ApiClient,
        project_id: &str,
    ) -> Result<Vec<String>, ProviderError> {
        fn pick<T>(
            items: Vec<T>,
            name: impl Fn(&T) -> &str,
            id: impl Fn(T) -> String,
        ) -> Vec<String> {
            items
                .into_iter()
                .filter(|item| name(item).starts_with(TEST_PREFIX))
                .map(id)
                .collect()
        }

        Ok(match self {
            Sweeper::Transfer => pick(
                client.transfers().list(project_id).await?,
                |t| t.name.as_str(),
                |t| t.id,
            ),
            Sweeper::Endpoint => pick(
                client.endpoints().list(project_id).await?,
                |e| e.name.as_str(),
                |e| e.id,
            ),
            Sweeper::Clickhouse => pick(
                client.clickhouse().list(project_id).await?,
                |c| c.name.as_str(),
                |c| c.id,
            ),
            Sweeper::Kafka => pick(
                client.kafka().list(project_id).await?,
                |c| c.name.as_str(),
                |c| c.id,
            ),
            Sweeper::Workbook => pick(
                client.workbooks().list(project_id).await?,
                |w| w.title.as_str(),
                |w| w.id,
            ),
            Sweeper::Network => pick(
                client.networks().list(project_id).await?,
                |n| n.name.as_str(),
                |n| n.id,
            ),
        })
    }

    async fn delete(&self, client: &ApiClient, id: &str) -> Result<(), ProviderError> {
        let op = match self {
            Sweeper::Transfer => {
                // active transfers cannot be deleted
                if client.transfers().get(id).await?.is_active() {
                    let op = client.transfers().deactivate(id).await?;
                    client.wait(op).await?;
                }
                client.transfers().delete(id).await?
            }
            Sweeper::Endpoint => client.endpoints().delete(id).await?,
            Sweeper::Clickhouse => client.clickhouse().delete(id).await?,
            Sweeper::Kafka => client.kafka().delete(id).await?,
            Sweeper::Workbook => client.workbooks().delete(id).await?,
            Sweeper::Network => client.networks().delete(id).await?,
        };
        client.wait(op).await?;
        Ok(())
    }
}

/// An object that could not be swept.
#[derive(Debug, thiserror::Error)]
#[error("failed to sweep {kind} {id}: {error}")]
pub struct SweepFailure {
    /// Object kind.
    pub kind: &'static str,
    /// Object id, or the project id when listing failed.
    pub id: String,
    /// What went wrong.
    #[source]
    pub error: ProviderError,
}

/// Every failure of a sweep.
#[derive(Debug, thiserror::Error)]
#[error("{}", render_failures(.failures))]
pub struct SweepError {
    /// Individual failures, in sweep order.
    pub failures: Vec<SweepFailure>,
}

fn render_failures(failures: &[SweepFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run `sweepers` in order over `project_id`, returning the deleted ids.
pub async fn sweep(
    client: &ApiClient,
    project_id: &str,
    sweepers: &[Sweeper],
) -> Result<Vec<String>, SweepError> {
    let mut deleted = Vec::new();
    let mut failures = Vec::new();

    for sweeper in sweepers {
        let ids = match sweeper.candidates(client, project_id).await {
            Ok(ids) => ids,
            Err(error) => {
                warn!(kind = sweeper.kind(), error = %error, "Listing failed");
                failures.push(SweepFailure {
                    kind: sweeper.kind(),
                    id: project_id.to_string(),
                    error,
                });
                continue;
            }
        };

        for id in ids {
            match sweeper.delete(client, &id).await {
                Ok(()) => {
                    info!(kind = sweeper.kind(), id = %id, "Swept");
                    deleted.push(id);
                }
                Err(error) if error.is_not_found() => {}
                Err(error) => {
                    warn!(kind = sweeper.kind(), id = %id, error = %error, "Sweep failed");
                    failures.push(SweepFailure {
                        kind: sweeper.kind(),
                        id,
                        error,
                    });
                }
            }
        }
    }

    if failures.is_empty() {
        Ok(deleted)
    } else {
        Err(SweepError { failures })
    }
}

/// Client and project for sweeping, from `DC_AUTHKEY` and `DC_PROJECT_ID`.
pub fn client_from_env() -> Result<(ApiClient, String), ProviderError> {
    let path = std::env::var(crate::provider::AUTHKEY_ENV)
        .map_err(|_| ProviderError::Configuration("DC_AUTHKEY is not set".to_string()))?;
    let project_id = std::env::var(PROJECT_ENV)
        .map_err(|_| ProviderError::Configuration("DC_PROJECT_ID is not set".to_string()))?;
    let client = ApiClient::new(AuthorizedKey::from_json_file(path)?, ClientOptions::default())?;
    Ok((client, project_id))
}
