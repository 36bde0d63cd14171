//! Managed resource types.

pub(crate) mod clickhouse_cluster;
pub(crate) mod kafka_cluster;
pub(crate) mod network;
pub(crate) mod transfer;
pub(crate) mod transfer_endpoint;
pub(crate) mod workbook;

use crate::resource::Resource;

/// Every resource the provider serves, in registration order.
pub(crate) fn all() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(network::NetworkResource),
        Box::new(workbook::WorkbookResource),
        Box::new(kafka_cluster::KafkaClusterResource),
        Box::new(transfer::TransferResource),
        Box::new(transfer_endpoint::TransferEndpointResource),
        Box::new(clickhouse_cluster::ClickhouseClusterResource),
    ]
}
