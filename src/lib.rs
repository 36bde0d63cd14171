//! DoubleCloud infrastructure provider.
//!
//! The crate implements a Terraform-style provider plugin for DoubleCloud:
//! managed ClickHouse and Kafka clusters, data transfers and their endpoints,
//! networks and visualization workbooks.
//!
//! # Overview
//!
//! - **Plugin protocol**: [`server`] serves a [`ProviderService`] over gRPC and
//!   prints the handshake the host waits for
//! - **Provider**: [`DoubleCloudProvider`] configures an [`api::ApiClient`] and
//!   routes each call to a resource or data source by type name
//! - **Schemas and planning**: [`schema`], [`validation`] and [`plan`] describe
//!   attributes, check configurations and compute planned changes
//! - **Resources**: one module per managed object type, each mapping between
//!   its state model and the REST API
//! - **Testing**: [`testing`] drives the provider without gRPC, runs HCL
//!   acceptance steps and sweeps leftovers
//!
//! # Handshake Protocol
//!
//! When the plugin starts via [`serve`], it prints one line to stdout:
//!
//! ```text
//! DOUBLECLOUD_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `DOUBLECLOUD_PROVIDER|<protocol_version>|<address>`. Logs go to
//! stderr so stdout carries nothing else.
//!
//! # Credentials
//!
//! `Configure` takes a service account authorized key from the
//! `authorized_key` attribute, or from the JSON file named by `DC_AUTHKEY`.

#![warn(clippy::all)]

pub mod api;
pub mod convert;
pub mod diag;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod server;
pub mod testing;
pub mod types;
pub mod validation;

pub(crate) mod data_sources;
pub(crate) mod resources;

#[allow(clippy::all)]
pub mod generated;

pub use diag::{Diagnostic, DiagnosticSeverity, Diagnostics};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::DoubleCloudProvider;
pub use schema::ProviderSchema;
pub use server::{
    serve, serve_on, serve_on_with_options, serve_with_options, ProviderService, ServeOptions,
};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
    HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};
pub use validation::{coerce, validate};
