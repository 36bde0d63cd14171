//! Plugin protocol server.
//!
//! [`ProviderService`] is what the DoubleCloud provider implements: JSON
//! values in, JSON values and diagnostics out. [`serve`] puts it behind the
//! tonic service from [`crate::generated`], prints the handshake line and runs
//! until the host asks it to exit.
//!
//! Provider failures never surface as gRPC status codes. Every handler answers
//! with a response carrying error diagnostics instead, so the host can show
//! them next to the offending block.
//!
//! # Shutdown
//!
//! SIGTERM or SIGINT stops the listener. Requests already running get
//! [`ServeOptions::shutdown_timeout`] to finish, then [`ProviderService::stop`]
//! is called.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tracing::{debug, error, info, instrument, warn};

use crate::diag::{Diagnostic, DiagnosticSeverity};
use crate::error::ProviderError;
use crate::generated as pb;
use crate::schema::{self, BlockNestingMode, ProviderSchema};
use crate::types::{
    ImportedResource, PlanResult, ProviderMetadata, HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};

/// Operations the host drives through the plugin protocol.
///
/// Values use the JSON shape of the matching schema. Attributes are keys,
/// single blocks are objects and list blocks are arrays of objects.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// Provider, resource and data source schemas.
    fn schema(&self) -> ProviderSchema;

    /// Type names served by this provider, sorted.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let sorted = |names: Vec<&String>| {
            let mut names: Vec<String> = names.into_iter().cloned().collect();
            names.sort();
            names
        };
        ProviderMetadata {
            resources: sorted(schema.resources.keys().collect()),
            data_sources: sorted(schema.data_sources.keys().collect()),
            capabilities: Default::default(),
        }
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Build the API client from the provider block.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// `prior_state` is `None` when the resource is about to be created.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError>;

    /// Refresh a resource. `Value::Null` tells the host the object is gone.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError>;

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Adopt an existing object by its cloud id.
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError>;

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        _config: Value,
    ) -> Result<Value, ProviderError> {
        Err(ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

/// Responses that can carry a failure back as diagnostics.
trait Reply: Default {
    fn with_diagnostics(diagnostics: Vec<pb::Diagnostic>) -> Self;
}

macro_rules! reply {
    ($($response:ident),+ $(,)?) => {
        $(impl Reply for pb::$response {
            fn with_diagnostics(diagnostics: Vec<pb::Diagnostic>) -> Self {
                Self { diagnostics, ..Default::default() }
            }
        })+
    };
}

reply!(
    ValidateProviderConfigResponse,
    ConfigureResponse,
    ValidateResourceConfigResponse,
    PlanResponse,
    CreateResponse,
    ReadResponse,
    UpdateResponse,
    DeleteResponse,
    ImportResourceStateResponse,
    ValidateDataSourceConfigResponse,
    ReadDataSourceResponse,
);

/// Turn a provider result into a response, logging failures under `rpc`.
fn respond<T, R: Reply>(
    rpc: &'static str,
    subject: &str,
    result: Result<T, ProviderError>,
    ok: impl FnOnce(T) -> R,
) -> Result<Response<R>, Status> {
    let reply = match result {
        Ok(value) => ok(value),
        Err(err) => {
            error!(rpc, subject, error = %err, "request failed");
            R::with_diagnostics(error_to_diagnostics(err))
        }
    };
    Ok(Response::new(reply))
}

/// Validation results, where error diagnostics are an answer and not a failure.
fn validated<R: Reply>(
    rpc: &'static str,
    subject: &str,
    result: Result<Vec<Diagnostic>, ProviderError>,
) -> Result<Response<R>, Status> {
    respond(rpc, subject, result, |diagnostics| {
        if diagnostics.iter().any(Diagnostic::is_error) {
            warn!(rpc, subject, diagnostics = diagnostics.len(), "configuration rejected");
        } else {
            debug!(rpc, subject, "configuration accepted");
        }
        R::with_diagnostics(diagnostics_to_proto(diagnostics))
    })
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<pb::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|d| pb::Diagnostic {
            severity: match d.severity {
                DiagnosticSeverity::Error => pb::diagnostic::Severity::Error,
                DiagnosticSeverity::Warning => pb::diagnostic::Severity::Warning,
            } as i32,
            summary: d.summary,
            detail: d.detail.unwrap_or_default(),
            attribute: d.attribute.unwrap_or_default(),
        })
        .collect()
}

fn error_to_diagnostics(err: ProviderError) -> Vec<pb::Diagnostic> {
    diagnostics_to_proto(err.into_diagnostics())
}

/// Missing or undecodable payloads read as null.
fn decode(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}

fn encode(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

fn schema_to_proto(schema: &schema::Schema) -> pb::Schema {
    pb::Schema {
        version: schema.version as i64,
        block: Some(block_to_proto(&schema.block)),
    }
}

fn block_to_proto(block: &schema::Block) -> pb::Block {
    let mut attributes: Vec<pb::Attribute> = block
        .attributes
        .iter()
        .map(|(name, attr)| pb::Attribute {
            name: name.clone(),
            r#type: serde_json::to_vec(&attr.attr_type).unwrap_or_default(),
            required: attr.flags.required,
            optional: attr.flags.optional,
            computed: attr.flags.computed,
            sensitive: attr.flags.sensitive,
            description: attr.description.clone().unwrap_or_default(),
            force_new: attr.force_new,
            default_value: attr.default.as_ref().map(encode).unwrap_or_default(),
        })
        .collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));

    let mut block_types: Vec<pb::NestedBlock> = block
        .blocks
        .iter()
        .map(|(name, nested)| pb::NestedBlock {
            type_name: name.clone(),
            block: Some(block_to_proto(&nested.block)),
            nesting_mode: match nested.nesting_mode {
                BlockNestingMode::Single => pb::nested_block::NestingMode::Single,
                BlockNestingMode::List => pb::nested_block::NestingMode::List,
            } as i32,
            min_items: nested.min_items as i32,
            max_items: nested.max_items as i32,
        })
        .collect();
    block_types.sort_by(|a, b| a.type_name.cmp(&b.type_name));

    pb::Block {
        attributes,
        block_types,
        description: block.description.clone().unwrap_or_default(),
    }
}

/// Adapts a [`ProviderService`] to the generated tonic trait.
struct GrpcProvider<P: ProviderService> {
    provider: Arc<P>,
}

#[tonic::async_trait]
impl<P: ProviderService> pb::provider_server::Provider for GrpcProvider<P> {
    #[instrument(skip_all, name = "grpc.get_metadata")]
    async fn get_metadata(
        &self,
        _request: Request<pb::GetMetadataRequest>,
    ) -> Result<Response<pb::GetMetadataResponse>, Status> {
        let metadata = self.provider.metadata();
        debug!(
            resources = metadata.resources.len(),
            data_sources = metadata.data_sources.len(),
            "serving metadata"
        );
        Ok(Response::new(pb::GetMetadataResponse {
            server_capabilities: Some(pb::ServerCapabilities {
                plan_destroy: metadata.capabilities.plan_destroy,
            }),
            resources: metadata.resources,
            data_sources: metadata.data_sources,
            diagnostics: vec![],
        }))
    }

    #[instrument(skip_all, name = "grpc.get_schema")]
    async fn get_schema(
        &self,
        _request: Request<pb::GetSchemaRequest>,
    ) -> Result<Response<pb::GetSchemaResponse>, Status> {
        let schema = self.provider.schema();
        let convert = |schemas: &HashMap<String, schema::Schema>| -> HashMap<String, pb::Schema> {
            schemas
                .iter()
                .map(|(name, s)| (name.clone(), schema_to_proto(s)))
                .collect()
        };
        Ok(Response::new(pb::GetSchemaResponse {
            provider: Some(schema_to_proto(&schema.provider)),
            resources: convert(&schema.resources),
            data_sources: convert(&schema.data_sources),
            diagnostics: vec![],
        }))
    }

    #[instrument(skip_all, name = "grpc.validate_provider_config")]
    async fn validate_provider_config(
        &self,
        request: Request<pb::ValidateProviderConfigRequest>,
    ) -> Result<Response<pb::ValidateProviderConfigResponse>, Status> {
        let config = decode(&request.into_inner().config);
        let result = self.provider.validate_provider_config(config).await;
        validated("ValidateProviderConfig", "provider", result)
    }

    #[instrument(skip_all, name = "grpc.configure")]
    async fn configure(
        &self,
        request: Request<pb::ConfigureRequest>,
    ) -> Result<Response<pb::ConfigureResponse>, Status> {
        let config = decode(&request.into_inner().config);
        let result = self.provider.configure(config).await;
        if result.is_ok() {
            info!("provider configured");
        }
        validated("Configure", "provider", result)
    }

    #[instrument(skip_all, name = "grpc.stop")]
    async fn stop(
        &self,
        _request: Request<pb::StopRequest>,
    ) -> Result<Response<pb::StopResponse>, Status> {
        info!("stop requested by host");
        let error = match self.provider.stop().await {
            Ok(()) => String::new(),
            Err(err) => {
                error!(error = %err, "provider stop failed");
                err.to_string()
            }
        };
        Ok(Response::new(pb::StopResponse { error }))
    }

    #[instrument(skip_all, name = "grpc.validate_resource_config", fields(resource_type))]
    async fn validate_resource_config(
        &self,
        request: Request<pb::ValidateResourceConfigRequest>,
    ) -> Result<Response<pb::ValidateResourceConfigResponse>, Status> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result = self
            .provider
            .validate_resource_config(&req.resource_type, decode(&req.config))
            .await;
        validated("ValidateResourceConfig", &req.resource_type, result)
    }

    #[instrument(skip_all, name = "grpc.plan", fields(resource_type))]
    async fn plan(
        &self,
        request: Request<pb::PlanRequest>,
    ) -> Result<Response<pb::PlanResponse>, Status> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let prior_state = Some(decode(&req.prior_state)).filter(|v| !v.is_null());
        let result = self
            .provider
            .plan(
                &req.resource_type,
                prior_state,
                decode(&req.proposed_state),
                decode(&req.config),
            )
            .await;
        respond("Plan", &req.resource_type, result, |plan| {
            debug!(
                changes = plan.changes.len(),
                requires_replace = plan.requires_replace,
                "planned"
            );
            pb::PlanResponse {
                planned_state: encode(&plan.planned_state),
                changes: plan.changes.into_iter().map(Into::into).collect(),
                requires_replace: plan.requires_replace,
                diagnostics: vec![],
            }
        })
    }

    #[instrument(skip_all, name = "grpc.create", fields(resource_type))]
    async fn create(
        &self,
        request: Request<pb::CreateRequest>,
    ) -> Result<Response<pb::CreateResponse>, Status> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result = self
            .provider
            .create(&req.resource_type, decode(&req.planned_state))
            .await;
        respond("Create", &req.resource_type, result, |state| {
            info!(id = %state["id"], "created");
            pb::CreateResponse {
                state: encode(&state),
                diagnostics: vec![],
            }
        })
    }

    #[instrument(skip_all, name = "grpc.read", fields(resource_type))]
    async fn read(
        &self,
        request: Request<pb::ReadRequest>,
    ) -> Result<Response<pb::ReadResponse>, Status> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result = self
            .provider
            .read(&req.resource_type, decode(&req.current_state))
            .await;
        respond("Read", &req.resource_type, result, |state| {
            if state.is_null() {
                info!("resource no longer exists");
            }
            pb::ReadResponse {
                state: encode(&state),
                diagnostics: vec![],
            }
        })
    }

    #[instrument(skip_all, name = "grpc.update", fields(resource_type))]
    async fn update(
        &self,
        request: Request<pb::UpdateRequest>,
    ) -> Result<Response<pb::UpdateResponse>, Status> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result = self
            .provider
            .update(
                &req.resource_type,
                decode(&req.prior_state),
                decode(&req.planned_state),
            )
            .await;
        respond("Update", &req.resource_type, result, |state| {
            info!(id = %state["id"], "updated");
            pb::UpdateResponse {
                state: encode(&state),
                diagnostics: vec![],
            }
        })
    }

    #[instrument(skip_all, name = "grpc.delete", fields(resource_type))]
    async fn delete(
        &self,
        request: Request<pb::DeleteRequest>,
    ) -> Result<Response<pb::DeleteResponse>, Status> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let state = decode(&req.current_state);
        let id = state["id"].clone();
        let result = self.provider.delete(&req.resource_type, state).await;
        respond("Delete", &req.resource_type, result, |()| {
            info!(%id, "deleted");
            pb::DeleteResponse::default()
        })
    }

    #[instrument(skip_all, name = "grpc.import_resource_state", fields(resource_type, id))]
    async fn import_resource_state(
        &self,
        request: Request<pb::ImportResourceStateRequest>,
    ) -> Result<Response<pb::ImportResourceStateResponse>, Status> {
        let req = request.into_inner();
        let span = tracing::Span::current();
        span.record("resource_type", req.resource_type.as_str());
        span.record("id", req.id.as_str());
        let result = self
            .provider
            .import_resource(&req.resource_type, &req.id)
            .await;
        respond("ImportResourceState", &req.resource_type, result, |imported| {
            info!(count = imported.len(), "imported");
            pb::ImportResourceStateResponse {
                imported: imported
                    .into_iter()
                    .map(|r| pb::ImportedResource {
                        state: encode(&r.state),
                        resource_type: r.resource_type,
                    })
                    .collect(),
                diagnostics: vec![],
            }
        })
    }

    #[instrument(skip_all, name = "grpc.validate_data_source_config", fields(data_source_type))]
    async fn validate_data_source_config(
        &self,
        request: Request<pb::ValidateDataSourceConfigRequest>,
    ) -> Result<Response<pb::ValidateDataSourceConfigResponse>, Status> {
        let req = request.into_inner();
        tracing::Span::current().record("data_source_type", req.data_source_type.as_str());
        let result = self
            .provider
            .validate_data_source_config(&req.data_source_type, decode(&req.config))
            .await;
        validated("ValidateDataSourceConfig", &req.data_source_type, result)
    }

    #[instrument(skip_all, name = "grpc.read_data_source", fields(data_source_type))]
    async fn read_data_source(
        &self,
        request: Request<pb::ReadDataSourceRequest>,
    ) -> Result<Response<pb::ReadDataSourceResponse>, Status> {
        let req = request.into_inner();
        tracing::Span::current().record("data_source_type", req.data_source_type.as_str());
        let result = self
            .provider
            .read_data_source(&req.data_source_type, decode(&req.config))
            .await;
        respond("ReadDataSource", &req.data_source_type, result, |state| {
            pb::ReadDataSourceResponse {
                state: encode(&state),
                diagnostics: vec![],
            }
        })
    }
}

/// Server tuning.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// How long in-flight requests may run after a shutdown signal.
    /// Defaults to 30 seconds.
    pub shutdown_timeout: Duration,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// The line the host reads from stdout to find the plugin.
fn handshake(addr: SocketAddr) -> String {
    format!("{}|{}|{}", HANDSHAKE_PREFIX, PROTOCOL_VERSION, addr)
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    let name = tokio::select! {
        _ = term.recv() => "SIGTERM",
        _ = int.recv() => "SIGINT",
    };
    info!(signal = name, "shutting down");
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!(signal = "CTRL+C", "shutting down");
    Ok(())
}

/// Serve on a free loopback port with default options.
///
/// Prints `DOUBLECLOUD_PROVIDER|<protocol>|<address>` once the port is bound.
pub async fn serve<P: ProviderService>(provider: P) -> Result<(), Box<dyn std::error::Error>> {
    serve_with_options(provider, ServeOptions::default()).await
}

pub async fn serve_with_options<P: ProviderService>(
    provider: P,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    run(provider, listener, options).await
}

/// Serve on a fixed address.
pub async fn serve_on<P: ProviderService>(
    provider: P,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    serve_on_with_options(provider, addr, ServeOptions::default()).await
}

pub async fn serve_on_with_options<P: ProviderService>(
    provider: P,
    addr: SocketAddr,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    run(provider, listener, options).await
}

async fn run<P: ProviderService>(
    provider: P,
    listener: TcpListener,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = listener.local_addr()?;
    println!("{}", handshake(addr));
    info!(address = %addr, "provider listening");

    let provider = Arc::new(provider);
    let service = pb::provider_server::ProviderServer::new(GrpcProvider {
        provider: Arc::clone(&provider),
    });

    let stopping = Arc::new(Notify::new());
    let notified = Arc::clone(&stopping);
    let server = Server::builder().add_service(service).serve_with_incoming_shutdown(
        tokio_stream::wrappers::TcpListenerStream::new(listener),
        async move { notified.notified().await },
    );
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        signal = shutdown_signal() => {
            signal?;
            stopping.notify_one();
            match tokio::time::timeout(options.shutdown_timeout, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    timeout = ?options.shutdown_timeout,
                    "requests still running after shutdown timeout, exiting anyway"
                ),
            }
        }
    }

    if let Err(err) = provider.stop().await {
        warn!(error = %err, "provider stop failed");
    }
    info!("provider stopped");
    Ok(())
}
