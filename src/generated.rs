// Bindings for `proto/provider.proto`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Diagnostic {
    #[prost(enumeration = "diagnostic::Severity", tag = "1")]
    pub severity: i32,
    #[prost(string, tag = "2")]
    pub summary: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub detail: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub attribute: ::prost::alloc::string::String,
}
/// Nested message and enum types in `Diagnostic`.
pub mod diagnostic {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Severity {
        Invalid = 0,
        Error = 1,
        Warning = 2,
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Attribute {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub r#type: ::prost::alloc::vec::Vec<u8>,
    #[prost(bool, tag = "3")]
    pub required: bool,
    #[prost(bool, tag = "4")]
    pub optional: bool,
    #[prost(bool, tag = "5")]
    pub computed: bool,
    #[prost(bool, tag = "6")]
    pub sensitive: bool,
    #[prost(string, tag = "7")]
    pub description: ::prost::alloc::string::String,
    #[prost(bool, tag = "8")]
    pub force_new: bool,
    #[prost(bytes = "vec", tag = "9")]
    pub default_value: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NestedBlock {
    #[prost(string, tag = "1")]
    pub type_name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub block: ::core::option::Option<Block>,
    #[prost(enumeration = "nested_block::NestingMode", tag = "3")]
    pub nesting_mode: i32,
    #[prost(int32, tag = "4")]
    pub min_items: i32,
    #[prost(int32, tag = "5")]
    pub max_items: i32,
}
/// Nested message and enum types in `NestedBlock`.
pub mod nested_block {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum NestingMode {
        Invalid = 0,
        Single = 1,
        List = 2,
        Set = 3,
        Map = 4,
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Block {
    #[prost(message, repeated, tag = "1")]
    pub attributes: ::prost::alloc::vec::Vec<Attribute>,
    #[prost(message, repeated, tag = "2")]
    pub block_types: ::prost::alloc::vec::Vec<NestedBlock>,
    #[prost(string, tag = "3")]
    pub description: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Schema {
    #[prost(int64, tag = "1")]
    pub version: i64,
    #[prost(message, optional, tag = "2")]
    pub block: ::core::option::Option<Block>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ServerCapabilities {
    #[prost(bool, tag = "1")]
    pub plan_destroy: bool,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetMetadataRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetMetadataResponse {
    #[prost(message, optional, tag = "1")]
    pub server_capabilities: ::core::option::Option<ServerCapabilities>,
    #[prost(string, repeated, tag = "2")]
    pub resources: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "3")]
    pub data_sources: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(message, repeated, tag = "4")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetSchemaRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetSchemaResponse {
    #[prost(message, optional, tag = "1")]
    pub provider: ::core::option::Option<Schema>,
    #[prost(map = "string, message", tag = "2")]
    pub resources: ::std::collections::HashMap<::prost::alloc::string::String, Schema>,
    #[prost(map = "string, message", tag = "3")]
    pub data_sources: ::std::collections::HashMap<::prost::alloc::string::String, Schema>,
    #[prost(message, repeated, tag = "4")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateProviderConfigRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub config: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateProviderConfigResponse {
    #[prost(message, repeated, tag = "1")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigureRequest {
    #[prost(string, tag = "1")]
    pub host_version: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub config: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigureResponse {
    #[prost(message, repeated, tag = "1")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct StopRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopResponse {
    #[prost(string, tag = "1")]
    pub error: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateResourceConfigRequest {
    #[prost(string, tag = "1")]
    pub resource_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub config: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateResourceConfigResponse {
    #[prost(message, repeated, tag = "1")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttributeChange {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub before: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub after: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlanRequest {
    #[prost(string, tag = "1")]
    pub resource_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub prior_state: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub proposed_state: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub config: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlanResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub planned_state: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub changes: ::prost::alloc::vec::Vec<AttributeChange>,
    #[prost(bool, tag = "3")]
    pub requires_replace: bool,
    #[prost(message, repeated, tag = "4")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateRequest {
    #[prost(string, tag = "1")]
    pub resource_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub planned_state: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub state: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRequest {
    #[prost(string, tag = "1")]
    pub resource_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub current_state: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub state: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateRequest {
    #[prost(string, tag = "1")]
    pub resource_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub prior_state: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub planned_state: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub state: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteRequest {
    #[prost(string, tag = "1")]
    pub resource_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub current_state: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteResponse {
    #[prost(message, repeated, tag = "1")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImportResourceStateRequest {
    #[prost(string, tag = "1")]
    pub resource_type: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImportedResource {
    #[prost(string, tag = "1")]
    pub resource_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub state: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImportResourceStateResponse {
    #[prost(message, repeated, tag = "1")]
    pub imported: ::prost::alloc::vec::Vec<ImportedResource>,
    #[prost(message, repeated, tag = "2")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateDataSourceConfigRequest {
    #[prost(string, tag = "1")]
    pub data_source_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub config: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateDataSourceConfigResponse {
    #[prost(message, repeated, tag = "1")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadDataSourceRequest {
    #[prost(string, tag = "1")]
    pub data_source_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub config: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadDataSourceResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub state: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub diagnostics: ::prost::alloc::vec::Vec<Diagnostic>,
}
/// Generated server implementations.
pub mod provider_server {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value
    )]
    use tonic::codegen::*;
    /// Generated trait containing gRPC methods that should be implemented for use with ProviderServer.
    #[tonic::async_trait]
    pub trait Provider: std::marker::Send + std::marker::Sync + 'static {
        async fn get_metadata(
            &self,
            request: tonic::Request<super::GetMetadataRequest>,
        ) -> std::result::Result<tonic::Response<super::GetMetadataResponse>, tonic::Status>;
        async fn get_schema(
            &self,
            request: tonic::Request<super::GetSchemaRequest>,
        ) -> std::result::Result<tonic::Response<super::GetSchemaResponse>, tonic::Status>;
        async fn validate_provider_config(
            &self,
            request: tonic::Request<super::ValidateProviderConfigRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ValidateProviderConfigResponse>,
            tonic::Status,
        >;
        async fn configure(
            &self,
            request: tonic::Request<super::ConfigureRequest>,
        ) -> std::result::Result<tonic::Response<super::ConfigureResponse>, tonic::Status>;
        async fn stop(
            &self,
            request: tonic::Request<super::StopRequest>,
        ) -> std::result::Result<tonic::Response<super::StopResponse>, tonic::Status>;
        async fn validate_resource_config(
            &self,
            request: tonic::Request<super::ValidateResourceConfigRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ValidateResourceConfigResponse>,
            tonic::Status,
        >;
        async fn plan(
            &self,
            request: tonic::Request<super::PlanRequest>,
        ) -> std::result::Result<tonic::Response<super::PlanResponse>, tonic::Status>;
        async fn create(
            &self,
            request: tonic::Request<super::CreateRequest>,
        ) -> std::result::Result<tonic::Response<super::CreateResponse>, tonic::Status>;
        async fn read(
            &self,
            request: tonic::Request<super::ReadRequest>,
        ) -> std::result::Result<tonic::Response<super::ReadResponse>, tonic::Status>;
        async fn update(
            &self,
            request: tonic::Request<super::UpdateRequest>,
        ) -> std::result::Result<tonic::Response<super::UpdateResponse>, tonic::Status>;
        async fn delete(
            &self,
            request: tonic::Request<super::DeleteRequest>,
        ) -> std::result::Result<tonic::Response<super::DeleteResponse>, tonic::Status>;
        async fn import_resource_state(
            &self,
            request: tonic::Request<super::ImportResourceStateRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ImportResourceStateResponse>,
            tonic::Status,
        >;
        async fn validate_data_source_config(
            &self,
            request: tonic::Request<super::ValidateDataSourceConfigRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ValidateDataSourceConfigResponse>,
            tonic::Status,
        >;
        async fn read_data_source(
            &self,
            request: tonic::Request<super::ReadDataSourceRequest>,
        ) -> std::result::Result<tonic::Response<super::ReadDataSourceResponse>, tonic::Status>;
    }
    #[derive(Debug)]
    pub struct ProviderServer<T> {
        inner: Arc<T>,
    }
    impl<T> ProviderServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }
        pub fn from_arc(inner: Arc<T>) -> Self {
            Self { inner }
        }
    }
    macro_rules! unary_svc {
        ($svc:ident, $method:ident, $req:ty, $resp:ty) => {
            #[allow(non_camel_case_types)]
            struct $svc<T: Provider>(pub Arc<T>);
            impl<T: Provider> tonic::server::UnaryService<$req> for $svc<T> {
                type Response = $resp;
                type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                fn call(&mut self, request: tonic::Request<$req>) -> Self::Future {
                    let inner = Arc::clone(&self.0);
                    let fut = async move { <T as Provider>::$method(&inner, request).await };
                    Box::pin(fut)
                }
            }
        };
    }
    unary_svc!(GetMetadataSvc, get_metadata, super::GetMetadataRequest, super::GetMetadataResponse);
    unary_svc!(GetSchemaSvc, get_schema, super::GetSchemaRequest, super::GetSchemaResponse);
    unary_svc!(
        ValidateProviderConfigSvc,
        validate_provider_config,
        super::ValidateProviderConfigRequest,
        super::ValidateProviderConfigResponse
    );
    unary_svc!(ConfigureSvc, configure, super::ConfigureRequest, super::ConfigureResponse);
    unary_svc!(StopSvc, stop, super::StopRequest, super::StopResponse);
    unary_svc!(
        ValidateResourceConfigSvc,
        validate_resource_config,
        super::ValidateResourceConfigRequest,
        super::ValidateResourceConfigResponse
    );
    unary_svc!(PlanSvc, plan, super::PlanRequest, super::PlanResponse);
    unary_svc!(CreateSvc, create, super::CreateRequest, super::CreateResponse);
    unary_svc!(ReadSvc, read, super::ReadRequest, super::ReadResponse);
    unary_svc!(UpdateSvc, update, super::UpdateRequest, super::UpdateResponse);
    unary_svc!(DeleteSvc, delete, super::DeleteRequest, super::DeleteResponse);
    unary_svc!(
        ImportResourceStateSvc,
        import_resource_state,
        super::ImportResourceStateRequest,
        super::ImportResourceStateResponse
    );
    unary_svc!(
        ValidateDataSourceConfigSvc,
        validate_data_source_config,
        super::ValidateDataSourceConfigRequest,
        super::ValidateDataSourceConfigResponse
    );
    unary_svc!(
        ReadDataSourceSvc,
        read_data_source,
        super::ReadDataSourceRequest,
        super::ReadDataSourceResponse
    );
    fn unary<S, Req, Resp, B>(
        method: S,
        req: http::Request<B>,
    ) -> BoxFuture<http::Response<tonic::body::Body>, std::convert::Infallible>
    where
        S: tonic::server::UnaryService<Req, Response = Resp> + std::marker::Send + 'static,
        S::Future: std::marker::Send + 'static,
        Req: ::prost::Message + Default + std::marker::Send + 'static,
        Resp: ::prost::Message + std::marker::Send + 'static,
        B: Body + std::marker::Send + 'static,
        B::Error: Into<StdError> + std::marker::Send + 'static,
    {
        Box::pin(async move {
            let codec: tonic_prost::ProstCodec<Resp, Req> = tonic_prost::ProstCodec::default();
            let mut grpc = tonic::server::Grpc::new(codec);
            let res = grpc.unary(method, req).await;
            Ok(res)
        })
    }
    impl<T, B> tonic::codegen::Service<http::Request<B>> for ProviderServer<T>
    where
        T: Provider,
        B: Body + std::marker::Send + 'static,
        B::Error: Into<StdError> + std::marker::Send + 'static,
    {
        type Response = http::Response<tonic::body::Body>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/doublecloud.provider.v1.Provider/GetMetadata" => {
                    unary(GetMetadataSvc(inner), req)
                }
                "/doublecloud.provider.v1.Provider/GetSchema" => unary(GetSchemaSvc(inner), req),
                "/doublecloud.provider.v1.Provider/ValidateProviderConfig" => {
                    unary(ValidateProviderConfigSvc(inner), req)
                }
                "/doublecloud.provider.v1.Provider/Configure" => unary(ConfigureSvc(inner), req),
                "/doublecloud.provider.v1.Provider/Stop" => unary(StopSvc(inner), req),
                "/doublecloud.provider.v1.Provider/ValidateResourceConfig" => {
                    unary(ValidateResourceConfigSvc(inner), req)
                }
                "/doublecloud.provider.v1.Provider/Plan" => unary(PlanSvc(inner), req),
                "/doublecloud.provider.v1.Provider/Create" => unary(CreateSvc(inner), req),
                "/doublecloud.provider.v1.Provider/Read" => unary(ReadSvc(inner), req),
                "/doublecloud.provider.v1.Provider/Update" => unary(UpdateSvc(inner), req),
                "/doublecloud.provider.v1.Provider/Delete" => unary(DeleteSvc(inner), req),
                "/doublecloud.provider.v1.Provider/ImportResourceState" => {
                    unary(ImportResourceStateSvc(inner), req)
                }
                "/doublecloud.provider.v1.Provider/ValidateDataSourceConfig" => {
                    unary(ValidateDataSourceConfigSvc(inner), req)
                }
                "/doublecloud.provider.v1.Provider/ReadDataSource" => {
                    unary(ReadDataSourceSvc(inner), req)
                }
                _ => Box::pin(async move {
                    let mut response = http::Response::new(tonic::body::Body::default());
                    let headers = response.headers_mut();
                    headers.insert(
                        tonic::Status::GRPC_STATUS,
                        (tonic::Code::Unimplemented as i32).into(),
                    );
                    headers.insert(
                        http::header::CONTENT_TYPE,
                        tonic::metadata::GRPC_CONTENT_TYPE,
                    );
                    Ok(response)
                }),
            }
        }
    }
    impl<T> Clone for ProviderServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    /// Generated gRPC service name
    pub const SERVICE_NAME: &str = "doublecloud.provider.v1.Provider";
    impl<T> tonic::server::NamedService for ProviderServer<T> {
        const NAME: &'static str = SERVICE_NAME;
    }
}
