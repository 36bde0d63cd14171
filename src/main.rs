use doublecloud_provider::{init_logging, serve, DoubleCloudProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    serve(DoubleCloudProvider::new(env!("CARGO_PKG_VERSION"))).await
}
