//! Regenerates `src/generated.rs` from `proto/provider.proto`.
//!
//! The bindings are checked in. Run `cargo build --features regenerate-proto`
//! after editing the proto file.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/provider.proto");

    #[cfg(feature = "regenerate-proto")]
    {
        let src = std::path::Path::new("src");
        tonic_prost_build::configure()
            .build_client(false)
            .out_dir(src)
            .compile_protos(&["proto/provider.proto"], &["proto"])?;
        std::fs::rename(src.join("doublecloud.provider.v1.rs"), src.join("generated.rs"))?;
    }

    Ok(())
}
