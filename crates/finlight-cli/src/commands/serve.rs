//! Server command implementation

use anyhow::{Context, Result};
use finlight_core::ServiceConfig;

pub async fn cmd_serve(
    mut config: ServiceConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("🚀 Starting FinLight AI service...");
    println!("   Model dir: {}", config.storage.model_dir.display());
    println!(
        "   Listening: http://{}:{}",
        config.server.host, config.server.port
    );
    if config.server.allowed_origins.is_empty() {
        println!("   ⚠️  CORS: any origin (set server.allowed_origins for production)");
    } else {
        println!("   🔒 CORS: {}", config.server.allowed_origins.join(", "));
    }
    println!();

    finlight_server::serve(config)
        .await
        .context("Server error")
}
