// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use ball_qc::{
    api::{start_server, AppState},
    config::Config,
    storage::FsImageStore,
    vision::{FrameAnalyzer, InferenceService, VisionAnalyzer, VlmClient},
};
use std::{env, sync::Arc};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🚀 Starting ball-qc v{}...\n", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    config.validate()?;
    let addr = config.socket_addr()?;

    println!("🧠 Connecting to vision model...");
    let mut state = match VlmClient::new(config.vlm.clone()) {
        Ok(client) => {
            if client.health_check().await {
                println!("✅ {} reachable (model: {})", client.endpoint(), client.model_name());
            } else {
                eprintln!("⚠️  {} is not reachable yet", client.endpoint());
                eprintln!("   Requests will fail until the endpoint comes up.");
            }
            if config.vlm.api_key.is_none() {
                println!("ℹ️  No VLM_API_KEY set, sending unauthenticated requests");
            }
            let analyzer: Arc<dyn FrameAnalyzer> = Arc::new(VisionAnalyzer::new(Arc::new(client)));
            AppState::new(analyzer, config.preprocess)
        }
        Err(e) => {
            eprintln!("❌ Failed to create vision model client: {}", e);
            eprintln!("   The server will start but analysis requests return 503.");
            AppState::unconfigured(config.preprocess)
        }
    };

    if let Some(ref dir) = config.capture_dir {
        println!("📁 Saving received frames to {}", dir.display());
        state = state.with_image_store(Arc::new(FsImageStore::new(dir)));
    }

    println!("   Frame bounds: {}x{}", config.preprocess.max_width, config.preprocess.max_height);
    println!("\n📡 Listening on http://{}\n", addr);

    start_server(addr, state).await
}
