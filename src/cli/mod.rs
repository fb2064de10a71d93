// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::acquisition::{AcquisitionController, BackendClient, CameraSource, FileCamera};
use crate::config::Config;
use crate::vision::{
    AnalysisVerdict, FrameAnalyzer, InferenceService, VerdictStatus, VisionAnalyzer, VlmClient,
};

/// Ball QC operator CLI
#[derive(Parser, Debug)]
#[command(name = "ball-qc-cli")]
#[command(version)]
#[command(about = "Grade decorative ball photos with a vision model", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload an image file and analyze it
    Analyze(AnalyzeArgs),

    /// Capture the current camera snapshot and analyze it
    Capture(CaptureArgs),

    /// Check that the vision model endpoint is reachable
    Health(ServiceArgs),
}

/// Where analyses are sent
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Send frames to a running ball-qc server instead of the model directly
    #[arg(long, env = "BALL_QC_BACKEND")]
    pub backend: Option<String>,

    /// OpenAI-compatible endpoint (overrides VLM_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model name (overrides VLM_MODEL)
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image file to upload
    pub file: PathBuf,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Snapshot file kept current by the camera capture process
    #[arg(long, env = "CAMERA_SNAPSHOT")]
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    dotenv::dotenv().ok();

    match cli.command {
        Commands::Analyze(args) => analyze_file(args).await,
        Commands::Capture(args) => capture(args).await,
        Commands::Health(args) => health(args).await,
    }
}

fn load_config(args: &ServiceArgs) -> Result<Config> {
    let mut config = Config::from_env();
    if let Some(ref endpoint) = args.endpoint {
        config.vlm.endpoint = endpoint.clone();
    }
    if let Some(ref model) = args.model {
        config.vlm.model_name = model.clone();
    }
    config.validate()?;
    Ok(config)
}

fn build_analyzer(args: &ServiceArgs, config: &Config) -> Result<Arc<dyn FrameAnalyzer>> {
    match args.backend {
        Some(ref url) => {
            info!("Using ball-qc backend at {}", url);
            Ok(Arc::new(BackendClient::new(url, config.vlm.timeout_secs)?))
        }
        None => {
            let client = VlmClient::new(config.vlm.clone())?;
            Ok(Arc::new(VisionAnalyzer::new(Arc::new(client))))
        }
    }
}

async fn analyze_file(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(&args.service)?;
    let analyzer = build_analyzer(&args.service, &config)?;
    // Upload mode never touches the camera
    let camera: Arc<dyn CameraSource> = Arc::new(FileCamera::new(&args.file));
    let controller = AcquisitionController::new(camera, analyzer, config.preprocess);

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    controller
        .upload_image(bytes)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let verdict = controller.analyze_uploaded().await?;
    print_verdict(&verdict);
    Ok(())
}

async fn capture(args: CaptureArgs) -> Result<()> {
    let config = load_config(&args.service)?;
    let analyzer = build_analyzer(&args.service, &config)?;
    let camera: Arc<dyn CameraSource> = Arc::new(FileCamera::new(&args.snapshot));
    let controller = AcquisitionController::new(camera, analyzer, config.preprocess);

    controller.switch_to_live().await;
    let verdict = controller.capture_and_analyze().await?;
    print_verdict(&verdict);
    Ok(())
}

async fn health(args: ServiceArgs) -> Result<()> {
    let config = load_config(&args)?;
    let client = VlmClient::new(config.vlm)?;

    if client.health_check().await {
        println!("✅ {} reachable (model: {})", client.endpoint(), client.model_name());
        Ok(())
    } else {
        anyhow::bail!("Vision model endpoint is not reachable")
    }
}

/// Headline shown above the verdict message
pub fn verdict_headline(verdict: &AnalysisVerdict) -> String {
    match verdict.status {
        VerdictStatus::NoBall => "No Ball Detected".to_string(),
        VerdictStatus::QualityError => "Quality Check: ERROR".to_string(),
        status => format!("Quality Check: {}", status.as_str().to_uppercase()),
    }
}

fn print_verdict(verdict: &AnalysisVerdict) {
    println!("{}", verdict_headline(verdict));
    println!("{}", verdict.message);
}
