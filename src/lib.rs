// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod acquisition;
pub mod api;
pub mod cli;
pub mod config;
pub mod storage;
pub mod vision;

// Re-export main types
pub use acquisition::{AcquisitionController, AcquisitionError, AcquisitionMode, CameraSource};
pub use api::{create_router, start_server, ApiError, AppState};
pub use config::Config;
pub use storage::{FsImageStore, ImageStore};
pub use vision::{
    AnalysisVerdict, EncodedFrame, FrameAnalyzer, InferenceService, RawImage, ServiceError,
    VerdictStatus, VisionAnalyzer, VlmClient, VlmConfig,
};
