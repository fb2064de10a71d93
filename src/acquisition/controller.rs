// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Acquisition controller
//!
//! Holds the current image source (live camera or an uploaded still) and
//! drives one analysis at a time through preprocess -> request -> interpret.
//!
//! State is kept behind a `std::sync::Mutex` that is only held for the
//! check-and-set of a transition, never across an `.await`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{info, warn};

use super::camera::{CameraSource, CaptureError};
use crate::vision::{
    preprocess, AnalysisVerdict, FrameAnalyzer, ImageError, PreprocessConfig, RawImage,
};

/// Verdict message when the inference call itself fails
pub const ANALYSIS_FAILED_MESSAGE: &str = "An error occurred during analysis.";

/// Which source supplies the next image
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionMode {
    Live,
    Uploaded(RawImage),
}

impl AcquisitionMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            AcquisitionMode::Live => ModeKind::Live,
            AcquisitionMode::Uploaded(_) => ModeKind::Uploaded,
        }
    }
}

/// Payload-free tag of [`AcquisitionMode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Live,
    Uploaded,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeKind::Live => f.write_str("live"),
            ModeKind::Uploaded => f.write_str("uploaded"),
        }
    }
}

/// Local failures of an acquisition action. These never become verdicts.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("An analysis is already in progress")]
    Busy,

    #[error("Operation requires {expected} mode, controller is in {actual} mode")]
    WrongMode { expected: ModeKind, actual: ModeKind },

    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Decode(#[from] ImageError),
}

struct ControllerState {
    mode: AcquisitionMode,
    analyzing: bool,
    last_verdict: Option<AnalysisVerdict>,
}

/// Clears the busy flag when the analysis ends, however it ends.
struct AnalysisGuard<'a> {
    state: &'a Mutex<ControllerState>,
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).analyzing = false;
    }
}

fn lock(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State machine over `Idle(live)`, `Idle(uploaded, image)` and `Analyzing`
pub struct AcquisitionController {
    camera: Arc<dyn CameraSource>,
    analyzer: Arc<dyn FrameAnalyzer>,
    preprocess: PreprocessConfig,
    state: Mutex<ControllerState>,
}

impl AcquisitionController {
    /// Create a controller in `Idle(live)`.
    ///
    /// The camera is not activated until [`switch_to_live`](Self::switch_to_live)
    /// is called.
    pub fn new(
        camera: Arc<dyn CameraSource>,
        analyzer: Arc<dyn FrameAnalyzer>,
        preprocess: PreprocessConfig,
    ) -> Self {
        Self {
            camera,
            analyzer,
            preprocess,
            state: Mutex::new(ControllerState {
                mode: AcquisitionMode::Live,
                analyzing: false,
                last_verdict: None,
            }),
        }
    }

    /// Current mode (clones the held upload, if any)
    pub fn mode(&self) -> AcquisitionMode {
        lock(&self.state).mode.clone()
    }

    pub fn mode_kind(&self) -> ModeKind {
        lock(&self.state).mode.kind()
    }

    /// Advisory busy flag: true while an analysis is in flight
    pub fn is_busy(&self) -> bool {
        lock(&self.state).analyzing
    }

    /// Verdict of the most recent completed analysis
    pub fn last_verdict(&self) -> Option<AnalysisVerdict> {
        lock(&self.state).last_verdict.clone()
    }

    /// Drop any held upload and request the live camera feed.
    ///
    /// Activation failures are logged; the mode still switches and the next
    /// capture reports the problem.
    pub async fn switch_to_live(&self) {
        lock(&self.state).mode = AcquisitionMode::Live;

        if let Err(e) = self.camera.activate().await {
            warn!("Error accessing the camera: {}", e);
        }
    }

    /// Decode `bytes` and hold them as the uploaded image.
    ///
    /// On decode failure the current mode and image are left untouched.
    pub fn upload_image(&self, bytes: Vec<u8>) -> Result<(), AcquisitionError> {
        let raw = RawImage::decode(bytes)?;
        info!("Uploaded image {}x{}", raw.width, raw.height);
        lock(&self.state).mode = AcquisitionMode::Uploaded(raw);
        Ok(())
    }

    /// Grab a camera frame and analyze it. Only valid in live mode.
    pub async fn capture_and_analyze(&self) -> Result<AnalysisVerdict, AcquisitionError> {
        let (_guard, _) = self.begin(ModeKind::Live)?;

        let bytes = self.camera.grab_frame().await?;
        let raw = RawImage::decode(bytes)?;
        self.run_pipeline(raw).await
    }

    /// Analyze the held upload. Only valid in uploaded mode.
    pub async fn analyze_uploaded(&self) -> Result<AnalysisVerdict, AcquisitionError> {
        let (_guard, source) = self.begin(ModeKind::Uploaded)?;

        match source {
            Some(raw) => self.run_pipeline(raw).await,
            None => Err(AcquisitionError::WrongMode {
                expected: ModeKind::Uploaded,
                actual: ModeKind::Live,
            }),
        }
    }

    /// Enter `Analyzing` if idle in the expected mode
    fn begin(
        &self,
        expected: ModeKind,
    ) -> Result<(AnalysisGuard<'_>, Option<RawImage>), AcquisitionError> {
        let mut state = lock(&self.state);
        if state.analyzing {
            warn!("Analysis requested while another is in flight, ignoring");
            return Err(AcquisitionError::Busy);
        }

        let source = match (&state.mode, expected) {
            (AcquisitionMode::Live, ModeKind::Live) => None,
            (AcquisitionMode::Uploaded(raw), ModeKind::Uploaded) => Some(raw.clone()),
            (mode, expected) => {
                return Err(AcquisitionError::WrongMode {
                    expected,
                    actual: mode.kind(),
                })
            }
        };

        state.analyzing = true;
        Ok((AnalysisGuard { state: &self.state }, source))
    }

    /// Preprocess errors propagate; service errors fold into a verdict.
    async fn run_pipeline(&self, raw: RawImage) -> Result<AnalysisVerdict, AcquisitionError> {
        let frame = preprocess(&raw, &self.preprocess)?;

        let verdict = match self.analyzer.analyze(frame).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Analysis failed: {}", e);
                AnalysisVerdict::quality_error(ANALYSIS_FAILED_MESSAGE)
            }
        };

        info!("Analysis complete: {}", verdict.status);
        lock(&self.state).last_verdict = Some(verdict.clone());
        Ok(verdict)
    }
}
