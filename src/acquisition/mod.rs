// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image acquisition: camera and upload sources, and the controller that
//! runs one analysis at a time.

pub mod backend_client;
pub mod camera;
pub mod controller;

pub use backend_client::BackendClient;
pub use camera::{CameraSource, CaptureError, FileCamera};
pub use controller::{
    AcquisitionController, AcquisitionError, AcquisitionMode, ModeKind, ANALYSIS_FAILED_MESSAGE,
};
