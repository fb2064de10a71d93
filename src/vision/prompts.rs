// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grading rubric sent with every inspection request.

use super::types::{AnalysisRequest, EncodedFrame};

/// Instruction prompt for decorative ball inspection.
///
/// Structural integrity is the only disqualifying criterion. The reply must
/// carry a `STATUS:` line and a `REASON:` line, see
/// [`interpret_reply`](super::interpreter::interpret_reply).
pub const RUBRIC_PROMPT: &str = r#"You are a quality control expert for decorative balls (also referred to as decorative spheres).
Analyze the provided image and respond in the following format:
STATUS: PASS, FAIL, or NO_BALL
REASON: Brief explanation (1-2 sentences max)

Important notes:
- A decorative ball/sphere is what we're looking for. These terms are interchangeable in our context.
- The ball may have intricate patterns, designs, or variations in color and material. They may be made of wood, plastic, or other materials. These materials are normal and not considered defects.
- Focus on structural integrity, not surface designs, texture, color, or material exclusively.

Example responses:
STATUS: PASS
REASON: The ball/sphere appears structurally sound with no visible cracks or deformities. Surface patterns are normal.

STATUS: FAIL
REASON: The ball/sphere has visible cracks or is not perfectly round.

STATUS: NO_BALL
REASON: There is no ball or sphere present in the image.

Analyze the image and provide your assessment:"#;

/// Pair the rubric with one frame
pub fn build_analysis_request(frame: EncodedFrame) -> AnalysisRequest {
    AnalysisRequest::new(RUBRIC_PROMPT, frame)
}
