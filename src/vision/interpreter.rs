// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Turns the vision model's free-form reply into an [`AnalysisVerdict`].

use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

use super::types::{AnalysisVerdict, VerdictStatus};

/// Message used when the reply does not carry both markers
pub const FALLBACK_MESSAGE: &str = "Unable to determine ball quality.";

fn status_regex() -> &'static Regex {
    static STATUS: OnceLock<Regex> = OnceLock::new();
    STATUS.get_or_init(|| {
        Regex::new(r"(?i)STATUS:\s*(PASS|FAIL|NO_BALL)").expect("status pattern is valid")
    })
}

fn reason_regex() -> &'static Regex {
    static REASON: OnceLock<Regex> = OnceLock::new();
    REASON.get_or_init(|| Regex::new(r"(?i)REASON:\s*(.+)").expect("reason pattern is valid"))
}

/// Parse a reply into a verdict.
///
/// The `STATUS:` and `REASON:` markers are searched independently anywhere
/// in the text. If either is missing the verdict is `quality_error` with
/// [`FALLBACK_MESSAGE`]; this function never fails.
pub fn interpret_reply(reply: &str) -> AnalysisVerdict {
    let status = status_regex()
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| parse_status_token(m.as_str()));
    let reason = reason_regex()
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim());

    match (status, reason) {
        (Some(status), Some(reason)) => {
            info!("Parsed verdict: {} ({})", status, reason);
            AnalysisVerdict::new(status, reason)
        }
        _ => {
            warn!("Unexpected reply format: {:?}", reply);
            AnalysisVerdict::quality_error(FALLBACK_MESSAGE)
        }
    }
}

fn parse_status_token(token: &str) -> VerdictStatus {
    match token.to_ascii_lowercase().as_str() {
        "pass" => VerdictStatus::Pass,
        "fail" => VerdictStatus::Fail,
        _ => VerdictStatus::NoBall,
    }
}
