// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Reply interpretation tests against realistic model output

use ball_qc::vision::{interpret_reply, AnalysisVerdict, VerdictStatus, FALLBACK_MESSAGE};

fn fallback() -> AnalysisVerdict {
    AnalysisVerdict::quality_error(FALLBACK_MESSAGE)
}

#[test]
fn test_well_formed_pass_reply() {
    let verdict = interpret_reply("STATUS: PASS\nREASON: Smooth glossy surface with no visible defects.");

    assert_eq!(verdict.status, VerdictStatus::Pass);
    assert_eq!(verdict.message, "Smooth glossy surface with no visible defects.");
}

#[test]
fn test_fail_reply_with_preamble() {
    let reply = "I have inspected the image carefully.\n\n\
                 STATUS: FAIL\n\
                 REASON: A hairline crack runs across the upper half of the ball.\n\n\
                 Let me know if you need anything else.";
    let verdict = interpret_reply(reply);

    assert_eq!(verdict.status, VerdictStatus::Fail);
    assert_eq!(
        verdict.message,
        "A hairline crack runs across the upper half of the ball."
    );
}

#[test]
fn test_no_ball_reply() {
    let verdict = interpret_reply("STATUS: NO_BALL\nREASON: The image shows an empty table.");

    assert_eq!(verdict.status, VerdictStatus::NoBall);
    assert_eq!(verdict.message, "The image shows an empty table.");
}

#[test]
fn test_markers_case_insensitive() {
    let verdict = interpret_reply("status: pass\nreason: Looks good");
    assert_eq!(verdict, AnalysisVerdict::new(VerdictStatus::Pass, "Looks good"));
}

#[test]
fn test_reason_before_status() {
    let verdict = interpret_reply("REASON: Paint is chipped near the hook.\nSTATUS: FAIL");
    assert_eq!(verdict.status, VerdictStatus::Fail);
    assert_eq!(verdict.message, "Paint is chipped near the hook.");
}

#[test]
fn test_missing_reason_falls_back() {
    assert_eq!(interpret_reply("STATUS: PASS"), fallback());
}

#[test]
fn test_missing_status_falls_back() {
    assert_eq!(interpret_reply("REASON: The ball looks fine."), fallback());
}

#[test]
fn test_unknown_status_token_falls_back() {
    assert_eq!(interpret_reply("STATUS: MAYBE\nREASON: Hard to tell."), fallback());
}

#[test]
fn test_empty_reply_falls_back() {
    assert_eq!(interpret_reply(""), fallback());
}

#[test]
fn test_prose_reply_falls_back() {
    let verdict = interpret_reply("The ball appears to be in good condition overall.");
    assert_eq!(verdict.status, VerdictStatus::QualityError);
    assert_eq!(verdict.message, FALLBACK_MESSAGE);
}

#[test]
fn test_verdict_serializes_for_clients() {
    let verdict = interpret_reply("STATUS: NO_BALL\nREASON: Nothing in frame.");
    let json = serde_json::to_value(&verdict).unwrap();

    assert_eq!(
        json,
        serde_json::json!({"status": "no_ball", "message": "Nothing in frame."})
    );
}
