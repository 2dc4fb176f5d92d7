//! Confidence gating over classification results.

use crate::types::{Prediction, RejectionReason, Selection};

/// The top prediction must score strictly above this to be accepted.
pub const CONFIDENCE_THRESHOLD: f32 = 0.65;

/// Sentinel label meaning "no landmark in this image" (compared case-insensitively).
pub const NEGATIVE_CLASS: &str = "negative";

/// Pick the top prediction and decide whether it names a landmark.
///
/// The service does not promise any ordering, so the maximum is searched
/// explicitly. On ties the first occurrence wins; NaN never wins.
pub fn select(predictions: &[Prediction]) -> Selection {
    let Some(top) = top_prediction(predictions) else {
        return Selection::Rejected {
            reason: RejectionReason::NoPredictions,
            top: None,
        };
    };

    let reason = if top.confidence.is_nan() || top.confidence <= CONFIDENCE_THRESHOLD {
        Some(RejectionReason::LowConfidence)
    } else if top.label.to_lowercase() == NEGATIVE_CLASS {
        Some(RejectionReason::NegativeClass)
    } else {
        None
    };

    match reason {
        Some(reason) => Selection::Rejected {
            reason,
            top: Some(top.clone()),
        },
        None => Selection::Accepted {
            label: top.label.clone(),
            confidence: top.confidence,
        },
    }
}

fn top_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    let mut best: Option<&Prediction> = None;
    for p in predictions {
        match best {
            None => best = Some(p),
            Some(b) if beats(p.confidence, b.confidence) => best = Some(p),
            _ => {}
        }
    }
    best
}

fn beats(candidate: f32, current: f32) -> bool {
    candidate > current || (current.is_nan() && !candidate.is_nan())
}
