use crate::config::DEFAULT_MISSING_CONFIDENCE;
use crate::emotion::{ChannelEstimate, EmotionLabel, RawEstimate, LABEL_PRIORITY};

/// Validate one channel's raw estimate into a well-formed [`ChannelEstimate`].
///
/// `None` means the channel contributes nothing to fusion; an absent or
/// unrecognizable estimate is never coerced to `calm`.
pub fn normalize_estimate(raw: Option<&RawEstimate>) -> Option<ChannelEstimate> {
    let raw = raw?;
    let label = canonical_label(raw.emotion.as_deref()?)?;
    let confidence = match raw.confidence {
        Some(c) if c.is_finite() => c,
        _ => DEFAULT_MISSING_CONFIDENCE,
    };
    Some(ChannelEstimate::new(label, confidence))
}

/// Map an external label onto the canonical set: exact names first, then the
/// synonym families external classifiers are known to emit. Anything else is
/// dropped rather than passed through.
fn canonical_label(raw: &str) -> Option<EmotionLabel> {
    let name = raw.trim().to_lowercase();
    for label in LABEL_PRIORITY {
        if name == label.as_str() {
            return Some(label);
        }
    }
    if name.contains("joy") {
        return Some(EmotionLabel::Happiness);
    }
    if name.contains("neutral") {
        return Some(EmotionLabel::Calm);
    }
    if name.contains("disgust") {
        return Some(EmotionLabel::Stress);
    }
    None
}
