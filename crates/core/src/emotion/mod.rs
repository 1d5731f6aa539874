mod normalize;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use normalize::normalize_estimate;

/// Canonical emotion labels. Declaration order doubles as the fixed
/// tie-break priority applied whenever accumulated scores are equal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happiness,
    Sadness,
    Stress,
    Anger,
    Fear,
    Calm,
}

pub const LABEL_PRIORITY: [EmotionLabel; 6] = [
    EmotionLabel::Happiness,
    EmotionLabel::Sadness,
    EmotionLabel::Stress,
    EmotionLabel::Anger,
    EmotionLabel::Fear,
    EmotionLabel::Calm,
];

impl EmotionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happiness => "happiness",
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Stress => "stress",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Calm => "calm",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One modality's emotion estimate. Immutable once produced.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChannelEstimate {
    pub emotion: EmotionLabel,
    pub confidence: f32,
}

impl ChannelEstimate {
    pub fn new(emotion: EmotionLabel, confidence: f32) -> Self {
        Self {
            emotion,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// The pipeline's final output. Same shape as a channel estimate, but only
/// ever derived by the fusion engine.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FusedEstimate {
    pub emotion: EmotionLabel,
    pub confidence: f32,
}

impl FusedEstimate {
    pub(crate) fn new(emotion: EmotionLabel, confidence: f32) -> Self {
        Self {
            emotion,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub(crate) fn neutral(confidence: f32) -> Self {
        Self::new(EmotionLabel::Calm, confidence)
    }
}

/// Estimate-like value as received from an external classifier, before any
/// validation. Absent fields and unknown labels are expected here.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RawEstimate {
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Per-call score accumulator over the six labels.
///
/// Backed by a fixed array iterated in [`LABEL_PRIORITY`] order so equal
/// scores always resolve the same way; never replace this with an unordered
/// map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreTable {
    scores: [f32; LABEL_PRIORITY.len()],
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: EmotionLabel, delta: f32) {
        self.scores[label as usize] += delta;
    }

    pub fn score(&self, label: EmotionLabel) -> f32 {
        self.scores[label as usize]
    }

    /// Label with the highest accumulated score, and that score. Ties go to
    /// the label that comes first in [`LABEL_PRIORITY`].
    pub fn leader(&self) -> (EmotionLabel, f32) {
        let mut best = LABEL_PRIORITY[0];
        let mut best_score = self.score(best);
        for &label in &LABEL_PRIORITY[1..] {
            let score = self.score(label);
            if score > best_score {
                best = label;
                best_score = score;
            }
        }
        (best, best_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_serialize_lowercase() {
        let s = serde_json::to_string(&EmotionLabel::Happiness).expect("serialize");
        assert_eq!(s, "\"happiness\"");
        let back: EmotionLabel = serde_json::from_str("\"calm\"").expect("deserialize");
        assert_eq!(back, EmotionLabel::Calm);
    }

    #[test]
    fn channel_estimate_clamps_confidence() {
        assert_eq!(ChannelEstimate::new(EmotionLabel::Fear, 1.7).confidence, 1.0);
        assert_eq!(ChannelEstimate::new(EmotionLabel::Fear, -0.2).confidence, 0.0);
    }

    #[test]
    fn score_table_accumulates() {
        let mut table = ScoreTable::new();
        table.add(EmotionLabel::Stress, 0.2);
        table.add(EmotionLabel::Stress, 0.3);
        assert!((table.score(EmotionLabel::Stress) - 0.5).abs() < 1e-6);
        assert_eq!(table.score(EmotionLabel::Anger), 0.0);
    }

    #[test]
    fn leader_breaks_ties_by_priority_order() {
        let mut table = ScoreTable::new();
        table.add(EmotionLabel::Anger, 0.4);
        table.add(EmotionLabel::Stress, 0.4);
        let (label, score) = table.leader();
        assert_eq!(label, EmotionLabel::Stress);
        assert!((score - 0.4).abs() < 1e-6);

        let mut table = ScoreTable::new();
        table.add(EmotionLabel::Calm, 0.4);
        table.add(EmotionLabel::Happiness, 0.4);
        assert_eq!(table.leader().0, EmotionLabel::Happiness);
    }
}
