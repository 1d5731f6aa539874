use crate::config::{ChannelWeights, PipelineDefaults};
use crate::emotion::{ChannelEstimate, FusedEstimate, ScoreTable};

/// Confidence-weighted vote across the text and voice channels.
///
/// A single strongly confident channel can dominate a weak one, while two
/// channels agreeing on a label reinforce each other additively instead of
/// averaging away.
#[derive(Clone, Copy, Debug)]
pub struct FusionEngine {
    weights: ChannelWeights,
    neutral_confidence: f32,
}

impl FusionEngine {
    pub fn new(defaults: &PipelineDefaults) -> Self {
        Self {
            weights: defaults.weights,
            neutral_confidence: defaults.neutral_confidence,
        }
    }

    pub fn fuse(
        &self,
        text: Option<ChannelEstimate>,
        voice: Option<ChannelEstimate>,
    ) -> FusedEstimate {
        if text.is_none() && voice.is_none() {
            return FusedEstimate::neutral(self.neutral_confidence);
        }

        let mut table = ScoreTable::new();
        if let Some(estimate) = text {
            table.add(estimate.emotion, self.weights.text * estimate.confidence);
        }
        if let Some(estimate) = voice {
            table.add(estimate.emotion, self.weights.voice * estimate.confidence);
        }
        let (label, score) = table.leader();
        FusedEstimate::new(label, score.min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionLabel;

    fn engine() -> FusionEngine {
        FusionEngine::new(&PipelineDefaults::default())
    }

    fn estimate(emotion: EmotionLabel, confidence: f32) -> Option<ChannelEstimate> {
        Some(ChannelEstimate::new(emotion, confidence))
    }

    #[test]
    fn lone_text_channel_carries_its_weight() {
        let fused = engine().fuse(estimate(EmotionLabel::Happiness, 0.8), None);
        assert_eq!(fused.emotion, EmotionLabel::Happiness);
        assert!((fused.confidence - 0.48).abs() < 1e-6);
    }

    #[test]
    fn lone_voice_channel_carries_its_weight() {
        let fused = engine().fuse(None, estimate(EmotionLabel::Anger, 0.5));
        assert_eq!(fused.emotion, EmotionLabel::Anger);
        assert!((fused.confidence - 0.2).abs() < 1e-6);
    }

    #[test]
    fn agreeing_channels_reinforce_additively() {
        let fused = engine().fuse(
            estimate(EmotionLabel::Sadness, 0.5),
            estimate(EmotionLabel::Sadness, 0.5),
        );
        assert_eq!(fused.emotion, EmotionLabel::Sadness);
        assert!((fused.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn stronger_channel_wins_disagreements() {
        let fused = engine().fuse(
            estimate(EmotionLabel::Calm, 0.3),
            estimate(EmotionLabel::Fear, 0.9),
        );
        // text 0.3 * 0.6 = 0.18 against voice 0.9 * 0.4 = 0.36.
        assert_eq!(fused.emotion, EmotionLabel::Fear);
        assert!((fused.confidence - 0.36).abs() < 1e-6);
    }

    #[test]
    fn equal_votes_resolve_by_priority_order() {
        // text stress 0.4 * 0.6 = 0.24, voice anger 0.6 * 0.4 = 0.24;
        // stress comes first in the priority order.
        let fused = engine().fuse(
            estimate(EmotionLabel::Stress, 0.4),
            estimate(EmotionLabel::Anger, 0.6),
        );
        assert_eq!(fused.emotion, EmotionLabel::Stress);
    }

    #[test]
    fn no_channels_fall_back_to_neutral() {
        let fused = engine().fuse(None, None);
        assert_eq!(fused.emotion, EmotionLabel::Calm);
        assert!((fused.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn confidence_never_exceeds_one() {
        let full = ChannelWeights::new(1.0, 1.0).expect("valid weights");
        let defaults = PipelineDefaults::new(full, 0.3).expect("valid defaults");
        let fused = FusionEngine::new(&defaults).fuse(
            estimate(EmotionLabel::Stress, 1.0),
            estimate(EmotionLabel::Stress, 1.0),
        );
        assert_eq!(fused.confidence, 1.0);
    }
}
