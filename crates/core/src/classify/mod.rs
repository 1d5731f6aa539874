mod rules;

use crate::config::PipelineDefaults;
use crate::emotion::{ChannelEstimate, EmotionLabel, ScoreTable};
use crate::features::FeatureVector;
use rules::{Tier, RULES};

/// Threshold-driven mapping from a feature vector to a voice-channel
/// estimate. Total: every input, including all-zero vectors, produces a
/// valid estimate.
#[derive(Clone, Copy, Debug)]
pub struct AcousticClassifier {
    confidence_floor: f32,
    neutral_confidence: f32,
}

impl AcousticClassifier {
    pub fn new(defaults: &PipelineDefaults) -> Self {
        Self {
            confidence_floor: defaults.confidence_floor,
            neutral_confidence: defaults.neutral_confidence,
        }
    }

    pub fn classify(&self, features: &FeatureVector) -> ChannelEstimate {
        let mut table = ScoreTable::new();
        let mut primary_fired = false;
        for rule in RULES {
            match rule.tier {
                Tier::Primary => {
                    if primary_fired || !(rule.applies)(features) {
                        continue;
                    }
                    primary_fired = true;
                    tracing::debug!(rule = rule.name, "primary rule fired");
                }
                Tier::Secondary => {
                    if !(rule.applies)(features) {
                        continue;
                    }
                }
            }
            for &(label, delta) in rule.deltas {
                table.add(label, delta);
            }
        }
        self.select(&table)
    }

    /// Winner selection with the low-confidence override: a verdict weaker
    /// than the floor is replaced by the neutral estimate rather than
    /// reported with false precision.
    fn select(&self, table: &ScoreTable) -> ChannelEstimate {
        let (label, score) = table.leader();
        let confidence = score.min(1.0);
        if confidence < self.confidence_floor {
            ChannelEstimate::new(EmotionLabel::Calm, self.neutral_confidence)
        } else {
            ChannelEstimate::new(label, confidence)
        }
    }
}
