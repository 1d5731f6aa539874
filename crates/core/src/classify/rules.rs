use crate::emotion::EmotionLabel;
use crate::features::FeatureVector;

pub const ENERGY_RAISED: f32 = 0.15;
pub const ENERGY_QUIET: f32 = 0.05;
pub const ENERGY_SHOUT: f32 = 0.2;
pub const TEMPO_FAST: f32 = 130.0;
pub const TEMPO_SLOW: f32 = 90.0;
pub const TEMPO_RUSHED: f32 = 140.0;
pub const PITCH_STD_WIDE: f32 = 80.0;
pub const PITCH_STD_ERRATIC: f32 = 100.0;
pub const PITCH_STD_FLAT: f32 = 30.0;
pub const ZCR_NOISY: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    /// Mutually exclusive; evaluated in table order, first match wins.
    Primary,
    /// Additive; every matching rule applies regardless of the primary.
    Secondary,
}

/// One scoring rule: a predicate over the feature vector and the score
/// deltas it contributes when it matches.
pub struct Rule {
    pub tier: Tier,
    pub name: &'static str,
    pub applies: fn(&FeatureVector) -> bool,
    pub deltas: &'static [(EmotionLabel, f32)],
}

/// The fixed rule table, primaries first in evaluation order.
pub static RULES: &[Rule] = &[
    Rule {
        tier: Tier::Primary,
        name: "loud_fast",
        applies: loud_fast,
        deltas: &[(EmotionLabel::Happiness, 0.4), (EmotionLabel::Stress, 0.2)],
    },
    Rule {
        tier: Tier::Primary,
        name: "loud_unsteady",
        applies: loud_unsteady,
        deltas: &[(EmotionLabel::Anger, 0.4), (EmotionLabel::Stress, 0.3)],
    },
    Rule {
        tier: Tier::Primary,
        name: "quiet_slow",
        applies: quiet_slow,
        deltas: &[(EmotionLabel::Sadness, 0.5)],
    },
    Rule {
        tier: Tier::Primary,
        name: "erratic_noisy",
        applies: erratic_noisy,
        deltas: &[(EmotionLabel::Fear, 0.4), (EmotionLabel::Stress, 0.3)],
    },
    Rule {
        tier: Tier::Primary,
        name: "baseline",
        applies: |_| true,
        deltas: &[(EmotionLabel::Calm, 0.4)],
    },
    Rule {
        tier: Tier::Secondary,
        name: "rushed",
        applies: |v| v.tempo > TEMPO_RUSHED,
        deltas: &[(EmotionLabel::Stress, 0.2)],
    },
    Rule {
        tier: Tier::Secondary,
        name: "shouting",
        applies: |v| v.energy > ENERGY_SHOUT,
        deltas: &[(EmotionLabel::Anger, 0.2)],
    },
    Rule {
        tier: Tier::Secondary,
        name: "monotone",
        applies: |v| v.pitch_std < PITCH_STD_FLAT,
        deltas: &[(EmotionLabel::Calm, 0.2), (EmotionLabel::Sadness, 0.2)],
    },
];

fn loud_fast(v: &FeatureVector) -> bool {
    v.energy > ENERGY_RAISED && v.tempo > TEMPO_FAST
}

fn loud_unsteady(v: &FeatureVector) -> bool {
    v.energy > ENERGY_RAISED && v.pitch_std > PITCH_STD_WIDE
}

// A tempo of 0.0 means "no beat detected", not "very slow", so a measured
// tempo is required here; without that, a silent clip would read as sad.
fn quiet_slow(v: &FeatureVector) -> bool {
    v.energy < ENERGY_QUIET && v.tempo > 0.0 && v.tempo < TEMPO_SLOW
}

fn erratic_noisy(v: &FeatureVector) -> bool {
    v.pitch_std > PITCH_STD_ERRATIC && v.zero_crossing_rate > ZCR_NOISY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(energy: f32, pitch_std: f32, tempo: f32, zcr: f32) -> FeatureVector {
        FeatureVector {
            energy,
            pitch_std,
            tempo,
            zero_crossing_rate: zcr,
            ..FeatureVector::default()
        }
    }

    #[test]
    fn loud_fast_needs_both_conditions() {
        assert!(loud_fast(&vector(0.2, 0.0, 135.0, 0.0)));
        assert!(!loud_fast(&vector(0.2, 0.0, 120.0, 0.0)));
        assert!(!loud_fast(&vector(0.1, 0.0, 135.0, 0.0)));
    }

    #[test]
    fn quiet_slow_ignores_undetermined_tempo() {
        assert!(quiet_slow(&vector(0.02, 0.0, 60.0, 0.0)));
        assert!(!quiet_slow(&vector(0.02, 0.0, 0.0, 0.0)));
        assert!(!quiet_slow(&vector(0.02, 0.0, 95.0, 0.0)));
    }

    #[test]
    fn erratic_noisy_needs_wide_pitch_and_noise() {
        assert!(erratic_noisy(&vector(0.0, 120.0, 0.0, 0.2)));
        assert!(!erratic_noisy(&vector(0.0, 120.0, 0.0, 0.05)));
        assert!(!erratic_noisy(&vector(0.0, 90.0, 0.0, 0.2)));
    }

    #[test]
    fn table_keeps_primaries_ahead_of_secondaries() {
        let first_secondary = RULES
            .iter()
            .position(|r| r.tier == Tier::Secondary)
            .expect("secondaries present");
        assert!(RULES[..first_secondary].iter().all(|r| r.tier == Tier::Primary));
        assert!(RULES[first_secondary..].iter().all(|r| r.tier == Tier::Secondary));
    }
}
