use crate::emotion::{EmotionLabel, RawEstimate};
use crate::text::{TextClassifier, TextClassifyError};
use futures::future::BoxFuture;
use futures::FutureExt;

const MATCH_CONFIDENCE: f32 = 0.6;
const NEUTRAL_CONFIDENCE: f32 = 0.5;

/// Offline fallback used when no hosted-model key is configured: a small
/// keyword table scanned in label priority order.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordTextClassifier;

static KEYWORDS: &[(EmotionLabel, &[&str])] = &[
    (
        EmotionLabel::Happiness,
        &["happy", "joy", "excited", "wonderful", "great", "love"],
    ),
    (
        EmotionLabel::Sadness,
        &["sad", "unhappy", "depressed", "miserable", "lonely", "crying"],
    ),
    (
        EmotionLabel::Stress,
        &["stressed", "overwhelmed", "pressure", "exhausted", "deadline"],
    ),
    (
        EmotionLabel::Anger,
        &["angry", "mad", "furious", "hate", "annoyed"],
    ),
    (
        EmotionLabel::Fear,
        &["scared", "afraid", "fear", "terrified", "anxious", "worried"],
    ),
    (
        EmotionLabel::Calm,
        &["calm", "relaxed", "peaceful", "fine", "okay"],
    ),
];

impl KeywordTextClassifier {
    pub fn new() -> Self {
        Self
    }

    fn estimate(text: &str) -> RawEstimate {
        let lower = text.to_lowercase();
        for (label, words) in KEYWORDS {
            if words.iter().any(|word| lower.contains(word)) {
                return RawEstimate {
                    emotion: Some(label.as_str().to_owned()),
                    confidence: Some(MATCH_CONFIDENCE),
                };
            }
        }
        RawEstimate {
            emotion: Some(EmotionLabel::Calm.as_str().to_owned()),
            confidence: Some(NEUTRAL_CONFIDENCE),
        }
    }
}

impl TextClassifier for KeywordTextClassifier {
    fn classify(&self, text: String) -> BoxFuture<'_, Result<RawEstimate, TextClassifyError>> {
        async move { Ok(Self::estimate(&text)) }.boxed()
    }
}
