use crate::classify::AcousticClassifier;
use crate::config::PipelineDefaults;
use crate::decode::{AudioDecoder, AudioInput};
use crate::emotion::{normalize_estimate, ChannelEstimate, FusedEstimate};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::fusion::FusionEngine;
use crate::text::TextClassifier;
use serde::Serialize;

/// One inference call's inputs. Either channel may be absent.
#[derive(Clone, Debug, Default)]
pub struct InferenceRequest {
    pub audio: Option<AudioInput>,
    pub text: Option<String>,
}

/// Voice-channel result, carrying the raw feature vector for observability.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct VoiceAnalysis {
    pub estimate: ChannelEstimate,
    pub features: FeatureVector,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct InferenceOutcome {
    pub fused: FusedEstimate,
    pub text: Option<ChannelEstimate>,
    pub voice: Option<VoiceAnalysis>,
}

/// The full inference pipeline over the two collaborator seams.
///
/// Stateless across calls: every invocation depends only on its own inputs,
/// so one pipeline value may serve any number of concurrent callers.
pub struct Pipeline<D, T> {
    decoder: D,
    text_classifier: T,
    extractor: FeatureExtractor,
    classifier: AcousticClassifier,
    fusion: FusionEngine,
}

impl<D, T> Pipeline<D, T>
where
    D: AudioDecoder,
    T: TextClassifier,
{
    pub fn new(decoder: D, text_classifier: T, defaults: &PipelineDefaults) -> Self {
        Self {
            decoder,
            text_classifier,
            extractor: FeatureExtractor::new(),
            classifier: AcousticClassifier::new(defaults),
            fusion: FusionEngine::new(defaults),
        }
    }

    /// Run one inference. Total: a failing channel degrades to absent with
    /// a warning, and the worst case output is the neutral estimate.
    pub async fn infer(&self, request: InferenceRequest) -> InferenceOutcome {
        let (voice, text) = tokio::join!(
            self.voice_channel(request.audio),
            self.text_channel(request.text)
        );
        let fused = self.fusion.fuse(text, voice.map(|v| v.estimate));
        InferenceOutcome { fused, text, voice }
    }

    async fn voice_channel(&self, audio: Option<AudioInput>) -> Option<VoiceAnalysis> {
        let input = audio?;
        match self.decoder.decode_clip(input).await {
            Ok(clip) => {
                let features = self.extractor.extract(&clip.samples, clip.sample_rate);
                let estimate = self.classifier.classify(&features);
                tracing::debug!(
                    emotion = %estimate.emotion,
                    confidence = estimate.confidence,
                    clip_ms = clip.duration().as_millis() as u64,
                    "voice channel classified"
                );
                Some(VoiceAnalysis { estimate, features })
            }
            Err(e) => {
                tracing::warn!(error = %e, "audio decode failed, dropping voice channel");
                None
            }
        }
    }

    async fn text_channel(&self, text: Option<String>) -> Option<ChannelEstimate> {
        let text = text?;
        if text.trim().is_empty() {
            return None;
        }
        match self.text_classifier.classify(text).await {
            Ok(raw) => normalize_estimate(Some(&raw)),
            Err(e) => {
                tracing::warn!(error = %e, "text classification failed, dropping text channel");
                None
            }
        }
    }
}
