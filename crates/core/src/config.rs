use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

pub const DEFAULT_TEXT_WEIGHT: f32 = 0.6;
pub const DEFAULT_VOICE_WEIGHT: f32 = 0.4;
pub const DEFAULT_CONFIDENCE_FLOOR: f32 = 0.3;
pub const DEFAULT_NEUTRAL_CONFIDENCE: f32 = 0.5;
pub const DEFAULT_MISSING_CONFIDENCE: f32 = 0.5;
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_TEXT_MODEL: &str = "EMOTION_FUSION_TEXT_MODEL";

/// Identifier of the hosted model used by the text-channel classifier.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextModel(pub String);

impl TextModel {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyTextModel);
        }
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TextModel {
    fn default() -> Self {
        Self(DEFAULT_TEXT_MODEL.to_owned())
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKeys {
    pub gemini: Option<ApiKey>,
}

/// Fixed per-channel fusion weights. Each weight must lie in [0, 1]; the two
/// are not required to sum to one.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChannelWeights {
    pub text: f32,
    pub voice: f32,
}

impl ChannelWeights {
    pub fn new(text: f32, voice: f32) -> Result<Self, ConfigError> {
        for weight in [text, voice] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::WeightOutOfRange(weight));
            }
        }
        Ok(Self { text, voice })
    }
}

impl Default for ChannelWeights {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_WEIGHT,
            voice: DEFAULT_VOICE_WEIGHT,
        }
    }
}

/// Process-wide pipeline constants, created once at startup and handed to
/// each component so no threshold lives as a magic number at a call site.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PipelineDefaults {
    pub weights: ChannelWeights,
    pub confidence_floor: f32,
    pub neutral_confidence: f32,
}

impl PipelineDefaults {
    pub fn new(weights: ChannelWeights, confidence_floor: f32) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&confidence_floor) {
            return Err(ConfigError::FloorOutOfRange(confidence_floor));
        }
        Ok(Self {
            weights,
            confidence_floor,
            neutral_confidence: DEFAULT_NEUTRAL_CONFIDENCE,
        })
    }
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            weights: ChannelWeights::default(),
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            neutral_confidence: DEFAULT_NEUTRAL_CONFIDENCE,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub audio_path: Option<PathBuf>,
    pub text: Option<String>,
    pub model: TextModel,
    pub api_keys: ApiKeys,
    pub defaults: PipelineDefaults,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("text model must not be empty")]
    EmptyTextModel,
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("channel weight {0} outside [0, 1]")]
    WeightOutOfRange(f32),
    #[error("confidence floor {0} outside [0, 1]")]
    FloorOutOfRange(f32),
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_GEMINI_API_KEY, "env-key");
        let key = resolve_api_key(Some("cli-key".to_owned()), ENV_GEMINI_API_KEY, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "cli-key");
    }

    #[test]
    fn api_key_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_GEMINI_API_KEY, "env-key");
        let key = resolve_api_key(None, ENV_GEMINI_API_KEY, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "env-key");
    }

    #[test]
    fn api_key_absent_when_both_missing() {
        let env = MapEnv::default();
        let key = resolve_api_key(None, ENV_GEMINI_API_KEY, &env).expect("no error");
        assert!(key.is_none());
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("secret").expect("valid");
        assert_eq!(format!("{key:?}"), "ApiKey(**redacted**)");
    }

    #[test]
    fn channel_weights_reject_out_of_range() {
        assert!(ChannelWeights::new(0.6, 0.4).is_ok());
        assert_eq!(
            ChannelWeights::new(1.2, 0.4),
            Err(ConfigError::WeightOutOfRange(1.2))
        );
        assert_eq!(
            ChannelWeights::new(0.6, -0.1),
            Err(ConfigError::WeightOutOfRange(-0.1))
        );
    }

    #[test]
    fn defaults_match_documented_constants() {
        let d = PipelineDefaults::default();
        assert_eq!(d.weights.text, 0.6);
        assert_eq!(d.weights.voice, 0.4);
        assert_eq!(d.confidence_floor, 0.3);
        assert_eq!(d.neutral_confidence, 0.5);
    }

    #[test]
    fn pipeline_defaults_reject_bad_floor() {
        let weights = ChannelWeights::default();
        assert_eq!(
            PipelineDefaults::new(weights, 1.5),
            Err(ConfigError::FloorOutOfRange(1.5))
        );
    }

    #[test]
    fn resolve_string_with_default_prefers_cli_then_env() {
        let env = MapEnv::default().with_var("MODEL", "env-model");
        let v = resolve_string_with_default(Some("cli-model".to_owned()), "MODEL", &env, "def");
        assert_eq!(v, "cli-model");
        let v = resolve_string_with_default(None, "MODEL", &env, "def");
        assert_eq!(v, "env-model");
        let v = resolve_string_with_default(None, "OTHER", &env, "def");
        assert_eq!(v, "def");
    }
}
