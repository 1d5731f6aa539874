#![deny(warnings)]

use anyhow::Context;
use bytes::Bytes;
use clap::{ArgGroup, Parser};
use emotion_fusion_core::config::{
    resolve_api_key, resolve_string_with_default, ApiKeys, AppConfig, ChannelWeights, Env,
    PipelineDefaults, StdEnv, TextModel, DEFAULT_CONFIDENCE_FLOOR, DEFAULT_TEXT_MODEL,
    DEFAULT_TEXT_WEIGHT, DEFAULT_VOICE_WEIGHT, ENV_GEMINI_API_KEY, ENV_TEXT_MODEL,
};
use emotion_fusion_core::decode::{AudioInput, SymphoniaAudioDecoder};
use emotion_fusion_core::pipeline::{InferenceRequest, Pipeline};
use emotion_fusion_core::text::{GeminiTextClassifier, KeywordTextClassifier, TextClassifier};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "emotion-fusion")]
#[command(about = "Multimodal emotion inference (acoustic features fused with a text estimate)")]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .multiple(true)
        .args(["audio", "text"])
))]
struct Args {
    /// Audio clip for the voice channel (any probeable container).
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Transcribed or typed text for the text channel.
    #[arg(long)]
    text: Option<String>,

    #[arg(long)]
    gemini_api_key: Option<String>,

    /// Hosted model for the text channel; falls back to the env var, then
    /// the built-in default.
    #[arg(long)]
    model: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TEXT_WEIGHT)]
    text_weight: f32,

    #[arg(long, default_value_t = DEFAULT_VOICE_WEIGHT)]
    voice_weight: f32,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Pretty-print the JSON outcome.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let pretty = args.pretty;
    let cfg = build_config(args, &StdEnv)?;

    tracing::info!(
        model = cfg.model.as_str(),
        text_weight = cfg.defaults.weights.text,
        voice_weight = cfg.defaults.weights.voice,
        "config loaded"
    );

    run_inference(cfg, pretty).await
}

async fn run_inference(cfg: AppConfig, pretty: bool) -> anyhow::Result<()> {
    let audio = match &cfg.audio_path {
        Some(path) => Some(read_audio(path).await?),
        None => None,
    };

    let text_classifier: Box<dyn TextClassifier> = match cfg.api_keys.gemini.clone() {
        Some(key) => Box::new(GeminiTextClassifier::new(key, cfg.model.clone())),
        None => {
            tracing::info!("no api key configured, using the keyword fallback text classifier");
            Box::new(KeywordTextClassifier::new())
        }
    };

    let pipeline = Pipeline::new(SymphoniaAudioDecoder::new(), text_classifier, &cfg.defaults);
    let outcome = pipeline
        .infer(InferenceRequest {
            audio,
            text: cfg.text.clone(),
        })
        .await;

    tracing::info!(
        emotion = %outcome.fused.emotion,
        confidence = outcome.fused.confidence,
        "inference complete"
    );

    let rendered = if pretty {
        serde_json::to_string_pretty(&outcome)
    } else {
        serde_json::to_string(&outcome)
    }
    .context("serializing outcome")?;
    println!("{rendered}");

    Ok(())
}

async fn read_audio(path: &Path) -> anyhow::Result<AudioInput> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading audio file {}", path.display()))?;
    let extension_hint = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_owned);
    Ok(AudioInput {
        bytes: Bytes::from(bytes),
        extension_hint,
    })
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn build_config(args: Args, env: &impl Env) -> anyhow::Result<AppConfig> {
    let model = TextModel::new(resolve_string_with_default(
        args.model,
        ENV_TEXT_MODEL,
        env,
        DEFAULT_TEXT_MODEL,
    ))?;
    let gemini = resolve_api_key(args.gemini_api_key, ENV_GEMINI_API_KEY, env)?;
    let weights = ChannelWeights::new(args.text_weight, args.voice_weight)?;
    let defaults = PipelineDefaults::new(weights, DEFAULT_CONFIDENCE_FLOOR)?;

    Ok(AppConfig {
        audio_path: args.audio,
        text: args.text,
        model,
        api_keys: ApiKeys { gemini },
        defaults,
    })
}
