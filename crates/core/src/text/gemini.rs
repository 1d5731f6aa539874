use crate::config::{ApiKey, TextModel};
use crate::emotion::{RawEstimate, LABEL_PRIORITY};
use crate::text::{TextClassifier, TextClassifyError};
use crate::util::{retry_with_backoff, RetryConfig};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

const ENDPOINT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Text-channel classifier backed by the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiTextClassifier {
    client: Client,
    api_key: ApiKey,
    model: TextModel,
    retry: RetryConfig,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

impl GeminiTextClassifier {
    pub fn new(api_key: ApiKey, model: TextModel) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            retry: RetryConfig::default(),
        }
    }

    fn endpoint(&self) -> Result<Url, TextClassifyError> {
        let base = format!("{ENDPOINT_BASE}/{}:generateContent", self.model.as_str());
        Url::parse_with_params(&base, [("key", self.api_key.expose())])
            .map_err(|e| TextClassifyError::InvalidResponse(format!("bad endpoint: {e}")))
    }

    async fn request_once(&self, text: &str) -> Result<RawEstimate, TextClassifyError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: scoring_prompt(text),
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TextClassifyError::Api { status, body });
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TextClassifyError::InvalidResponse(e.to_string()))?;
        let reply_text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| TextClassifyError::InvalidResponse("empty candidate list".to_owned()))?;

        estimate_from_reply(&reply_text)
    }
}

impl TextClassifier for GeminiTextClassifier {
    fn classify(&self, text: String) -> BoxFuture<'_, Result<RawEstimate, TextClassifyError>> {
        async move {
            retry_with_backoff(
                &self.retry,
                || self.request_once(&text),
                TextClassifyError::is_retryable,
            )
            .await
        }
        .boxed()
    }
}

fn scoring_prompt(text: &str) -> String {
    let labels = LABEL_PRIORITY.map(|label| label.as_str()).join(", ");
    format!(
        "You are an emotion classifier. Given the user text below, output a single \
JSON object mapping the following emotions to numeric probabilities (0.0 to 1.0): \
{labels}. Return only valid JSON with no commentary.\n\nText:\n\"\"\"{text}\"\"\""
    )
}

/// Reduce the model's reply to the dominant label and its share of the
/// total probability mass. The label string is passed through verbatim;
/// canonicalization belongs to the estimate normalizer.
fn estimate_from_reply(reply: &str) -> Result<RawEstimate, TextClassifyError> {
    let json = extract_json_object(reply)
        .ok_or_else(|| TextClassifyError::InvalidResponse("no JSON object in reply".to_owned()))?;
    let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| TextClassifyError::InvalidResponse(e.to_string()))?;

    let mut scores: Vec<(String, f32)> = Vec::new();
    for (label, value) in parsed {
        if let Some(score) = numeric_value(&value) {
            if score.is_finite() && score > 0.0 {
                scores.push((label, score));
            }
        }
    }

    let total: f32 = scores.iter().map(|(_, score)| score).sum();
    let best = scores
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|_| total > 0.0);
    match best {
        Some((label, score)) => Ok(RawEstimate {
            emotion: Some(label),
            confidence: Some(score / total),
        }),
        None => Err(TextClassifyError::InvalidResponse(
            "no usable scores in reply".to_owned(),
        )),
    }
}

/// Models habitually wrap their JSON in fences or prose; keep only the
/// outermost object.
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end >= start).then(|| &reply[start..=end])
}

fn numeric_value(value: &serde_json::Value) -> Option<f32> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map(|v| v as f32),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.strip_suffix('%') {
                Some(percent) => percent.trim().parse::<f32>().ok().map(|v| v / 100.0),
                None => trimmed.parse::<f32>().ok(),
            }
        }
        _ => None,
    }
}
