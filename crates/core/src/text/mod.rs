mod gemini;
mod keyword;

use crate::emotion::RawEstimate;
use futures::future::BoxFuture;

pub use gemini::GeminiTextClassifier;
pub use keyword::KeywordTextClassifier;

#[derive(thiserror::Error, Debug)]
pub enum TextClassifyError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("classifier api returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),
}

impl TextClassifyError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            TextClassifyError::Network(_) => true,
            TextClassifyError::Api { status, .. } => crate::util::is_http_retryable(*status),
            TextClassifyError::InvalidResponse(_) => false,
        }
    }
}

/// External estimator for the text channel. Implementations return the raw,
/// untrusted estimate shape; canonicalization belongs to the normalizer.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: String) -> BoxFuture<'_, Result<RawEstimate, TextClassifyError>>;
}

impl TextClassifier for Box<dyn TextClassifier> {
    fn classify(&self, text: String) -> BoxFuture<'_, Result<RawEstimate, TextClassifyError>> {
        (**self).classify(text)
    }
}
