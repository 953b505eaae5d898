//! # Audio Transcription
//!
//! Voice reports send the uploaded audio to a speech-to-text service and run
//! the returned text through the regular report pipeline.
//!
//! ```text
//! multipart "audio" ──► Transcriber::transcribe ──► text ──► ReportService
//!                              │
//!                              ├── Unrecognized (400)  speech not understood
//!                              └── Unavailable  (503)  service down / not configured
//! ```
//!
//! There is no fallback: a failed transcription fails the request.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The service answered but could not make out any speech.
    #[error("Could not understand the audio")]
    Unrecognized,

    /// The service could not be reached or failed.
    #[error("Transcription service unavailable: {0}")]
    Unavailable(String),
}

/// Speech-to-text collaborator.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, content_type: Option<&str>) -> Result<String, TranscriptionError>;
}

/// Response body of the transcription service.
#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Transcriber backed by an HTTP speech-to-text endpoint.
///
/// ## Protocol
/// `POST {url}?language={lang}` with the raw audio as body. A 2xx answer
/// carries `{"text": "..."}`; 422 or an empty text means nothing was
/// recognized.
#[derive(Debug, Clone)]
pub struct HttpTranscriber {
    client: reqwest::Client,
    url: String,
    language: String,
}

impl HttpTranscriber {
    pub fn new(url: impl Into<String>, language: impl Into<String>) -> Self {
        HttpTranscriber {
            client: reqwest::Client::new(),
            url: url.into(),
            language: language.into(),
        }
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: Vec<u8>, content_type: Option<&str>) -> Result<String, TranscriptionError> {
        debug!(bytes = audio.len(), language = %self.language, "Sending audio for transcription");

        let response = self
            .client
            .post(&self.url)
            .query(&[("language", self.language.as_str())])
            .header(
                reqwest::header::CONTENT_TYPE,
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(audio)
            .send()
            .await
            .map_err(|e| TranscriptionError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(TranscriptionError::Unrecognized);
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "Transcription service error");
            return Err(TranscriptionError::Unavailable(format!("status {status}")));
        }

        let body: TranscriptResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Unavailable(e.to_string()))?;

        match body.text.map(|t| t.trim().to_string()) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(TranscriptionError::Unrecognized),
        }
    }
}
