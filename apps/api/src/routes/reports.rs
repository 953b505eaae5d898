//! Dynamic report endpoints: typed prompt, voice command, history.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::identity::UserId;
use crate::render::renderer_for;
use crate::state::AppState;
use crate::transcription::TranscriptionError;
use smartsales_core::report::{OutputFormat, ReportMetadata};
use smartsales_db::ReportHistoryEntry;

/// Carries the stored report id on every report response.
pub const REPORT_ID_HEADER: &str = "x-report-id";

/// Upper bound for an uploaded voice command.
const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports/text", post(text_report))
        .route(
            "/reports/voice",
            post(voice_report).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
        )
        .route("/reports/history", get(history))
}

#[derive(Debug, Deserialize)]
pub struct TextReportRequest {
    pub prompt: String,
    /// Overrides a format named in the prompt.
    #[serde(default, alias = "formato")]
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub reports: Vec<ReportHistoryEntry>,
}

async fn text_report(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(body): Json<TextReportRequest>,
) -> ApiResult<Response> {
    let format = parse_format(body.format.as_deref())?;
    run_report(&state, &user_id, &body.prompt, format).await
}

/// Multipart fields: `audio` (required), `format` (optional).
async fn voice_report(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let mut audio: Option<(Vec<u8>, Option<String>)> = None;
    let mut format: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let content_type = field.content_type().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Read error: {e}")))?;
                audio = Some((bytes.to_vec(), content_type));
            }
            "format" | "formato" => {
                format = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let (audio, content_type) = audio
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| ApiError::validation("audio file is required"))?;
    let format = parse_format(format.as_deref())?;

    let transcriber = state
        .transcriber
        .as_ref()
        .ok_or_else(|| TranscriptionError::Unavailable("no transcription service configured".to_string()))?;
    let text = transcriber.transcribe(audio, content_type.as_deref()).await?;
    info!(user_id = %user_id, text = %text, "Voice command transcribed");

    run_report(&state, &user_id, &text, format).await
}

async fn history(State(state): State<Arc<AppState>>, UserId(user_id): UserId) -> ApiResult<Json<HistoryResponse>> {
    let reports = state.reports.history(&user_id).await?;
    Ok(Json(HistoryResponse { reports }))
}

/// Blank means "not given".
fn parse_format(raw: Option<&str>) -> ApiResult<Option<OutputFormat>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(str::parse::<OutputFormat>)
        .transpose()
        .map_err(ApiError::from)
}

/// Generates, stores and renders one report.
async fn run_report(
    state: &AppState,
    user_id: &str,
    prompt: &str,
    format: Option<OutputFormat>,
) -> ApiResult<Response> {
    let outcome = state.reports.generate(user_id, prompt, format).await?;
    let report = &outcome.report;

    let meta = ReportMetadata::for_request(&outcome.request, report.created_at);
    let renderer = renderer_for(report.format);
    let body = renderer.render(&report.result, &meta)?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(renderer.content_type()));
    headers.insert(
        HeaderName::from_static(REPORT_ID_HEADER),
        HeaderValue::from_str(&report.id).map_err(|e| ApiError::internal(e.to_string()))?,
    );
    if report.format != OutputFormat::Json {
        let disposition = format!(
            "attachment; filename=\"report_{}.{}\"",
            report.id,
            renderer.file_extension()
        );
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition).map_err(|e| ApiError::internal(e.to_string()))?,
        );
    }

    Ok((StatusCode::OK, headers, body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format(None).unwrap(), None);
        assert_eq!(parse_format(Some("  ")).unwrap(), None);
        assert_eq!(parse_format(Some("pdf")).unwrap(), Some(OutputFormat::Pdf));
        assert_eq!(parse_format(Some("EXCEL")).unwrap(), Some(OutputFormat::Excel));
        assert!(parse_format(Some("csv")).is_err());
    }

    #[test]
    fn test_request_accepts_legacy_field_name() {
        let body: TextReportRequest = serde_json::from_str(r#"{"prompt":"ventas","formato":"PDF"}"#).unwrap();
        assert_eq!(body.format.as_deref(), Some("PDF"));
    }
}
