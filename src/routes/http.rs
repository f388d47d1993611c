//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::{header, StatusCode},
  response::{Html, IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::controller::Notice;
use crate::domain::{Language, LearningSituation};
use crate::export::{pdf_job, MARKDOWN_MIME};
use crate::gemini::{GenerationError, GenerationRequest};
use crate::logic::{generate_document, markdown_file};
use crate::protocol::*;
use crate::render::{render_document, DOCUMENT_CSS};
use crate::state::AppState;

/// Generation failure mapped to a status and a localized message.
pub struct ApiError {
  status: StatusCode,
  notice: Notice,
  language: Language,
}

impl ApiError {
  fn generation(e: &GenerationError, language: Language) -> Self {
    let status = match e {
      GenerationError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
      _ => StatusCode::BAD_GATEWAY,
    };
    Self { status, notice: Notice::from_error(e), language }
  }

  fn empty(language: Language) -> Self {
    Self { status: StatusCode::BAD_GATEWAY, notice: Notice::Empty, language }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = ErrorOut { error: self.notice, message: self.notice.message(self.language).to_string() };
    (self.status, Json(body)).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_labels(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LabelsQuery>,
) -> impl IntoResponse {
  let language = q.lang.as_deref().and_then(Language::from_code).unwrap_or(state.default_language);
  Json(language.labels())
}

pub async fn http_get_document_css() -> impl IntoResponse {
  ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], DOCUMENT_CSS)
}

#[instrument(level = "info", skip(state, body), fields(stage = body.stage.as_str(), language = body.language.code()))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerationRequest>,
) -> Result<Json<LearningSituation>, ApiError> {
  match generate_document(&state, &body).await {
    Ok(Some(doc)) => {
      info!(target: "generation", title = %doc.title, "HTTP generate served");
      Ok(Json(doc))
    }
    Ok(None) => Err(ApiError::empty(body.language)),
    Err(e) => Err(ApiError::generation(&e, body.language)),
  }
}

#[instrument(level = "info", skip(body), fields(language = body.language.code(), mode = ?body.mode))]
pub async fn http_post_render(Json(body): Json<RenderIn>) -> impl IntoResponse {
  Html(render_document(&body.document, body.language, body.mode).into_string())
}

#[instrument(level = "info", skip(body), fields(language = body.language.code()))]
pub async fn http_post_export_markdown(Json(body): Json<ExportIn>) -> impl IntoResponse {
  let file = markdown_file(&body.document, body.language);
  info!(target: "ikasnova_backend", filename = %file.filename, bytes = file.content.len(), "HTTP markdown export");
  (
    [
      (header::CONTENT_TYPE, MARKDOWN_MIME.to_string()),
      (header::CONTENT_DISPOSITION, attachment(&file.filename)),
    ],
    file.content,
  )
}

#[instrument(level = "info", skip(body), fields(language = body.language.code()))]
pub async fn http_post_export_pdf(Json(body): Json<ExportIn>) -> impl IntoResponse {
  let job = pdf_job(&body.document, body.language);
  info!(target: "ikasnova_backend", filename = %job.filename, "HTTP pdf job prepared");
  Json(job)
}

/// Header values only carry visible ASCII; anything else is dropped from the quoted name.
fn attachment(filename: &str) -> String {
  let safe: String = filename
    .chars()
    .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
    .collect();
  format!("attachment; filename=\"{}\"", safe)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn attachment_quotes_ascii_name() {
    assert_eq!(attachment("Ikasnova_SdA_5_es.md"), "attachment; filename=\"Ikasnova_SdA_5_es.md\"");
    assert_eq!(attachment("Ikasnova_SdA_nº5_eu.md"), "attachment; filename=\"Ikasnova_SdA_n5_eu.md\"");
  }
}
