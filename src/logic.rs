//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Running one generation through the configured generator
//!   - Building the Markdown download for a document

use tracing::{error, info, instrument, warn};

use crate::domain::{Language, LearningSituation};
use crate::export::{export_filename, to_markdown};
use crate::gemini::{GenerationError, GenerationRequest};
use crate::state::AppState;

/// A ready-to-download text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
  pub filename: String,
  pub content: String,
}

#[instrument(
  level = "info",
  skip(state, request),
  fields(stage = request.stage.as_str(), language = request.language.code(), topic_len = request.topic.len())
)]
pub async fn generate_document(
  state: &AppState,
  request: &GenerationRequest,
) -> Result<Option<LearningSituation>, GenerationError> {
  let result = state.generator.generate(request).await;
  match &result {
    Ok(Some(doc)) => info!(target: "generation", activities = doc.activities.len(), "Document generated"),
    Ok(None) => warn!(target: "generation", "Generator returned no content"),
    Err(e) => error!(target: "generation", error = %e, "Generation failed"),
  }
  result
}

pub fn markdown_file(doc: &LearningSituation, language: Language) -> TextFile {
  TextFile {
    filename: export_filename(doc, language, "md"),
    content: to_markdown(doc, language),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::domain::EducationalStage;
  use crate::testing::{sample_document, StubGenerator, StubReply};

  fn request() -> GenerationRequest {
    GenerationRequest {
      stage: EducationalStage::Primaria,
      grade: "3º Primaria".into(),
      subject: "Matemáticas".into(),
      topic: "Fracciones".into(),
      language: Language::Es,
    }
  }

  #[tokio::test]
  async fn forwards_request_to_generator() {
    let stub = Arc::new(StubGenerator::new(StubReply::Document(sample_document())));
    let state = AppState::with_generator(stub.clone(), Language::Es);
    let doc = generate_document(&state, &request()).await.unwrap().unwrap();
    assert!((3..=5).contains(&doc.activities.len()));
    assert!(!doc.bibliography.is_empty());
    assert_eq!(stub.calls(), 1);
    assert_eq!(stub.last_request(), Some(request()));
  }

  #[tokio::test]
  async fn propagates_errors() {
    let state = AppState::with_generator(Arc::new(StubGenerator::new(StubReply::MissingKey)), Language::Es);
    assert!(matches!(generate_document(&state, &request()).await, Err(GenerationError::MissingApiKey)));
  }

  #[test]
  fn markdown_file_is_named_after_situation() {
    let file = markdown_file(&sample_document(), Language::Eu);
    assert_eq!(file.filename, "Ikasnova_SdA_5_eu.md");
    assert!(file.content.starts_with("# "));
  }
}
