//! Session state machine for one user of the generator.
//!
//! Phases: SelectingStage -> AwaitingInput -> Generating -> Viewing <-> Editing,
//! with an error notice layered on top and Reset available from anywhere.
//! "loading", "editing" and "downloading" are read off the phase, so states
//! such as editing while a PDF export is in flight cannot be built.
//!
//! `Session::apply` is the only mutation path. It returns the side effect the
//! caller must run (a generation request or a PDF job) or reports a rejected
//! edit; completions come back in as actions.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{DocumentEdit, EditError, EducationalStage, Language, LearningSituation};
use crate::export::{pdf_job, PdfJob};
use crate::gemini::{GenerationError, GenerationRequest};

/// Last submitted form values, kept for one-click regeneration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonInput {
  pub grade: String,
  pub subject: String,
  pub topic: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
  SelectingStage,
  AwaitingInput { stage: EducationalStage },
  /// `ticket` identifies the in-flight request; stale completions are dropped.
  Generating { stage: EducationalStage, ticket: u64 },
  Viewing { stage: EducationalStage, document: LearningSituation, exporting: bool },
  Editing { stage: EducationalStage, document: LearningSituation },
}

impl Phase {
  pub fn name(&self) -> &'static str {
    match self {
      Phase::SelectingStage => "selecting_stage",
      Phase::AwaitingInput { .. } => "awaiting_input",
      Phase::Generating { .. } => "generating",
      Phase::Viewing { .. } => "viewing",
      Phase::Editing { .. } => "editing",
    }
  }
}

/// What went wrong with the last generation, shown until dismissed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
  /// Missing credential, transport or HTTP failure.
  Connection,
  /// The service answered without text.
  Empty,
  /// The service answered with text that is not a document.
  Malformed,
}

impl Notice {
  pub fn from_error(e: &GenerationError) -> Self {
    match e {
      GenerationError::MissingApiKey | GenerationError::Transport(_) | GenerationError::Http { .. } => Notice::Connection,
      GenerationError::MalformedResponse(_) => Notice::Malformed,
    }
  }

  pub fn message(self, language: Language) -> &'static str {
    let t = language.labels();
    match self {
      Notice::Connection => t.err_connection,
      Notice::Empty => t.err_empty,
      Notice::Malformed => t.err_malformed,
    }
  }
}

#[derive(Debug)]
pub enum Action {
  SelectStage(EducationalStage),
  Submit(LessonInput),
  Retry,
  GenerationFinished { ticket: u64, result: Result<Option<LearningSituation>, GenerationError> },
  ToggleEdit,
  Edit(DocumentEdit),
  StartPdfExport,
  PdfExportFinished { ok: bool },
  DismissError,
  ToggleLanguage,
  SetLanguage(Language),
  Reset,
}

/// Work the caller must start after a transition.
#[derive(Debug)]
pub enum Effect {
  Generate { ticket: u64, request: GenerationRequest },
  RasterizePdf(PdfJob),
  /// The edit was not applied; the client still shows the discarded value.
  EditRejected(EditError),
}

#[derive(Clone, Debug)]
pub struct Session {
  pub phase: Phase,
  pub language: Language,
  pub notice: Option<Notice>,
  pub last_input: Option<LessonInput>,
  next_ticket: u64,
}

/// Serializable view of the session for clients and logs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
  pub phase: &'static str,
  pub stage: Option<EducationalStage>,
  pub language: Language,
  pub error: Option<&'static str>,
  pub last_input: Option<LessonInput>,
  pub has_document: bool,
  pub loading: bool,
  pub editing: bool,
  pub downloading: bool,
}

impl Session {
  pub fn new(language: Language) -> Self {
    Self { phase: Phase::SelectingStage, language, notice: None, last_input: None, next_ticket: 0 }
  }

  pub fn stage(&self) -> Option<EducationalStage> {
    match &self.phase {
      Phase::SelectingStage => None,
      Phase::AwaitingInput { stage }
      | Phase::Generating { stage, .. }
      | Phase::Viewing { stage, .. }
      | Phase::Editing { stage, .. } => Some(*stage),
    }
  }

  pub fn document(&self) -> Option<&LearningSituation> {
    match &self.phase {
      Phase::Viewing { document, .. } | Phase::Editing { document, .. } => Some(document),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.phase, Phase::Generating { .. })
  }

  pub fn is_editing(&self) -> bool {
    matches!(self.phase, Phase::Editing { .. })
  }

  pub fn is_downloading(&self) -> bool {
    matches!(self.phase, Phase::Viewing { exporting: true, .. })
  }

  /// Localized error text in the current language.
  pub fn error_message(&self) -> Option<&'static str> {
    self.notice.map(|n| n.message(self.language))
  }

  pub fn snapshot(&self) -> Snapshot {
    Snapshot {
      phase: self.phase.name(),
      stage: self.stage(),
      language: self.language,
      error: self.error_message(),
      last_input: self.last_input.clone(),
      has_document: self.document().is_some(),
      loading: self.is_loading(),
      editing: self.is_editing(),
      downloading: self.is_downloading(),
    }
  }

  fn start_generation(&mut self, stage: EducationalStage, input: LessonInput) -> Effect {
    self.next_ticket += 1;
    let ticket = self.next_ticket;
    self.notice = None;
    self.last_input = Some(input.clone());
    self.phase = Phase::Generating { stage, ticket };
    info!(target: "session", ticket, stage = stage.as_str(), language = self.language.code(), "Generation started");
    Effect::Generate {
      ticket,
      request: GenerationRequest {
        stage,
        grade: input.grade,
        subject: input.subject,
        topic: input.topic,
        language: self.language,
      },
    }
  }

  /// Apply one action. Actions that make no sense in the current phase are ignored.
  pub fn apply(&mut self, action: Action) -> Option<Effect> {
    let phase = std::mem::replace(&mut self.phase, Phase::SelectingStage);
    let (next, effect) = match (phase, action) {
      (_, Action::Reset) => {
        self.notice = None;
        self.last_input = None;
        info!(target: "session", "Session reset");
        (Phase::SelectingStage, None)
      }
      (phase, Action::DismissError) => {
        self.notice = None;
        (phase, None)
      }
      (phase, Action::ToggleLanguage) => {
        self.language = self.language.toggled();
        (phase, None)
      }
      (phase, Action::SetLanguage(language)) => {
        self.language = language;
        (phase, None)
      }

      (Phase::SelectingStage, Action::SelectStage(stage)) => (Phase::AwaitingInput { stage }, None),

      (Phase::AwaitingInput { stage }, Action::Submit(input)) => {
        let effect = self.start_generation(stage, input);
        return Some(effect);
      }
      (Phase::AwaitingInput { stage }, Action::Retry) | (Phase::Viewing { stage, exporting: false, .. }, Action::Retry) => {
        match self.last_input.clone() {
          Some(input) => return Some(self.start_generation(stage, input)),
          None => {
            debug!(target: "session", "Retry without a previous submission");
            (Phase::AwaitingInput { stage }, None)
          }
        }
      }

      (Phase::Generating { stage, ticket }, Action::GenerationFinished { ticket: done, result }) if ticket == done => {
        match result {
          Ok(Some(document)) => {
            info!(target: "session", ticket, activities = document.activities.len(), "Generation succeeded");
            (Phase::Viewing { stage, document, exporting: false }, None)
          }
          Ok(None) => {
            warn!(target: "session", ticket, "Generation returned no content");
            self.notice = Some(Notice::Empty);
            (Phase::AwaitingInput { stage }, None)
          }
          Err(e) => {
            warn!(target: "session", ticket, error = %e, "Generation failed");
            self.notice = Some(Notice::from_error(&e));
            (Phase::AwaitingInput { stage }, None)
          }
        }
      }

      (Phase::Viewing { stage, document, exporting: false }, Action::ToggleEdit) => (Phase::Editing { stage, document }, None),
      (Phase::Editing { stage, document }, Action::ToggleEdit) => (Phase::Viewing { stage, document, exporting: false }, None),

      (Phase::Editing { stage, document }, Action::Edit(edit)) => match edit.apply(&document) {
        Ok(edited) => (Phase::Editing { stage, document: edited }, None),
        Err(e) => {
          warn!(target: "session", error = %e, "Edit rejected");
          (Phase::Editing { stage, document }, Some(Effect::EditRejected(e)))
        }
      },

      (Phase::Viewing { stage, document, exporting: false }, Action::StartPdfExport)
      | (Phase::Editing { stage, document }, Action::StartPdfExport) => {
        let job = pdf_job(&document, self.language);
        info!(target: "session", filename = %job.filename, "PDF export started");
        (Phase::Viewing { stage, document, exporting: true }, Some(Effect::RasterizePdf(job)))
      }
      (Phase::Viewing { stage, document, exporting: true }, Action::PdfExportFinished { ok }) => {
        if ok {
          info!(target: "session", "PDF export finished");
        } else {
          warn!(target: "session", "PDF rasterization failed in the browser");
        }
        (Phase::Viewing { stage, document, exporting: false }, None)
      }

      (phase, action) => {
        debug!(target: "session", phase = phase.name(), ?action, "Action ignored in current phase");
        (phase, None)
      }
    };
    self.phase = next;
    effect
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Activity, ActivityField, TextField};

  fn input() -> LessonInput {
    LessonInput { grade: "3º Primaria".into(), subject: "Matemáticas".into(), topic: "Fracciones".into() }
  }

  fn document() -> LearningSituation {
    LearningSituation {
      situation_number: "1".into(),
      title: "Fracciones".into(),
      bibliography: "Decreto Foral 67/2022".into(),
      activities: (1..=4)
        .map(|i| Activity { description: format!("Actividad {i}"), sessions: "1".into(), ..Default::default() })
        .collect(),
      ..Default::default()
    }
  }

  fn ticket_of(effect: Option<Effect>) -> u64 {
    match effect {
      Some(Effect::Generate { ticket, .. }) => ticket,
      other => panic!("expected generation effect, got {other:?}"),
    }
  }

  fn viewing() -> Session {
    let mut s = Session::new(Language::Es);
    s.apply(Action::SelectStage(EducationalStage::Primaria));
    let ticket = ticket_of(s.apply(Action::Submit(input())));
    s.apply(Action::GenerationFinished { ticket, result: Ok(Some(document())) });
    s
  }

  #[test]
  fn happy_path_reaches_viewing() {
    let mut s = Session::new(Language::Es);
    assert_eq!(s.phase, Phase::SelectingStage);
    s.apply(Action::SelectStage(EducationalStage::Primaria));
    assert_eq!(s.phase, Phase::AwaitingInput { stage: EducationalStage::Primaria });

    let effect = s.apply(Action::Submit(input()));
    let Some(Effect::Generate { ticket, request }) = effect else { panic!("no generation effect") };
    assert!(s.is_loading());
    assert_eq!(request.grade, "3º Primaria");
    assert_eq!(request.language, Language::Es);
    assert_eq!(request.stage, EducationalStage::Primaria);

    s.apply(Action::GenerationFinished { ticket, result: Ok(Some(document())) });
    let doc = s.document().unwrap();
    assert!((3..=5).contains(&doc.activities.len()));
    assert!(!doc.bibliography.is_empty());
    assert!(!s.is_loading());
  }

  #[test]
  fn transport_failure_returns_to_input_with_retry_data() {
    let mut s = Session::new(Language::Es);
    s.apply(Action::SelectStage(EducationalStage::Primaria));
    let ticket = ticket_of(s.apply(Action::Submit(input())));
    s.apply(Action::GenerationFinished { ticket, result: Err(GenerationError::MissingApiKey) });

    assert_eq!(s.phase, Phase::AwaitingInput { stage: EducationalStage::Primaria });
    let message = s.error_message().unwrap();
    assert_eq!(message, "Error de conexión o clave API inválida.");
    assert_eq!(s.last_input, Some(input()));

    // One-click retry reuses the stored triple and clears the notice.
    let Some(Effect::Generate { request, .. }) = s.apply(Action::Retry) else { panic!("retry did not generate") };
    assert_eq!(request.topic, "Fracciones");
    assert!(s.notice.is_none());
  }

  #[test]
  fn empty_and_malformed_responses_have_distinct_notices() {
    let mut s = Session::new(Language::Eu);
    s.apply(Action::SelectStage(EducationalStage::Eso));
    let ticket = ticket_of(s.apply(Action::Submit(input())));
    s.apply(Action::GenerationFinished { ticket, result: Ok(None) });
    assert_eq!(s.notice, Some(Notice::Empty));
    assert_eq!(s.error_message(), Some(Language::Eu.labels().err_empty));

    let ticket = ticket_of(s.apply(Action::Retry));
    let parse_error = serde_json::from_str::<LearningSituation>("{").unwrap_err();
    s.apply(Action::GenerationFinished { ticket, result: Err(GenerationError::MalformedResponse(parse_error)) });
    assert_eq!(s.notice, Some(Notice::Malformed));
  }

  #[test]
  fn submit_clears_previous_error() {
    let mut s = Session::new(Language::Es);
    s.apply(Action::SelectStage(EducationalStage::Primaria));
    let ticket = ticket_of(s.apply(Action::Submit(input())));
    s.apply(Action::GenerationFinished { ticket, result: Ok(None) });
    assert!(s.notice.is_some());

    let other = LessonInput { topic: "Decimales".into(), ..input() };
    s.apply(Action::Submit(other.clone()));
    assert!(s.notice.is_none());
    assert!(s.document().is_none());
    assert_eq!(s.last_input, Some(other));
  }

  #[test]
  fn regenerate_discards_the_current_document() {
    let mut s = viewing();
    s.notice = Some(Notice::Connection);
    s.apply(Action::Retry);
    assert!(s.document().is_none());
    assert!(s.notice.is_none());
    assert!(s.is_loading());
  }

  #[test]
  fn submit_ignored_while_generating() {
    let mut s = Session::new(Language::Es);
    s.apply(Action::SelectStage(EducationalStage::Primaria));
    s.apply(Action::Submit(input()));
    assert!(s.apply(Action::Submit(input())).is_none());
    assert!(s.apply(Action::Retry).is_none());
  }

  #[test]
  fn toggling_edit_twice_leaves_document_unchanged() {
    let mut s = viewing();
    let before = s.document().cloned();
    s.apply(Action::ToggleEdit);
    assert!(s.is_editing());
    s.apply(Action::ToggleEdit);
    assert!(!s.is_editing());
    assert_eq!(s.document().cloned(), before);
  }

  #[test]
  fn edits_only_apply_in_edit_mode() {
    let mut s = viewing();
    let edit = DocumentEdit::Text { field: TextField::Title, value: "Otro".into() };
    s.apply(Action::Edit(edit.clone()));
    assert_eq!(s.document().unwrap().title, "Fracciones");

    s.apply(Action::ToggleEdit);
    s.apply(Action::Edit(edit));
    s.apply(Action::Edit(DocumentEdit::Activity { index: 2, field: ActivityField::Sessions, value: "3".into() }));
    let doc = s.document().unwrap();
    assert_eq!(doc.title, "Otro");
    assert_eq!(doc.activities[2].sessions, "3");
    assert_eq!(doc.activities[1].sessions, "1");
  }

  #[test]
  fn out_of_range_edit_is_reported_and_ignored() {
    let mut s = viewing();
    s.apply(Action::ToggleEdit);
    let effect = s.apply(Action::Edit(DocumentEdit::Activity {
      index: 99,
      field: ActivityField::Sessions,
      value: "9".into(),
    }));
    assert!(matches!(
      effect,
      Some(Effect::EditRejected(EditError::ActivityOutOfRange { index: 99, len: 4 }))
    ));
    assert!(s.is_editing());
    assert_eq!(s.document(), Some(&document()));
  }

  #[test]
  fn retry_is_unavailable_in_edit_mode() {
    let mut s = viewing();
    s.apply(Action::ToggleEdit);
    assert!(s.apply(Action::Retry).is_none());
    assert!(s.is_editing());
  }

  #[test]
  fn pdf_export_leaves_edit_mode_and_blocks_reentry() {
    let mut s = viewing();
    s.apply(Action::ToggleEdit);
    let effect = s.apply(Action::StartPdfExport);
    let Some(Effect::RasterizePdf(job)) = effect else { panic!("no pdf job") };
    assert_eq!(job.filename, "Ikasnova_SdA_1_es.pdf");
    assert!(!s.is_editing());
    assert!(s.is_downloading());

    assert!(s.apply(Action::StartPdfExport).is_none());
    s.apply(Action::ToggleEdit);
    assert!(!s.is_editing());

    s.apply(Action::PdfExportFinished { ok: false });
    assert!(!s.is_downloading());
    assert!(s.document().is_some());
  }

  #[test]
  fn reset_clears_everything_and_drops_stale_completion() {
    let mut s = Session::new(Language::Es);
    s.apply(Action::SelectStage(EducationalStage::Primaria));
    let ticket = ticket_of(s.apply(Action::Submit(input())));
    s.apply(Action::Reset);
    assert_eq!(s.phase, Phase::SelectingStage);
    assert!(s.last_input.is_none());

    s.apply(Action::GenerationFinished { ticket, result: Ok(Some(document())) });
    assert_eq!(s.phase, Phase::SelectingStage);
    assert!(s.document().is_none());
  }

  #[test]
  fn superseded_ticket_is_ignored() {
    let mut s = Session::new(Language::Es);
    s.apply(Action::SelectStage(EducationalStage::Primaria));
    let first = ticket_of(s.apply(Action::Submit(input())));
    s.apply(Action::Reset);
    s.apply(Action::SelectStage(EducationalStage::Primaria));
    let second = ticket_of(s.apply(Action::Submit(input())));
    assert_ne!(first, second);

    s.apply(Action::GenerationFinished { ticket: first, result: Ok(None) });
    assert!(s.is_loading());
    s.apply(Action::GenerationFinished { ticket: second, result: Ok(Some(document())) });
    assert!(s.document().is_some());
  }

  #[test]
  fn language_toggle_without_document_only_switches_labels() {
    let mut s = Session::new(Language::Es);
    assert!(s.apply(Action::ToggleLanguage).is_none());
    assert_eq!(s.language, Language::Eu);
    assert_eq!(s.phase, Phase::SelectingStage);
    s.notice = Some(Notice::Connection);
    assert_eq!(s.error_message(), Some("Konexio-errorea edo API gako baliogabea."));
  }

  #[test]
  fn snapshot_reports_derived_flags() {
    let mut s = viewing();
    s.apply(Action::StartPdfExport);
    let snap = serde_json::to_value(s.snapshot()).unwrap();
    assert_eq!(snap["phase"], "viewing");
    assert_eq!(snap["stage"], "Primaria");
    assert_eq!(snap["downloading"], true);
    assert_eq!(snap["editing"], false);
    assert_eq!(snap["lastInput"]["subject"], "Matemáticas");
  }
}
