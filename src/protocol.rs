//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::controller::{Action, LessonInput, Notice, Snapshot};
use crate::domain::{DocumentEdit, EducationalStage, Language, LearningSituation};
use crate::export::PdfJob;
use crate::render::Mode;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SelectStage {
        stage: EducationalStage,
    },
    Submit {
        grade: String,
        subject: String,
        topic: String,
    },
    Retry,
    ToggleEdit,
    Edit {
        edit: DocumentEdit,
    },
    DismissError,
    ToggleLanguage,
    SetLanguage {
        language: Language,
    },
    Reset,
    ExportMarkdown,
    ExportPdf,
    PdfFinished {
        ok: bool,
        #[serde(default)]
        message: Option<String>,
    },
}

impl ClientWsMessage {
    /// State-machine action carried by this message, if any.
    /// `Ping` and `ExportMarkdown` are answered without touching the session.
    pub fn into_action(self) -> Option<Action> {
        match self {
            ClientWsMessage::Ping | ClientWsMessage::ExportMarkdown => None,
            ClientWsMessage::SelectStage { stage } => Some(Action::SelectStage(stage)),
            ClientWsMessage::Submit { grade, subject, topic } => {
                Some(Action::Submit(LessonInput { grade, subject, topic }))
            }
            ClientWsMessage::Retry => Some(Action::Retry),
            ClientWsMessage::ToggleEdit => Some(Action::ToggleEdit),
            ClientWsMessage::Edit { edit } => Some(Action::Edit(edit)),
            ClientWsMessage::DismissError => Some(Action::DismissError),
            ClientWsMessage::ToggleLanguage => Some(Action::ToggleLanguage),
            ClientWsMessage::SetLanguage { language } => Some(Action::SetLanguage(language)),
            ClientWsMessage::Reset => Some(Action::Reset),
            ClientWsMessage::ExportPdf => Some(Action::StartPdfExport),
            ClientWsMessage::PdfFinished { ok, .. } => Some(Action::PdfExportFinished { ok }),
        }
    }
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    /// Full interface for the current session state.
    Render {
        html: String,
        snapshot: Snapshot,
    },
    /// An edit was applied; the client keeps its controls as they are.
    Edited,
    Download {
        filename: String,
        mime: String,
        content: String,
    },
    PdfJob {
        job: PdfJob,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct LabelsQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenderIn {
    pub document: LearningSituation,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub mode: Mode,
}

#[derive(Debug, Deserialize)]
pub struct ExportIn {
    pub document: LearningSituation,
    #[serde(default)]
    pub language: Language,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: Notice,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
