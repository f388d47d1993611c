//! WebSocket upgrade + session loop. Each connection owns one `Session`; client
//! messages become state-machine actions and every transition is answered with
//! a fresh render. Generations run in spawned tasks and report back through a
//! channel, so the socket stays responsive while the model is working.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::controller::{Action, Effect, Session};
use crate::export::MARKDOWN_MIME;
use crate::gemini::GenerationRequest;
use crate::logic::{generate_document, markdown_file};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::render::render_app;
use crate::state::AppState;

type Completions = mpsc::Sender<Action>;

enum Event {
  Client(Option<Result<Message, axum::Error>>),
  Finished(Action),
}

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "ikasnova_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state), fields(session_id = %Uuid::new_v4()))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "session", "WebSocket connected");
  let mut session = Session::new(state.default_language);
  let (done_tx, mut done_rx) = mpsc::channel::<Action>(4);

  if send(&mut socket, &render(&session)).await.is_err() {
    return;
  }

  'conn: loop {
    let event = tokio::select! {
      incoming = socket.recv() => Event::Client(incoming),
      Some(action) = done_rx.recv() => Event::Finished(action),
    };

    let replies = match event {
      Event::Client(Some(Ok(Message::Text(txt)))) => match serde_json::from_str::<ClientWsMessage>(&txt) {
        Ok(incoming) => {
          debug!(target: "session", "WS received: {:?}", &incoming);
          handle_client_ws(incoming, &mut session, &state, &done_tx)
        }
        Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
      },
      Event::Client(Some(Ok(Message::Ping(payload)))) => {
        let _ = socket.send(Message::Pong(payload)).await;
        continue;
      }
      Event::Client(Some(Ok(Message::Close(_)))) | Event::Client(None) => break,
      Event::Client(Some(Err(e))) => {
        warn!(target: "session", error = %e, "WS receive error");
        break;
      }
      Event::Client(Some(Ok(_))) => continue,
      Event::Finished(action) => dispatch(action, &mut session, &state, &done_tx),
    };

    for reply in &replies {
      if let Err(e) = send(&mut socket, reply).await {
        error!(target: "session", error = %e, "WS send error");
        break 'conn;
      }
    }
  }
  info!(target: "session", phase = session.phase.name(), "WebSocket disconnected");
}

/// Messages that never reach the state machine are answered here; the rest
/// are dispatched as actions.
fn handle_client_ws(
  msg: ClientWsMessage,
  session: &mut Session,
  state: &Arc<AppState>,
  completions: &Completions,
) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::ExportMarkdown => match session.document() {
      Some(doc) => {
        let file = markdown_file(doc, session.language);
        info!(target: "session", filename = %file.filename, "WS markdown export");
        vec![ServerWsMessage::Download {
          filename: file.filename,
          mime: MARKDOWN_MIME.to_string(),
          content: file.content,
        }]
      }
      None => vec![ServerWsMessage::Error { message: "No document to export".into() }],
    },

    ClientWsMessage::Edit { edit } => {
      let editing = session.is_editing();
      match session.apply(Action::Edit(edit)) {
        // Re-render so the client drops the value the server discarded.
        Some(Effect::EditRejected(e)) => vec![ServerWsMessage::Error { message: e.to_string() }, render(session)],
        _ if editing => vec![ServerWsMessage::Edited],
        _ => vec![render(session)],
      }
    }

    ClientWsMessage::PdfFinished { ok, message } => {
      if !ok {
        warn!(target: "session", message = message.as_deref().unwrap_or(""), "PDF rasterization failed in browser");
      }
      dispatch(Action::PdfExportFinished { ok }, session, state, completions)
    }

    other => match other.into_action() {
      Some(action) => dispatch(action, session, state, completions),
      None => Vec::new(),
    },
  }
}

/// Apply one action, start whatever effect it asks for, and render the result.
fn dispatch(
  action: Action,
  session: &mut Session,
  state: &Arc<AppState>,
  completions: &Completions,
) -> Vec<ServerWsMessage> {
  let before = session.phase.name();
  let effect = session.apply(action);
  debug!(target: "session", from = before, to = session.phase.name(), "Transition");

  let mut replies = vec![render(session)];
  match effect {
    Some(Effect::Generate { ticket, request }) => spawn_generation(state.clone(), ticket, request, completions.clone()),
    Some(Effect::RasterizePdf(job)) => {
      info!(target: "session", filename = %job.filename, "WS pdf job prepared");
      replies.push(ServerWsMessage::PdfJob { job });
    }
    Some(Effect::EditRejected(e)) => replies.insert(0, ServerWsMessage::Error { message: e.to_string() }),
    None => {}
  }
  replies
}

fn spawn_generation(state: Arc<AppState>, ticket: u64, request: GenerationRequest, completions: Completions) {
  tokio::spawn(async move {
    let result = generate_document(&state, &request).await;
    if completions.send(Action::GenerationFinished { ticket, result }).await.is_err() {
      debug!(target: "session", ticket, "Session closed before generation finished");
    }
  });
}

fn render(session: &Session) -> ServerWsMessage {
  ServerWsMessage::Render {
    html: render_app(session).into_string(),
    snapshot: session.snapshot(),
  }
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::controller::Phase;
  use crate::domain::{EducationalStage, Language, TextField};
  use crate::testing::{sample_document, StubGenerator, StubReply};

  fn setup(reply: StubReply) -> (Session, Arc<AppState>, Completions, mpsc::Receiver<Action>) {
    let state = Arc::new(AppState::with_generator(Arc::new(StubGenerator::new(reply)), Language::Es));
    let (tx, rx) = mpsc::channel(4);
    (Session::new(Language::Es), state, tx, rx)
  }

  fn client(session: &mut Session, state: &Arc<AppState>, tx: &Completions, json: &str) -> Vec<ServerWsMessage> {
    let msg: ClientWsMessage = serde_json::from_str(json).unwrap();
    handle_client_ws(msg, session, state, tx)
  }

  async fn generate(session: &mut Session, state: &Arc<AppState>, tx: &Completions, rx: &mut mpsc::Receiver<Action>) {
    client(session, state, tx, r#"{"type":"select_stage","stage":"Primaria"}"#);
    let replies = client(
      session,
      state,
      tx,
      r#"{"type":"submit","grade":"3º","subject":"Matemáticas","topic":"Fracciones"}"#,
    );
    assert!(matches!(replies.as_slice(), [ServerWsMessage::Render { snapshot, .. }] if snapshot.loading));
    let done = rx.recv().await.unwrap();
    dispatch(done, session, state, tx);
  }

  #[tokio::test]
  async fn generation_round_trip_reaches_view() {
    let (mut session, state, tx, mut rx) = setup(StubReply::Document(sample_document()));
    generate(&mut session, &state, &tx, &mut rx).await;
    assert!(matches!(session.phase, Phase::Viewing { stage: EducationalStage::Primaria, .. }));
    assert_eq!(session.document().map(|d| d.title.as_str()), Some("Repartimos la pizza"));
  }

  #[tokio::test]
  async fn generation_failure_sets_notice() {
    let (mut session, state, tx, mut rx) = setup(StubReply::MissingKey);
    generate(&mut session, &state, &tx, &mut rx).await;
    assert!(matches!(session.phase, Phase::AwaitingInput { .. }));
    assert_eq!(session.error_message(), Some(Language::Es.labels().err_connection));
  }

  #[tokio::test]
  async fn edits_are_acknowledged_without_render() {
    let (mut session, state, tx, mut rx) = setup(StubReply::Document(sample_document()));
    generate(&mut session, &state, &tx, &mut rx).await;
    client(&mut session, &state, &tx, r#"{"type":"toggle_edit"}"#);
    let replies = client(
      &mut session,
      &state,
      &tx,
      r#"{"type":"edit","edit":{"kind":"text","field":"title","value":"Nuevo"}}"#,
    );
    assert!(matches!(replies.as_slice(), [ServerWsMessage::Edited]));
    assert_eq!(session.document().map(|d| TextField::Title.get(d)), Some("Nuevo"));
  }

  #[tokio::test]
  async fn rejected_edit_is_reported_and_rerendered() {
    let (mut session, state, tx, mut rx) = setup(StubReply::Document(sample_document()));
    generate(&mut session, &state, &tx, &mut rx).await;
    client(&mut session, &state, &tx, r#"{"type":"toggle_edit"}"#);
    let replies = client(
      &mut session,
      &state,
      &tx,
      r#"{"type":"edit","edit":{"kind":"activity","index":99,"field":"sessions","value":"9"}}"#,
    );
    match replies.as_slice() {
      [ServerWsMessage::Error { message }, ServerWsMessage::Render { snapshot, .. }] => {
        assert!(message.contains("99"));
        assert!(snapshot.editing);
      }
      other => panic!("unexpected {other:?}"),
    }
    assert_eq!(session.document(), Some(&sample_document()));
  }

  #[tokio::test]
  async fn markdown_export_downloads_file() {
    let (mut session, state, tx, mut rx) = setup(StubReply::Document(sample_document()));
    let replies = client(&mut session, &state, &tx, r#"{"type":"export_markdown"}"#);
    assert!(matches!(replies.as_slice(), [ServerWsMessage::Error { .. }]));

    generate(&mut session, &state, &tx, &mut rx).await;
    let replies = client(&mut session, &state, &tx, r#"{"type":"export_markdown"}"#);
    match replies.as_slice() {
      [ServerWsMessage::Download { filename, content, .. }] => {
        assert_eq!(filename, "Ikasnova_SdA_5_es.md");
        assert!(content.starts_with("# Repartimos la pizza"));
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test]
  async fn pdf_export_renders_then_sends_job() {
    let (mut session, state, tx, mut rx) = setup(StubReply::Document(sample_document()));
    generate(&mut session, &state, &tx, &mut rx).await;
    let replies = client(&mut session, &state, &tx, r#"{"type":"export_pdf"}"#);
    assert!(matches!(
      replies.as_slice(),
      [ServerWsMessage::Render { snapshot, .. }, ServerWsMessage::PdfJob { .. }] if snapshot.downloading
    ));
    let replies = client(&mut session, &state, &tx, r#"{"type":"pdf_finished","ok":true}"#);
    assert!(matches!(replies.as_slice(), [ServerWsMessage::Render { snapshot, .. }] if !snapshot.downloading));
  }

  #[tokio::test]
  async fn ping_is_answered_with_pong() {
    let (mut session, state, tx, _rx) = setup(StubReply::Empty);
    assert!(matches!(client(&mut session, &state, &tx, r#"{"type":"ping"}"#).as_slice(), [ServerWsMessage::Pong]));
  }
}
