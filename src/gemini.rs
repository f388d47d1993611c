//! Minimal Gemini client for Learning Situation generation.
//!
//! We call `models/{model}:generateContent` once per request, asking for a JSON
//! object constrained by a response schema. The schema's field descriptions are
//! written in the target language, which steers the model towards fully
//! localized output on top of the system instruction.
//!
//! Calls are instrumented and log model name, latency, token usage and response
//! size (not contents). The API key is never logged.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{ActivityField, EducationalStage, Language, LearningSituation, ListField, TextField};
use crate::util::{fill_template, trunc_for_log};

/// Everything the user submits for one generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
  pub stage: EducationalStage,
  pub grade: String,
  pub subject: String,
  pub topic: String,
  #[serde(default)]
  pub language: Language,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
  #[error("GEMINI_API_KEY is not set")]
  MissingApiKey,
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("Gemini HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("malformed response: {0}")]
  MalformedResponse(#[from] serde_json::Error),
}

/// Produces a document for a request. `Ok(None)` means the service answered
/// without any text.
#[async_trait]
pub trait Generator: Send + Sync {
  async fn generate(&self, request: &GenerationRequest) -> Result<Option<LearningSituation>, GenerationError>;
}

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: Option<String>,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
  pub prompts: Prompts,
}

impl Gemini {
  /// Build the client from environment variables. A missing key is not an
  /// error here; it surfaces on the first generation attempt.
  pub fn from_env(prompts: Prompts) -> Result<Self, reqwest::Error> {
    let api_key = std::env::var("GEMINI_API_KEY")
      .or_else(|_| std::env::var("API_KEY"))
      .ok()
      .filter(|k| !k.trim().is_empty());
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into());
    let temperature = std::env::var("GEMINI_TEMPERATURE")
      .ok()
      .and_then(|t| t.parse::<f32>().ok())
      .unwrap_or(0.4);
    let timeout = std::env::var("GEMINI_TIMEOUT_SECS")
      .ok()
      .and_then(|t| t.parse::<u64>().ok())
      .unwrap_or(120);

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout))
      .build()?;

    Ok(Self { client, api_key, base_url, model, temperature, prompts })
  }

  pub fn has_api_key(&self) -> bool {
    self.api_key.is_some()
  }

  /// JSON-constrained generateContent call. Returns the concatenated candidate text.
  #[instrument(level = "info", skip(self, api_key, system, user, schema), fields(model = %self.model))]
  async fn generate_json_text(
    &self,
    api_key: &str,
    system: &str,
    user: &str,
    schema: Value,
  ) -> Result<String, GenerationError> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      contents: vec![Content { role: Some("user".into()), parts: vec![Part { text: user.into() }] }],
      system_instruction: Content { role: None, parts: vec![Part { text: system.into() }] },
      generation_config: GenerationConfig {
        response_mime_type: "application/json".into(),
        response_schema: schema,
        temperature: self.temperature,
      },
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "ikasnova-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("x-goog-api-key", api_key)
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_google_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(GenerationError::Http { status: status.as_u16(), message });
    }

    let body: GenerateContentResponse = res.json().await?;
    if let Some(usage) = &body.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, candidates_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }
    Ok(body.text())
  }
}

#[async_trait]
impl Generator for Gemini {
  #[instrument(
    level = "info",
    skip(self, request),
    fields(stage = request.stage.as_str(), language = request.language.code(), model = %self.model)
  )]
  async fn generate(&self, request: &GenerationRequest) -> Result<Option<LearningSituation>, GenerationError> {
    let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

    let system = system_instruction(&self.prompts, request);
    let user = user_prompt(&self.prompts, request);
    let schema = localized_schema(request.language);

    let start = Instant::now();
    let result = self.generate_json_text(api_key, &system, &user, schema).await;
    let elapsed = start.elapsed();

    let text = match result {
      Ok(t) => {
        info!(target: "generation", ?elapsed, response_len = t.len(), "Model response received");
        t
      }
      Err(e) => {
        error!(target: "generation", ?elapsed, error = %e, "Model call failed during generation");
        return Err(e);
      }
    };

    parse_document(&text)
  }
}

/// Parse the model's text into a document. Blank text is an empty result.
pub fn parse_document(text: &str) -> Result<Option<LearningSituation>, GenerationError> {
  if text.trim().is_empty() {
    return Ok(None);
  }
  let doc = serde_json::from_str::<LearningSituation>(text).map_err(|e| {
    error!(target: "generation", error = %e, preview = %trunc_for_log(text, 120), "Response is not a valid document");
    GenerationError::MalformedResponse(e)
  })?;
  info!(
    target: "generation",
    title = %trunc_for_log(&doc.title, 40),
    activities = doc.activities.len(),
    "Learning situation parsed"
  );
  Ok(Some(doc))
}

pub fn system_instruction(prompts: &Prompts, request: &GenerationRequest) -> String {
  fill_template(prompts.system(request.language), &[("stage", request.stage.as_str())])
}

pub fn user_prompt(prompts: &Prompts, request: &GenerationRequest) -> String {
  fill_template(
    prompts.user(request.language),
    &[
      ("stage", request.stage.as_str()),
      ("grade", request.grade.as_str()),
      ("subject", request.subject.as_str()),
      ("topic", request.topic.as_str()),
    ],
  )
}

// --- Schema ---

fn text_description(field: TextField, language: Language) -> &'static str {
  let eu = language == Language::Eu;
  match field {
    TextField::ProgUnitNumber => if eu { "Unitate zenbakia" } else { "Número de unidad" },
    TextField::SituationNumber => if eu { "I.E. zenbakia" } else { "Número de situación" },
    TextField::Title => if eu { "Izenburua EUSKARAZ" } else { "Título de la SdA" },
    TextField::StageArea => if eu { "Etapa, maila eta arloa EUSKARAZ" } else { "Etapa, curso y área" },
    TextField::LinksOtherAreas => if eu { "Beste arloekiko lotura EUSKARAZ" } else { "Vinculación con otras áreas" },
    TextField::DescriptionGoal => if eu { "Justifikazioa eta helburua EUSKARAZ" } else { "Descripción y finalidad" },
    TextField::OdsChallenges => if eu { "GJH eta erronkak EUSKARAZ" } else { "ODS y Retos s.XXI" },
    TextField::TimingRelation => if eu { "Tenporalizazioa" } else { "Temporalización" },
    TextField::Method => if eu { "Metodologia EUSKARAZ" } else { "Metodología" },
    TextField::PedagogicalModels => if eu { "Eredu pedagogikoak EUSKARAZ" } else { "Modelos pedagógicos" },
    TextField::Techniques => if eu { "Teknika didaktikoak EUSKARAZ" } else { "Técnicas didácticas" },
    TextField::DidacticStrategies => if eu { "Arreta aniztasunari (IDU) EUSKARAZ" } else { "Estrategias DUA" },
    TextField::DesignEval => if eu { "Diseinuaren ebaluazioa EUSKARAZ" } else { "Evaluación del diseño" },
    TextField::ImplementationEval => if eu { "Inplementazioaren ebaluazioa EUSKARAZ" } else { "Evaluación de la implementación" },
    TextField::ImprovementProposal => if eu { "Hobekuntza proposamena EUSKARAZ" } else { "Propuesta de mejora" },
    TextField::Bibliography => if eu { "Bibliografia" } else { "Bibliografía" },
  }
}

fn list_description(field: ListField, language: Language) -> &'static str {
  let eu = language == Language::Eu;
  match field {
    ListField::StageObjectives => if eu { "Nafarroako curriculumeko etapako helburuak EUSKARAZ" } else { "Objetivos de etapa del currículo de Navarra" },
    ListField::KeyCompetenciesDescriptors => if eu { "Funtsezko konpetentzien deskriptoreak (adib: CCL1)" } else { "Descriptores operativos (ej: CCL1)" },
    ListField::SpecificCompetencies => if eu { "Konpetentzia espezifikoak (Nafarroako dekretua) EUSKARAZ" } else { "Competencias específicas (Decreto Foral)" },
    ListField::EvaluationCriteria => if eu { "Ebaluazio-irizpide ofizialak EUSKARAZ" } else { "Criterios de evaluación oficiales" },
    ListField::BasicKnowledge => if eu { "Oinarrizko jakintzak (edukiak) EUSKARAZ" } else { "Saberes básicos (contenidos)" },
  }
}

fn activity_description(field: ActivityField, language: Language) -> &'static str {
  let eu = language == Language::Eu;
  match field {
    ActivityField::Description => if eu { "Jardueraren deskribapena EUSKARAZ" } else { "Descripción detallada de la actividad" },
    ActivityField::Sessions => if eu { "Saio kopurua" } else { "Número de sesiones" },
    ActivityField::Grouping => if eu { "Taldekatze mota (bakarka, binaka, talde txikia...)" } else { "Tipo de agrupamiento (individual, parejas, pequeño grupo...)" },
    ActivityField::Resources => if eu { "Beharrezko baliabideak EUSKARAZ" } else { "Recursos necesarios" },
    ActivityField::EvaluableProducts => if eu { "Produktu ebaluagarriak EUSKARAZ" } else { "Productos entregables" },
    ActivityField::EvalTools => if eu { "Ebaluazio tresnak EUSKARAZ" } else { "Instrumentos de evaluación" },
  }
}

/// Structured-output schema for one document, every property required.
/// Built from the typed field enums so it always matches `LearningSituation`.
pub fn localized_schema(language: Language) -> Value {
  let eu = language == Language::Eu;

  let mut activity_props = Map::new();
  for f in ActivityField::ALL {
    activity_props.insert(
      f.key().into(),
      json!({ "type": "STRING", "description": activity_description(f, language) }),
    );
  }
  let activity_required: Vec<&'static str> = ActivityField::ALL.iter().map(|f| f.key()).collect();
  let activity_schema = json!({
    "type": "OBJECT",
    "properties": activity_props,
    "required": activity_required,
  });

  let mut props = Map::new();
  let mut required: Vec<&'static str> = Vec::new();
  for f in TextField::ALL {
    props.insert(f.key().into(), json!({ "type": "STRING", "description": text_description(f, language) }));
    required.push(f.key());
  }
  for f in ListField::ALL {
    props.insert(
      f.key().into(),
      json!({ "type": "ARRAY", "items": { "type": "STRING" }, "description": list_description(f, language) }),
    );
    required.push(f.key());
  }
  let activities_description = if eu { "3-5 jarduerako sekuentzia EUSKARAZ" } else { "Secuencia de 3 a 5 actividades" };
  props.insert(
    "activities".into(),
    json!({ "type": "ARRAY", "items": activity_schema, "description": activities_description }),
  );
  required.push("activities");

  json!({ "type": "OBJECT", "properties": props, "required": required })
}

// --- Wire DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  contents: Vec<Content>,
  system_instruction: Content,
  generation_config: GenerationConfig,
}
#[derive(Serialize, Deserialize, Default)]
struct Content {
  #[serde(skip_serializing_if = "Option::is_none", default)]
  role: Option<String>,
  #[serde(default)]
  parts: Vec<Part>,
}
#[derive(Serialize, Deserialize)]
struct Part {
  #[serde(default)]
  text: String,
}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  response_mime_type: String,
  response_schema: Value,
  temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)] candidates: Vec<Candidate>,
  #[serde(default)] usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  #[serde(default)] content: Option<Content>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

impl GenerateContentResponse {
  /// Text of the first candidate, parts concatenated.
  fn text(&self) -> String {
    self.candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect::<String>())
      .unwrap_or_default()
  }
}

/// Try to extract a clean error message from a Google API error body.
fn extract_google_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
