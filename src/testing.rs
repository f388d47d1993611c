//! Test doubles: a canned `Generator` and a sample document.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Activity, LearningSituation};
use crate::gemini::{GenerationError, GenerationRequest, Generator};

#[derive(Clone)]
pub enum StubReply {
  Document(LearningSituation),
  Empty,
  MissingKey,
  Malformed,
}

pub struct StubGenerator {
  reply: StubReply,
  calls: AtomicUsize,
  last: Mutex<Option<GenerationRequest>>,
}

impl StubGenerator {
  pub fn new(reply: StubReply) -> Self {
    Self { reply, calls: AtomicUsize::new(0), last: Mutex::new(None) }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn last_request(&self) -> Option<GenerationRequest> {
    self.last.lock().unwrap().clone()
  }
}

#[async_trait]
impl Generator for StubGenerator {
  async fn generate(&self, request: &GenerationRequest) -> Result<Option<LearningSituation>, GenerationError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    *self.last.lock().unwrap() = Some(request.clone());
    match &self.reply {
      StubReply::Document(doc) => Ok(Some(doc.clone())),
      StubReply::Empty => Ok(None),
      StubReply::MissingKey => Err(GenerationError::MissingApiKey),
      StubReply::Malformed => crate::gemini::parse_document("{\"title\": 3"),
    }
  }
}

pub fn sample_document() -> LearningSituation {
  LearningSituation {
    prog_unit_number: "2".into(),
    situation_number: "5".into(),
    title: "Repartimos la pizza".into(),
    stage_area: "Educación Primaria, 3º, Matemáticas".into(),
    links_other_areas: "Lengua Castellana".into(),
    description_goal: "El alumnado descubre las fracciones repartiendo alimentos.".into(),
    ods_challenges: "ODS 4, ODS 12".into(),
    timing_relation: "Segundo trimestre, 6 sesiones".into(),
    stage_objectives: vec!["Desarrollar competencias matemáticas básicas".into()],
    key_competencies_descriptors: vec!["STEM1".into(), "CCL1".into()],
    specific_competencies: vec!["CE1. Interpretar situaciones".into()],
    evaluation_criteria: vec!["1.1 Comprender problemas".into()],
    basic_knowledge: vec!["Fracciones propias".into(), "Equivalencia".into()],
    method: "Aprendizaje basado en problemas".into(),
    pedagogical_models: "Aprendizaje cooperativo".into(),
    techniques: "1-2-4".into(),
    didactic_strategies: "Apoyos visuales".into(),
    activities: vec![
      Activity {
        description: "Observamos una pizza".into(),
        sessions: "1 sesión".into(),
        grouping: "Gran grupo".into(),
        resources: "Pizza de cartón".into(),
        evaluable_products: "Dibujo".into(),
        eval_tools: "Observación".into(),
      },
      Activity {
        description: "Repartimos en partes iguales".into(),
        sessions: "2 sesiones".into(),
        grouping: "Parejas".into(),
        resources: "Tijeras".into(),
        evaluable_products: "Ficha".into(),
        eval_tools: "Lista de cotejo".into(),
      },
      Activity {
        description: "Inventamos problemas".into(),
        sessions: "2 sesiones".into(),
        grouping: "Pequeño grupo".into(),
        resources: "Cuaderno".into(),
        evaluable_products: "Problemas".into(),
        eval_tools: "Rúbrica".into(),
      },
    ],
    design_eval: "Adecuado al nivel".into(),
    implementation_eval: "Buena participación".into(),
    improvement_proposal: "Más material manipulativo".into(),
    bibliography: "Decreto Foral 67/2022".into(),
  }
}
