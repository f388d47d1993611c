//! Domain models: the Learning Situation document, its activities, the
//! educational stage and output language, and typed field accessors used by
//! the editor and the generation schema.

use serde::{Deserialize, Serialize};

/// Educational stage selected before generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EducationalStage {
  Infantil,
  Primaria,
  #[serde(rename = "ESO")]
  Eso,
  Bachillerato,
  #[serde(rename = "Formación Profesional")]
  FormacionProfesional,
}

impl EducationalStage {
  pub const ALL: [EducationalStage; 5] = [
    EducationalStage::Infantil,
    EducationalStage::Primaria,
    EducationalStage::Eso,
    EducationalStage::Bachillerato,
    EducationalStage::FormacionProfesional,
  ];

  /// Official stage name as used in prompts and on the wire.
  pub fn as_str(self) -> &'static str {
    match self {
      EducationalStage::Infantil => "Infantil",
      EducationalStage::Primaria => "Primaria",
      EducationalStage::Eso => "ESO",
      EducationalStage::Bachillerato => "Bachillerato",
      EducationalStage::FormacionProfesional => "Formación Profesional",
    }
  }
}

/// Output language of both the interface and the generated document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  Es,
  Eu,
}

impl Language {
  pub fn code(self) -> &'static str {
    match self {
      Language::Es => "es",
      Language::Eu => "eu",
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      Language::Es => Language::Eu,
      Language::Eu => Language::Es,
    }
  }

  pub fn from_code(code: &str) -> Option<Self> {
    match code.trim().to_ascii_lowercase().as_str() {
      "es" => Some(Language::Es),
      "eu" => Some(Language::Eu),
      _ => None,
    }
  }
}

/// One step of the pedagogical sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
  pub description: String,
  /// Free-form, e.g. "2 sesiones".
  pub sessions: String,
  pub grouping: String,
  pub resources: String,
  pub evaluable_products: String,
  pub eval_tools: String,
}

/// The generated document. Field names on the wire are camelCase and match the
/// keys of the generation schema.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningSituation {
  // Header
  pub prog_unit_number: String,
  pub situation_number: String,

  // 1. Identification data
  pub title: String,
  pub stage_area: String,
  pub links_other_areas: String,
  pub description_goal: String,
  pub ods_challenges: String,
  pub timing_relation: String,

  // 2. Curricular connections
  pub stage_objectives: Vec<String>,
  pub key_competencies_descriptors: Vec<String>,
  pub specific_competencies: Vec<String>,
  pub evaluation_criteria: Vec<String>,
  pub basic_knowledge: Vec<String>,

  // 3. Methodology
  pub method: String,
  pub pedagogical_models: String,
  pub techniques: String,
  pub didactic_strategies: String,

  // 4. Activity sequence
  pub activities: Vec<Activity>,

  // 5. Teaching-practice evaluation
  pub design_eval: String,
  pub implementation_eval: String,
  pub improvement_proposal: String,

  // 6. Bibliography
  pub bibliography: String,
}

/// Scalar text fields of [`LearningSituation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
  ProgUnitNumber,
  SituationNumber,
  Title,
  StageArea,
  LinksOtherAreas,
  DescriptionGoal,
  OdsChallenges,
  TimingRelation,
  Method,
  PedagogicalModels,
  Techniques,
  DidacticStrategies,
  DesignEval,
  ImplementationEval,
  ImprovementProposal,
  Bibliography,
}

impl TextField {
  pub const ALL: [TextField; 16] = [
    TextField::ProgUnitNumber,
    TextField::SituationNumber,
    TextField::Title,
    TextField::StageArea,
    TextField::LinksOtherAreas,
    TextField::DescriptionGoal,
    TextField::OdsChallenges,
    TextField::TimingRelation,
    TextField::Method,
    TextField::PedagogicalModels,
    TextField::Techniques,
    TextField::DidacticStrategies,
    TextField::DesignEval,
    TextField::ImplementationEval,
    TextField::ImprovementProposal,
    TextField::Bibliography,
  ];

  pub fn key(self) -> &'static str {
    match self {
      TextField::ProgUnitNumber => "progUnitNumber",
      TextField::SituationNumber => "situationNumber",
      TextField::Title => "title",
      TextField::StageArea => "stageArea",
      TextField::LinksOtherAreas => "linksOtherAreas",
      TextField::DescriptionGoal => "descriptionGoal",
      TextField::OdsChallenges => "odsChallenges",
      TextField::TimingRelation => "timingRelation",
      TextField::Method => "method",
      TextField::PedagogicalModels => "pedagogicalModels",
      TextField::Techniques => "techniques",
      TextField::DidacticStrategies => "didacticStrategies",
      TextField::DesignEval => "designEval",
      TextField::ImplementationEval => "implementationEval",
      TextField::ImprovementProposal => "improvementProposal",
      TextField::Bibliography => "bibliography",
    }
  }

  pub fn get(self, doc: &LearningSituation) -> &str {
    match self {
      TextField::ProgUnitNumber => &doc.prog_unit_number,
      TextField::SituationNumber => &doc.situation_number,
      TextField::Title => &doc.title,
      TextField::StageArea => &doc.stage_area,
      TextField::LinksOtherAreas => &doc.links_other_areas,
      TextField::DescriptionGoal => &doc.description_goal,
      TextField::OdsChallenges => &doc.ods_challenges,
      TextField::TimingRelation => &doc.timing_relation,
      TextField::Method => &doc.method,
      TextField::PedagogicalModels => &doc.pedagogical_models,
      TextField::Techniques => &doc.techniques,
      TextField::DidacticStrategies => &doc.didactic_strategies,
      TextField::DesignEval => &doc.design_eval,
      TextField::ImplementationEval => &doc.implementation_eval,
      TextField::ImprovementProposal => &doc.improvement_proposal,
      TextField::Bibliography => &doc.bibliography,
    }
  }

  fn slot(self, doc: &mut LearningSituation) -> &mut String {
    match self {
      TextField::ProgUnitNumber => &mut doc.prog_unit_number,
      TextField::SituationNumber => &mut doc.situation_number,
      TextField::Title => &mut doc.title,
      TextField::StageArea => &mut doc.stage_area,
      TextField::LinksOtherAreas => &mut doc.links_other_areas,
      TextField::DescriptionGoal => &mut doc.description_goal,
      TextField::OdsChallenges => &mut doc.ods_challenges,
      TextField::TimingRelation => &mut doc.timing_relation,
      TextField::Method => &mut doc.method,
      TextField::PedagogicalModels => &mut doc.pedagogical_models,
      TextField::Techniques => &mut doc.techniques,
      TextField::DidacticStrategies => &mut doc.didactic_strategies,
      TextField::DesignEval => &mut doc.design_eval,
      TextField::ImplementationEval => &mut doc.implementation_eval,
      TextField::ImprovementProposal => &mut doc.improvement_proposal,
      TextField::Bibliography => &mut doc.bibliography,
    }
  }
}

/// Ordered string-list fields of [`LearningSituation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListField {
  StageObjectives,
  KeyCompetenciesDescriptors,
  SpecificCompetencies,
  EvaluationCriteria,
  BasicKnowledge,
}

impl ListField {
  pub const ALL: [ListField; 5] = [
    ListField::StageObjectives,
    ListField::KeyCompetenciesDescriptors,
    ListField::SpecificCompetencies,
    ListField::EvaluationCriteria,
    ListField::BasicKnowledge,
  ];

  pub fn key(self) -> &'static str {
    match self {
      ListField::StageObjectives => "stageObjectives",
      ListField::KeyCompetenciesDescriptors => "keyCompetenciesDescriptors",
      ListField::SpecificCompetencies => "specificCompetencies",
      ListField::EvaluationCriteria => "evaluationCriteria",
      ListField::BasicKnowledge => "basicKnowledge",
    }
  }

  pub fn get(self, doc: &LearningSituation) -> &[String] {
    match self {
      ListField::StageObjectives => &doc.stage_objectives,
      ListField::KeyCompetenciesDescriptors => &doc.key_competencies_descriptors,
      ListField::SpecificCompetencies => &doc.specific_competencies,
      ListField::EvaluationCriteria => &doc.evaluation_criteria,
      ListField::BasicKnowledge => &doc.basic_knowledge,
    }
  }

  fn slot(self, doc: &mut LearningSituation) -> &mut Vec<String> {
    match self {
      ListField::StageObjectives => &mut doc.stage_objectives,
      ListField::KeyCompetenciesDescriptors => &mut doc.key_competencies_descriptors,
      ListField::SpecificCompetencies => &mut doc.specific_competencies,
      ListField::EvaluationCriteria => &mut doc.evaluation_criteria,
      ListField::BasicKnowledge => &mut doc.basic_knowledge,
    }
  }
}

/// Fields of one [`Activity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityField {
  Description,
  Sessions,
  Grouping,
  Resources,
  EvaluableProducts,
  EvalTools,
}

impl ActivityField {
  pub const ALL: [ActivityField; 6] = [
    ActivityField::Description,
    ActivityField::Sessions,
    ActivityField::Grouping,
    ActivityField::Resources,
    ActivityField::EvaluableProducts,
    ActivityField::EvalTools,
  ];

  pub fn key(self) -> &'static str {
    match self {
      ActivityField::Description => "description",
      ActivityField::Sessions => "sessions",
      ActivityField::Grouping => "grouping",
      ActivityField::Resources => "resources",
      ActivityField::EvaluableProducts => "evaluableProducts",
      ActivityField::EvalTools => "evalTools",
    }
  }

  pub fn get(self, activity: &Activity) -> &str {
    match self {
      ActivityField::Description => &activity.description,
      ActivityField::Sessions => &activity.sessions,
      ActivityField::Grouping => &activity.grouping,
      ActivityField::Resources => &activity.resources,
      ActivityField::EvaluableProducts => &activity.evaluable_products,
      ActivityField::EvalTools => &activity.eval_tools,
    }
  }

  fn slot(self, activity: &mut Activity) -> &mut String {
    match self {
      ActivityField::Description => &mut activity.description,
      ActivityField::Sessions => &mut activity.sessions,
      ActivityField::Grouping => &mut activity.grouping,
      ActivityField::Resources => &mut activity.resources,
      ActivityField::EvaluableProducts => &mut activity.evaluable_products,
      ActivityField::EvalTools => &mut activity.eval_tools,
    }
  }
}

/// A single field-level change made in edit mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentEdit {
  Text { field: TextField, value: String },
  /// `value` is the multi-line editor content; one line per element.
  List { field: ListField, value: String },
  Activity { index: usize, field: ActivityField, value: String },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
  #[error("activity index {index} out of range ({len} activities)")]
  ActivityOutOfRange { index: usize, len: usize },
}

impl DocumentEdit {
  /// Copy-on-write: returns a new document with only the touched field replaced.
  pub fn apply(&self, doc: &LearningSituation) -> Result<LearningSituation, EditError> {
    let mut next = doc.clone();
    match self {
      DocumentEdit::Text { field, value } => *field.slot(&mut next) = value.clone(),
      DocumentEdit::List { field, value } => *field.slot(&mut next) = split_lines(value),
      DocumentEdit::Activity { index, field, value } => {
        let len = next.activities.len();
        let activity = next
          .activities
          .get_mut(*index)
          .ok_or(EditError::ActivityOutOfRange { index: *index, len })?;
        *field.slot(activity) = value.clone();
      }
    }
    Ok(next)
  }
}

/// Editor text -> list. Empty lines become empty elements; `""` is the empty list.
pub fn split_lines(text: &str) -> Vec<String> {
  if text.is_empty() {
    return Vec::new();
  }
  text.split('\n').map(str::to_string).collect()
}

/// List -> editor text.
pub fn join_lines(items: &[String]) -> String {
  items.join("\n")
}
