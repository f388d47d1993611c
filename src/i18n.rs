//! Static localization table: every user-facing label, per language.

use serde::Serialize;

use crate::domain::{EducationalStage, Language};

#[derive(Debug, Serialize)]
pub struct StageLabels {
  #[serde(rename = "Infantil")]
  pub infantil: &'static str,
  #[serde(rename = "Primaria")]
  pub primaria: &'static str,
  #[serde(rename = "ESO")]
  pub eso: &'static str,
  #[serde(rename = "Bachillerato")]
  pub bachillerato: &'static str,
  #[serde(rename = "Formación Profesional")]
  pub formacion_profesional: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Labels {
  pub app_title: &'static str,
  pub footer_text: &'static str,
  pub nav_home: &'static str,
  pub nav_download: &'static str,
  pub nav_generating: &'static str,
  pub nav_markdown: &'static str,
  pub language_toggle: &'static str,

  // Stage selector
  pub select_stage_title: &'static str,
  pub select_stage_subtitle: &'static str,
  pub official_decree: &'static str,
  pub access_btn: &'static str,
  pub stage_labels: StageLabels,

  // Input form
  pub config_title: &'static str,
  pub selected_stage: &'static str,
  pub change_btn: &'static str,
  pub grade_label: &'static str,
  pub grade_placeholder: &'static str,
  pub subject_label: &'static str,
  pub subject_placeholder: &'static str,
  pub topic_label: &'static str,
  pub topic_placeholder: &'static str,
  pub generate_btn: &'static str,
  pub loading_btn: &'static str,

  // Document preview
  pub preview_title: &'static str,
  pub edit_mode_title: &'static str,
  pub edit_btn: &'static str,
  pub save_btn: &'static str,
  pub regenerate_btn: &'static str,
  pub doc_header_title: &'static str,
  pub prog_unit: &'static str,
  pub sa_number: &'static str,
  pub no_content: &'static str,
  pub list_placeholder: &'static str,

  // Sections
  pub sec1: &'static str,
  pub sec2: &'static str,
  pub sec3: &'static str,
  pub sec4: &'static str,
  pub sec5: &'static str,
  pub sec6: &'static str,

  // Fields
  pub field_title: &'static str,
  pub field_area: &'static str,
  pub field_timing: &'static str,
  pub field_goal: &'static str,
  pub field_links: &'static str,
  pub field_ods: &'static str,

  pub field_obj: &'static str,
  pub field_comp_key: &'static str,
  pub field_comp_spec: &'static str,
  pub field_crit_eval: &'static str,
  pub field_basic_know: &'static str,

  pub field_method: &'static str,
  pub field_models: &'static str,
  pub field_tech: &'static str,
  pub field_dua: &'static str,

  // Activity
  pub act_label: &'static str,
  pub act_desc: &'static str,
  pub act_grouping: &'static str,
  pub act_sessions: &'static str,
  pub act_res: &'static str,
  pub act_prod: &'static str,
  pub act_tools: &'static str,

  pub field_design_eval: &'static str,
  pub field_impl_eval: &'static str,
  pub field_improve: &'static str,

  pub watermark: &'static str,

  // Errors
  pub error_prefix: &'static str,
  pub dismiss: &'static str,
  pub err_connection: &'static str,
  pub err_empty: &'static str,
  pub err_malformed: &'static str,
  pub err_pdf: &'static str,
}

impl Labels {
  pub fn stage(&self, stage: EducationalStage) -> &'static str {
    match stage {
      EducationalStage::Infantil => self.stage_labels.infantil,
      EducationalStage::Primaria => self.stage_labels.primaria,
      EducationalStage::Eso => self.stage_labels.eso,
      EducationalStage::Bachillerato => self.stage_labels.bachillerato,
      EducationalStage::FormacionProfesional => self.stage_labels.formacion_profesional,
    }
  }
}

impl Language {
  pub fn labels(self) -> &'static Labels {
    match self {
      Language::Es => &ES,
      Language::Eu => &EU,
    }
  }
}

pub static ES: Labels = Labels {
  app_title: "Generador de Situaciones de Aprendizaje",
  footer_text: "Herramienta de apoyo docente ajustada a la normativa vigente de la Comunidad Foral de Navarra. Los contenidos generados deben ser revisados por el profesorado.",
  nav_home: "Inicio",
  nav_download: "Descargar PDF",
  nav_generating: "Generando PDF...",
  nav_markdown: "Descargar Markdown Editable",
  language_toggle: "Cambiar idioma",

  select_stage_title: "Selección de Etapa Educativa",
  select_stage_subtitle: "Seleccione la etapa para ajustar la Situación de Aprendizaje al Currículo Oficial de Navarra (LOMLOE)",
  official_decree: "Decreto Foral Navarra",
  access_btn: "Acceder",
  stage_labels: StageLabels {
    infantil: "Educación Infantil",
    primaria: "Educación Primaria",
    eso: "E.S.O.",
    bachillerato: "Bachillerato",
    formacion_profesional: "Formación Profesional",
  },

  config_title: "Configuración de la SdA",
  selected_stage: "Etapa seleccionada:",
  change_btn: "Cambiar",
  grade_label: "Curso / Nivel",
  grade_placeholder: "Ej: 3º Primaria",
  subject_label: "Área / Materia",
  subject_placeholder: "Ej: Matemáticas",
  topic_label: "Temática / Contexto / Interés",
  topic_placeholder: "Describe la temática central...",
  generate_btn: "Generar Documento Oficial",
  loading_btn: "Consultando Currículo Navarra...",

  preview_title: "Vista Previa del Documento",
  edit_mode_title: "Modo Edición",
  edit_btn: "Editar",
  save_btn: "Guardar",
  regenerate_btn: "Regenerar Versión",
  doc_header_title: "Comunidad Foral de Navarra",
  prog_unit: "Unidad de Programación Nº",
  sa_number: "SdA Nº",
  no_content: "Sin contenido",
  list_placeholder: "Escribe cada elemento en una nueva línea",

  sec1: "Datos identificativos",
  sec2: "Conexión con los elementos curriculares",
  sec3: "Metodología",
  sec4: "Secuenciación competencial de actividades",
  sec5: "Evaluación de la práctica docente",
  sec6: "Bibliografía y webgrafía",

  field_title: "Título de la Situación de Aprendizaje",
  field_area: "Etapa, área, materia o ámbito",
  field_timing: "Temporalización",
  field_goal: "Descripción y finalidad de los aprendizajes (Justificación)",
  field_links: "Vinculación con otras áreas (Interdisciplinariedad)",
  field_ods: "Conexión con ODS y retos s. XXI",

  field_obj: "Objetivos de etapa",
  field_comp_key: "Descriptores operativos de las competencias clave",
  field_comp_spec: "Competencias específicas",
  field_crit_eval: "Criterios de evaluación",
  field_basic_know: "Saberes básicos",

  field_method: "Método",
  field_models: "Modelos pedagógicos",
  field_tech: "Técnicas",
  field_dua: "Estrategias didácticas (DUA)",

  act_label: "Actividad",
  act_desc: "Descripción",
  act_grouping: "Agrupamiento",
  act_sessions: "Sesiones",
  act_res: "Recursos",
  act_prod: "Productos",
  act_tools: "Instrumentos Eval.",

  field_design_eval: "Evaluación del diseño",
  field_impl_eval: "Evaluación de la implementación",
  field_improve: "Propuesta de mejora",

  watermark: "Ajustado al Currículo Oficial de Navarra (LOMLOE)",

  error_prefix: "Error:",
  dismiss: "Cerrar",
  err_connection: "Error de conexión o clave API inválida.",
  err_empty: "No se pudo generar el contenido. Por favor intenta de nuevo.",
  err_malformed: "La respuesta del servicio no tiene un formato válido. Por favor intenta de nuevo.",
  err_pdf: "Error al generar PDF. Puede intentar usar la opción de impresión del navegador.",
};

pub static EU: Labels = Labels {
  app_title: "Ikaskuntza Egoeren Sortzailea",
  footer_text: "Nafarroako Foru Komunitateko indarreko araudira egokitutako irakasleentzako laguntza-tresna. Sortutako edukiak irakasleek berrikusi behar dituzte.",
  nav_home: "Hasiera",
  nav_download: "PDF Deskargatu",
  nav_generating: "PDF sortzen...",
  nav_markdown: "Markdown editagarria deskargatu",
  language_toggle: "Aldatu hizkuntza",

  select_stage_title: "Hezkuntza Etaparen Hautaketa",
  select_stage_subtitle: "Hautatu etapa Ikaskuntza Egoera Nafarroako Curriculum Ofizialera (LOMLOE) egokitzeko",
  official_decree: "Nafarroako Foru Dekretua",
  access_btn: "Sartu",
  stage_labels: StageLabels {
    infantil: "Haur Hezkuntza",
    primaria: "Lehen Hezkuntza",
    eso: "D.B.H.",
    bachillerato: "Batxilergoa",
    formacion_profesional: "Lanbide Heziketa",
  },

  config_title: "I.E.ren Konfigurazioa",
  selected_stage: "Hautatutako etapa:",
  change_btn: "Aldatu",
  grade_label: "Maila / Ikasturtea",
  grade_placeholder: "Adib: LH 3. maila",
  subject_label: "Arloa / Ikasgaia",
  subject_placeholder: "Adib: Matematika",
  topic_label: "Gaia / Testuingurua / Interesa",
  topic_placeholder: "Deskribatu gai nagusia...",
  generate_btn: "Dokumentu Ofiziala Sortu",
  loading_btn: "Nafarroako Curriculuma kontsultatzen...",

  preview_title: "Dokumentuaren Aurrebista",
  edit_mode_title: "Edizio Modua",
  edit_btn: "Editatu",
  save_btn: "Gorde",
  regenerate_btn: "Bertsioa Birsortu",
  doc_header_title: "Nafarroako Foru Komunitatea",
  prog_unit: "Programazio Unitatea Zk.",
  sa_number: "I.E. Zk.",
  no_content: "Edukirik ez",
  list_placeholder: "Idatzi elementu bakoitza lerro berri batean",

  sec1: "Identifikazio datuak",
  sec2: "Curriculum-elementuekiko lotura",
  sec3: "Metodologia",
  sec4: "Jardueren sekuentziazio konpetentziala",
  sec5: "Irakas-jardunaren ebaluazioa",
  sec6: "Bibliografia eta webgrafia",

  field_title: "Ikaskuntza Egoeraren Izenburua",
  field_area: "Etapa, arloa, irakasgaia edo eremua",
  field_timing: "Tenporalizazioa",
  field_goal: "Ikaskuntzen deskribapena eta helburua (Justifikazioa)",
  field_links: "Beste arlo batzuekiko lotura (Interdisziplinaritatea)",
  field_ods: "GJHekiko eta XXI. mendeko erronkekiko lotura",

  field_obj: "Etapako helburuak",
  field_comp_key: "Funtsezko konpetentzien deskriptore operatiboak",
  field_comp_spec: "Konpetentzia espezifikoak",
  field_crit_eval: "Ebaluazio-irizpideak",
  field_basic_know: "Oinarrizko jakintzak",

  field_method: "Metodoa",
  field_models: "Eredu pedagogikoak",
  field_tech: "Teknikak",
  field_dua: "Estrategia didaktikoak (IDU)",

  act_label: "Jarduera",
  act_desc: "Deskribapena",
  act_grouping: "Taldekatzea",
  act_sessions: "Saioak",
  act_res: "Baliabideak",
  act_prod: "Produktuak",
  act_tools: "Ebal. Tresnak",

  field_design_eval: "Diseinuaren ebaluazioa",
  field_impl_eval: "Inplementazioaren ebaluazioa",
  field_improve: "Hobekuntza-proposamena",

  watermark: "Nafarroako Curriculum Ofizialera egokitua (LOMLOE)",

  error_prefix: "Errorea:",
  dismiss: "Itxi",
  err_connection: "Konexio-errorea edo API gako baliogabea.",
  err_empty: "Ezin izan da edukia sortu. Saiatu berriro, mesedez.",
  err_malformed: "Zerbitzuaren erantzunak ez du formatu egokia. Saiatu berriro, mesedez.",
  err_pdf: "Errorea PDFa sortzean. Nabigatzailearen inprimatze-aukera erabil dezakezu.",
};

#[cfg(test)]
mod tests {
  use super::*;

  fn strings(labels: &Labels) -> Vec<String> {
    let value = serde_json::to_value(labels).unwrap();
    let mut out = Vec::new();
    collect(&value, &mut out);
    out
  }

  fn collect(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
      serde_json::Value::String(s) => out.push(s.clone()),
      serde_json::Value::Object(map) => map.values().for_each(|v| collect(v, out)),
      _ => {}
    }
  }

  #[test]
  fn no_label_is_empty() {
    for labels in [&ES, &EU] {
      assert!(strings(labels).iter().all(|s| !s.trim().is_empty()));
    }
  }

  #[test]
  fn both_tables_have_the_same_keys() {
    let es = serde_json::to_value(&ES).unwrap();
    let eu = serde_json::to_value(&EU).unwrap();
    let es_keys: Vec<_> = es.as_object().unwrap().keys().collect();
    let eu_keys: Vec<_> = eu.as_object().unwrap().keys().collect();
    assert_eq!(es_keys, eu_keys);
    assert_eq!(es["appTitle"], "Generador de Situaciones de Aprendizaje");
    assert_eq!(eu["stageLabels"]["Primaria"], "Lehen Hezkuntza");
  }

  #[test]
  fn stage_labels_follow_language() {
    assert_eq!(Language::Es.labels().stage(EducationalStage::Eso), "E.S.O.");
    assert_eq!(Language::Eu.labels().stage(EducationalStage::Eso), "D.B.H.");
  }
}
