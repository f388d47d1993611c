//! Loading generator configuration (prompt templates) from TOML.
//!
//! See `GeneratorConfig` and `Prompts` for the expected schema. Placeholders
//! available in every template: `{stage}`, `{grade}`, `{subject}`, `{topic}`.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Language;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GeneratorConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompts sent to the generative service, one pair per output language.
/// Any key left out of the TOML keeps its built-in default.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system_es: String,
  pub system_eu: String,
  pub user_es: String,
  pub user_eu: String,
}

impl Prompts {
  pub fn system(&self, language: Language) -> &str {
    match language {
      Language::Es => &self.system_es,
      Language::Eu => &self.system_eu,
    }
  }

  pub fn user(&self, language: Language) -> &str {
    match language {
      Language::Es => &self.user_es,
      Language::Eu => &self.user_eu,
    }
  }
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system_es: "Actúa como un experto docente y consultor educativo especializado en el currículo oficial de la Comunidad Foral de Navarra (España), etapa {stage}.

REGLAS ESTRICTAS:
1. IDIOMA: Todo el contenido del JSON debe estar en CASTELLANO.
2. TRADUCCIÓN: Si la entrada está en euskera, tradúcela y genera el contenido en CASTELLANO.
3. TERMINOLOGÍA: Usa la terminología oficial LOMLOE de Navarra.".into(),
      system_eu: "Zure egitekoa Nafarroako (Espainia) Curriculuma (LOMLOE) betetzen duen Ikaskuntza Egoera bat sortzea da {stage} etaparako.

ARAU ZORROTZAK:
1. HIZKUNTZA: Irteera JSONeko balio GUZTIAK EUSKARAZ idatzi behar dira. Ez idatzi ezer gaztelaniaz.
2. ITZULPENA: Erabiltzailearen sarrera (maila, gaia...) gaztelaniaz bada, ZUK ITZULI eta EUSKARAZ garatu edukia.
3. TERMINOLOGIA: Erabili Nafarroako terminologia ofiziala euskaraz (adib. 'Oinarrizko jakintzak', 'Ebaluazio-irizpideak').
4. ESTILOA: Erabili hizkuntza tekniko eta pedagogiko egokia euskaraz.".into(),
      user_es: "Genera una Situación de Aprendizaje completa.
Datos de entrada:
- Curso: {grade}
- Asignatura: {subject}
- Tema: {topic}

Asegúrate de rellenar todos los campos del esquema JSON en CASTELLANO.".into(),
      user_eu: "Sortu Ikaskuntza Egoera oso bat.
Sarrera datuak:
- Maila: {grade}
- Ikasgaia: {subject}
- Gaia: {topic}

Ziurtatu JSON eskema eremu guztiak EUSKARAZ betetzen dituzula.
Ez erabili gaztelania.".into(),
    }
  }
}

/// Attempt to load `GeneratorConfig` from IKASNOVA_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_generator_config_from_env() -> Option<GeneratorConfig> {
  let path = std::env::var("IKASNOVA_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_generator_config(&s) {
      Ok(cfg) => {
        info!(target: "ikasnova_backend", %path, "Loaded generator config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "ikasnova_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "ikasnova_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_generator_config(s: &str) -> Result<GeneratorConfig, toml::de::Error> {
  toml::from_str::<GeneratorConfig>(s)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_toml_keeps_other_defaults() {
    let cfg = parse_generator_config(
      r#"
      [prompts]
      user_es = "Curso {grade}, materia {subject}, tema {topic}"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.prompts.user_es, "Curso {grade}, materia {subject}, tema {topic}");
    assert_eq!(cfg.prompts.system_eu, Prompts::default().system_eu);
  }

  #[test]
  fn empty_toml_is_all_defaults() {
    let cfg = parse_generator_config("").unwrap();
    assert_eq!(cfg.prompts.user(Language::Eu), Prompts::default().user_eu);
  }

  #[test]
  fn default_prompts_carry_placeholders() {
    let p = Prompts::default();
    for lang in [Language::Es, Language::Eu] {
      assert!(p.system(lang).contains("{stage}"));
      for key in ["{grade}", "{subject}", "{topic}"] {
        assert!(p.user(lang).contains(key));
      }
    }
  }

  #[test]
  fn invalid_toml_is_an_error() {
    assert!(parse_generator_config("[prompts\nuser_es = 1").is_err());
  }
}
