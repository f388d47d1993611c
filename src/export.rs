//! Export functions: Markdown serialization, export filenames, and the job
//! handed to the browser-side PDF rasterizer.

use serde::Serialize;

use crate::domain::{Language, LearningSituation};
use crate::render::render_static_document;

pub const MARKDOWN_MIME: &str = "text/markdown; charset=utf-8";

/// `Ikasnova_SdA_{situationNumber}_{lang}.{ext}`, sanitized for the filesystem.
/// An empty situation number becomes `00`.
pub fn export_filename(doc: &LearningSituation, language: Language, ext: &str) -> String {
  let number = doc.situation_number.trim();
  let number = if number.is_empty() { "00" } else { number };
  sanitize_filename::sanitize(format!("Ikasnova_SdA_{}_{}.{}", number, language.code(), ext))
}

/// Deterministic Markdown rendering of the whole document with the labels of `language`.
pub fn to_markdown(doc: &LearningSituation, language: Language) -> String {
  let t = language.labels();
  let bullets = |items: &[String]| items.iter().map(|i| format!("- {}", i)).collect::<Vec<_>>().join("\n");

  let mut md = String::new();
  md.push_str(&format!("# {}\n\n", doc.title));
  md.push_str(&format!(
    "**{}:** {} | **{}:** {}\n\n---\n\n",
    t.prog_unit, doc.prog_unit_number, t.sa_number, doc.situation_number
  ));

  md.push_str(&format!("## 1. {}\n", t.sec1));
  md.push_str(&format!("* **{}:** {}\n", t.field_area, doc.stage_area));
  md.push_str(&format!("* **{}:** {}\n", t.field_timing, doc.timing_relation));
  md.push_str(&format!("* **{}:**\n{}\n\n", t.field_goal, doc.description_goal));
  md.push_str(&format!("* **{}:**\n{}\n\n", t.field_links, doc.links_other_areas));
  md.push_str(&format!("* **{}:**\n{}\n\n", t.field_ods, doc.ods_challenges));

  md.push_str(&format!("## 2. {}\n\n", t.sec2));
  md.push_str(&format!("### {}\n{}\n\n", t.field_obj, bullets(&doc.stage_objectives)));
  md.push_str(&format!("### {}\n{}\n\n", t.field_comp_key, doc.key_competencies_descriptors.join(", ")));
  md.push_str(&format!("### {}\n{}\n\n", t.field_comp_spec, bullets(&doc.specific_competencies)));
  md.push_str(&format!("### {}\n{}\n\n", t.field_crit_eval, bullets(&doc.evaluation_criteria)));
  md.push_str(&format!("### {}\n{}\n\n", t.field_basic_know, bullets(&doc.basic_knowledge)));

  md.push_str(&format!("## 3. {}\n", t.sec3));
  md.push_str(&format!("* **{}:** {}\n", t.field_method, doc.method));
  md.push_str(&format!("* **{}:** {}\n", t.field_models, doc.pedagogical_models));
  md.push_str(&format!("* **{}:** {}\n", t.field_tech, doc.techniques));
  md.push_str(&format!("* **{}:** {}\n\n", t.field_dua, doc.didactic_strategies));

  md.push_str(&format!("## 4. {}\n", t.sec4));
  for (i, act) in doc.activities.iter().enumerate() {
    md.push_str(&format!("\n### {} {} ({})\n", t.act_label, i + 1, act.sessions));
    md.push_str(&format!("* **{}:** {}\n", t.act_desc, act.description));
    md.push_str(&format!("* **{}:** {}\n", t.act_res, act.resources));
    md.push_str(&format!("* **{}:** {}\n", t.act_prod, act.evaluable_products));
    md.push_str(&format!("* **{}:** {}\n", t.act_tools, act.eval_tools));
  }
  md.push('\n');

  md.push_str(&format!("## 5. {}\n", t.sec5));
  md.push_str(&format!("* **{}:** {}\n", t.field_design_eval, doc.design_eval));
  md.push_str(&format!("* **{}:** {}\n", t.field_impl_eval, doc.implementation_eval));
  md.push_str(&format!("* **{}:** {}\n\n", t.field_improve, doc.improvement_proposal));

  md.push_str(&format!("## 6. {}\n{}\n\n", t.sec6, doc.bibliography));
  md.push_str(&format!("---\n*{}*\n", t.watermark));
  md
}

/// html2pdf options. Field names are the library's own.
#[derive(Clone, Debug, Serialize)]
pub struct PdfOptions {
  /// top, right, bottom, left in `jsPDF.unit`
  pub margin: [u32; 4],
  pub filename: String,
  pub image: ImageOptions,
  pub html2canvas: CanvasOptions,
  #[serde(rename = "jsPDF")]
  pub js_pdf: PageOptions,
  pub pagebreak: PageBreakOptions,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImageOptions {
  #[serde(rename = "type")]
  pub kind: &'static str,
  pub quality: f32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasOptions {
  pub scale: u32,
  #[serde(rename = "useCORS")]
  pub use_cors: bool,
  pub logging: bool,
  pub scroll_y: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PageOptions {
  pub unit: &'static str,
  pub format: &'static str,
  pub orientation: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct PageBreakOptions {
  pub mode: Vec<&'static str>,
}

impl PdfOptions {
  /// A4 portrait, 10 mm margins, 2x raster scale.
  pub fn a4(filename: String) -> Self {
    Self {
      margin: [10, 10, 10, 10],
      filename,
      image: ImageOptions { kind: "jpeg", quality: 0.98 },
      html2canvas: CanvasOptions { scale: 2, use_cors: true, logging: false, scroll_y: 0 },
      js_pdf: PageOptions { unit: "mm", format: "a4", orientation: "portrait" },
      pagebreak: PageBreakOptions { mode: vec!["css", "legacy"] },
    }
  }
}

/// Everything the browser needs to rasterize one document.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfJob {
  pub filename: String,
  /// Standalone view-mode document, never edit controls.
  pub html: String,
  pub options: PdfOptions,
  /// Localized alert text shown if rasterization throws.
  pub failure_message: String,
}

pub fn pdf_job(doc: &LearningSituation, language: Language) -> PdfJob {
  let filename = export_filename(doc, language, "pdf");
  PdfJob {
    html: render_static_document(doc, language).into_string(),
    options: PdfOptions::a4(filename.clone()),
    filename,
    failure_message: language.labels().err_pdf.to_string(),
  }
}
