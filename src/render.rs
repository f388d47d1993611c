//! HTML rendering with maud.
//!
//! `render_document` draws the Learning Situation in view or edit mode and is a
//! pure function of (document, language, mode). Edit controls carry
//! `data-edit`/`data-field`/`data-index` attributes that the browser turns into
//! `DocumentEdit` messages; nothing here holds state.
//!
//! `render_static_document` wraps the view-mode document in a standalone page.
//! The PDF export consumes exactly that page, so it can never contain edit
//! controls. `render_app` draws the whole interface for one session.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Deserialize;

use crate::controller::{Phase, Session};
use crate::domain::{ActivityField, EducationalStage, Language, LearningSituation, ListField, TextField};
use crate::domain::{join_lines, Activity};
use crate::i18n::Labels;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  #[default]
  View,
  Edit,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListStyle {
  Bullet,
  Striped,
  Chips,
}

pub const DOCUMENT_CSS: &str = r#"
.sda { max-width: 210mm; margin: 0 auto 3rem; background: #fff; color: #1a1a1a; font-family: system-ui, sans-serif; }
.sda-frame { border: 4px solid #16324f; }
.sda-frame.editing { border-style: dashed; border-color: #2b6cb0; }
.sda-header { background: #16324f; color: #fff; padding: 1rem; display: flex; justify-content: space-between; align-items: center; text-transform: uppercase; letter-spacing: .1em; break-inside: avoid; }
.sda-header .region { color: #4fd1c5; font-size: .7rem; display: block; }
.sda-badge { background: #319795; padding: .4rem 1rem; font-weight: 700; }
.sda-section { background: #16324f; color: #fff; font-weight: 700; padding: .5rem; text-transform: uppercase; font-size: .85rem; margin-top: 1.2rem; break-after: avoid; }
.sda-section .num { background: #319795; padding: 0 .45rem; margin-right: .6rem; }
.sda-cell { padding: .9rem; border-bottom: 1px solid #d8e0e8; break-inside: avoid; }
.sda-grid { display: grid; grid-template-columns: 1fr 1fr; }
.sda-grid.wide { grid-template-columns: 2fr 1fr; }
.sda-label { font-weight: 700; font-size: .7rem; text-transform: uppercase; border-bottom: 2px solid #b2dfdb; margin-bottom: .4rem; padding-bottom: .2rem; }
.sda-text { white-space: pre-wrap; line-height: 1.5; font-size: .9rem; }
.sda-title { font-size: 1.5rem; font-weight: 700; text-transform: uppercase; color: #1f4e79; }
.sda-list { list-style: none; padding-left: 0; margin: 0; }
.sda-list li { position: relative; padding-left: 1rem; font-size: .9rem; margin-bottom: .4rem; }
.sda-list li::before { content: ""; position: absolute; left: 0; top: .45rem; width: .35rem; height: .35rem; background: #319795; border-radius: 50%; }
.sda-striped div { padding: .4rem; font-size: .8rem; border-bottom: 1px solid #d8e0e8; }
.sda-striped div:nth-child(even) { background: #f3f6f9; }
.sda-chip { display: inline-block; background: #d8e0e8; padding: .15rem .5rem; margin: 0 .3rem .3rem 0; font-size: .75rem; font-weight: 700; }
.sda-empty { color: #9aa5b1; font-style: italic; font-size: .75rem; }
.sda-activity { border-bottom: 1px solid #d8e0e8; break-inside: avoid; }
.sda-activity-head { background: #16324f; color: #fff; padding: .4rem 1rem; display: flex; justify-content: space-between; font-size: .75rem; font-weight: 700; text-transform: uppercase; }
.sda-activity-head .sessions { background: #fff; color: #16324f; padding: 0 .5rem; }
.sda-grouping { display: inline-block; background: #2b6cb0; color: #fff; padding: .15rem .6rem; font-size: .75rem; font-weight: 700; margin-top: .6rem; }
.sda-footer { background: #16324f; color: #fff; padding: .9rem; display: flex; justify-content: space-between; font-size: .75rem; break-inside: avoid; }
.sda textarea, .sda input { width: 100%; box-sizing: border-box; font: inherit; background: #f3f6f9; border: 0; border-bottom: 1px solid #2b6cb0; }
"#;

/// The document, in view or edit mode.
pub fn render_document(doc: &LearningSituation, language: Language, mode: Mode) -> Markup {
  let t = language.labels();
  let editing = mode == Mode::Edit;
  html! {
    article id="document-preview" class="sda" {
      div class=(if editing { "sda-frame editing" } else { "sda-frame" }) {
        div class="sda-header" {
          div {
            span class="region" { (t.doc_header_title) }
            span { (t.prog_unit) " " (inline_field(doc, TextField::ProgUnitNumber, mode)) }
          }
          div class="sda-badge" {
            (t.sa_number) " " (inline_field(doc, TextField::SituationNumber, mode))
          }
        }

        (section_title(1, t.sec1))
        div class="sda-cell" {
          (field_label(t.field_title))
          (text_field(doc, TextField::Title, mode, "sda-title"))
        }
        div class="sda-grid wide" {
          div class="sda-cell" { (field_label(t.field_area)) (text_field(doc, TextField::StageArea, mode, "")) }
          div class="sda-cell" { (field_label(t.field_timing)) (text_field(doc, TextField::TimingRelation, mode, "")) }
        }
        div class="sda-cell" {
          (field_label(t.field_goal))
          (text_field(doc, TextField::DescriptionGoal, mode, ""))
        }
        div class="sda-grid" {
          div class="sda-cell" { (field_label(t.field_links)) (text_field(doc, TextField::LinksOtherAreas, mode, "")) }
          div class="sda-cell" { (field_label(t.field_ods)) (text_field(doc, TextField::OdsChallenges, mode, "")) }
        }

        (section_title(2, t.sec2))
        div class="sda-cell" {
          (field_label(t.field_obj))
          (list_field(doc, ListField::StageObjectives, ListStyle::Bullet, mode, t))
        }
        div class="sda-cell" {
          (field_label(t.field_comp_key))
          (list_field(doc, ListField::KeyCompetenciesDescriptors, ListStyle::Chips, mode, t))
        }
        div class="sda-grid" {
          div class="sda-cell" {
            (field_label(t.field_comp_spec))
            (list_field(doc, ListField::SpecificCompetencies, ListStyle::Striped, mode, t))
          }
          div class="sda-cell" {
            (field_label(t.field_crit_eval))
            (list_field(doc, ListField::EvaluationCriteria, ListStyle::Striped, mode, t))
          }
        }
        div class="sda-cell" {
          (field_label(t.field_basic_know))
          (list_field(doc, ListField::BasicKnowledge, ListStyle::Bullet, mode, t))
        }

        (section_title(3, t.sec3))
        div class="sda-grid" {
          div class="sda-cell" { (field_label(t.field_method)) (text_field(doc, TextField::Method, mode, "")) }
          div class="sda-cell" { (field_label(t.field_models)) (text_field(doc, TextField::PedagogicalModels, mode, "")) }
          div class="sda-cell" { (field_label(t.field_tech)) (text_field(doc, TextField::Techniques, mode, "")) }
          div class="sda-cell" { (field_label(t.field_dua)) (text_field(doc, TextField::DidacticStrategies, mode, "")) }
        }

        (section_title(4, t.sec4))
        @for (index, activity) in doc.activities.iter().enumerate() {
          (activity_block(index, activity, mode, t))
        }

        (section_title(5, t.sec5))
        div class="sda-grid" {
          div class="sda-cell" { (field_label(t.field_design_eval)) (text_field(doc, TextField::DesignEval, mode, "")) }
          div class="sda-cell" { (field_label(t.field_impl_eval)) (text_field(doc, TextField::ImplementationEval, mode, "")) }
        }
        div class="sda-cell" {
          (field_label(t.field_improve))
          (text_field(doc, TextField::ImprovementProposal, mode, ""))
        }

        (section_title(6, t.sec6))
        div class="sda-cell" {
          (text_field(doc, TextField::Bibliography, mode, ""))
        }

        div class="sda-footer" {
          strong { "Ikasnova Generator" }
          span { (t.watermark) }
        }
      }
    }
  }
}

/// Standalone, print-ready page holding the view-mode document.
pub fn render_static_document(doc: &LearningSituation, language: Language) -> Markup {
  html! {
    (DOCTYPE)
    html lang=(language.code()) {
      head {
        meta charset="utf-8";
        title { (doc.title) }
        style { (PreEscaped(DOCUMENT_CSS)) }
      }
      body {
        (render_document(doc, language, Mode::View))
      }
    }
  }
}

fn section_title(number: u8, title: &str) -> Markup {
  html! {
    div class="sda-section" { span class="num" { (number) } (title) }
  }
}

fn field_label(text: &str) -> Markup {
  html! { div class="sda-label" { (text) } }
}

/// Short scalar shown inline (unit and situation numbers).
fn inline_field(doc: &LearningSituation, field: TextField, mode: Mode) -> Markup {
  let value = field.get(doc);
  html! {
    @if mode == Mode::Edit {
      input type="text" size="4" data-edit="text" data-field=(field.key()) value=(value);
    } @else {
      span { (value) }
    }
  }
}

fn text_field(doc: &LearningSituation, field: TextField, mode: Mode, class: &str) -> Markup {
  let value = field.get(doc);
  html! {
    @if mode == Mode::Edit {
      textarea class=(class) rows=(rows_for(value)) data-edit="text" data-field=(field.key()) {
        // The parser drops one newline right after <textarea>; keep the value's own.
        "\n" (value)
      }
    } @else {
      div class={ "sda-text " (class) } { (value) }
    }
  }
}

fn rows_for(value: &str) -> usize {
  if value.chars().count() > 100 || value.contains('\n') { 4 } else { 1 }
}

fn list_field(doc: &LearningSituation, field: ListField, style: ListStyle, mode: Mode, t: &Labels) -> Markup {
  let items = field.get(doc);
  html! {
    @if mode == Mode::Edit {
      textarea rows="6" data-edit="list" data-field=(field.key()) placeholder=(t.list_placeholder) {
        "\n" (join_lines(items))
      }
    } @else if items.is_empty() {
      span class="sda-empty" { (t.no_content) }
    } @else {
      @match style {
        ListStyle::Bullet => {
          ul class="sda-list" {
            @for item in items { li { (item) } }
          }
        }
        ListStyle::Striped => {
          div class="sda-striped" {
            @for item in items { div { (item) } }
          }
        }
        ListStyle::Chips => {
          div {
            @for item in items { span class="sda-chip" { (item) } }
          }
        }
      }
    }
  }
}

fn activity_field(index: usize, activity: &Activity, field: ActivityField, mode: Mode, rows: usize) -> Markup {
  let value = field.get(activity);
  html! {
    @if mode == Mode::Edit {
      @if rows <= 1 {
        input type="text" data-edit="activity" data-index=(index) data-field=(field.key()) value=(value);
      } @else {
        textarea rows=(rows) data-edit="activity" data-index=(index) data-field=(field.key()) {
          "\n" (value)
        }
      }
    } @else {
      div class="sda-text" { (value) }
    }
  }
}

fn activity_block(index: usize, activity: &Activity, mode: Mode, t: &Labels) -> Markup {
  let editing = mode == Mode::Edit;
  html! {
    div class="sda-activity" data-activity=(index) {
      div class="sda-activity-head" {
        span { (t.act_label) " " (index + 1) }
        @if editing {
          span { (activity_field(index, activity, ActivityField::Sessions, mode, 1)) }
        } @else {
          span class="sessions" title=(t.act_sessions) { (activity.sessions) }
        }
      }
      div class="sda-grid wide" {
        div class="sda-cell" {
          (field_label(t.act_desc))
          (activity_field(index, activity, ActivityField::Description, mode, 6))
          @if editing {
            div {
              strong { (t.act_grouping) ": " }
              (activity_field(index, activity, ActivityField::Grouping, mode, 1))
            }
          } @else if !activity.grouping.is_empty() {
            div {
              strong { (t.act_grouping) ": " }
              span class="sda-grouping" { (activity.grouping) }
            }
          }
        }
        div class="sda-cell" {
          (field_label(t.act_res))
          (activity_field(index, activity, ActivityField::Resources, mode, 2))
          (field_label(t.act_prod))
          (activity_field(index, activity, ActivityField::EvaluableProducts, mode, 2))
          (field_label(t.act_tools))
          (activity_field(index, activity, ActivityField::EvalTools, mode, 2))
        }
      }
    }
  }
}

// --- Application shell ---

/// Whole interface for one session: navigation, error banner, current step, footer.
pub fn render_app(session: &Session) -> Markup {
  let t = session.language.labels();
  html! {
    nav class="app-nav" {
      div class="brand" {
        strong { "IKASNOVA" }
        span { (t.app_title) }
      }
      div class="nav-actions" {
        button type="button" data-action="toggle_language" title=(t.language_toggle) {
          span class=(lang_class(session.language, Language::Es)) { "ES" }
          " | "
          span class=(lang_class(session.language, Language::Eu)) { "EU" }
        }
        @if session.document().is_some() {
          button type="button" data-action="toggle_edit" disabled[session.is_downloading()] {
            @if session.is_editing() { (t.save_btn) } @else { (t.edit_btn) }
          }
          button type="button" data-action="export_markdown" title=(t.nav_markdown) { "MD" }
          button type="button" data-action="export_pdf" disabled[session.is_downloading()] {
            @if session.is_downloading() { (t.nav_generating) } @else { (t.nav_download) }
          }
          button type="button" data-action="reset" title=(t.nav_home) { "←" }
        }
      }
    }

    main class="app-main" {
      @if let Some(message) = session.error_message() {
        div class="app-error" role="alert" {
          strong { (t.error_prefix) } " " span { (message) }
          button type="button" data-action="dismiss_error" title=(t.dismiss) { "×" }
        }
      }

      @match &session.phase {
        Phase::SelectingStage => { (stage_selector(t)) }
        Phase::AwaitingInput { stage } => { (input_form(session, *stage, false, t)) }
        Phase::Generating { stage, .. } => { (input_form(session, *stage, true, t)) }
        Phase::Viewing { document, .. } => { (document_screen(session, document, Mode::View, t)) }
        Phase::Editing { document, .. } => { (document_screen(session, document, Mode::Edit, t)) }
      }
    }

    footer class="app-footer" {
      strong { "Ikasnova GenAI" }
      p { (t.footer_text) }
    }
  }
}

fn lang_class(current: Language, this: Language) -> &'static str {
  if current == this { "lang active" } else { "lang" }
}

fn stage_selector(t: &Labels) -> Markup {
  html! {
    section class="stage-selector" {
      h1 { (t.select_stage_title) }
      p { (t.select_stage_subtitle) }
      div class="stage-grid" {
        @for stage in EducationalStage::ALL {
          button type="button" class="stage-card" data-action="select_stage" data-stage=(stage.as_str()) {
            strong { (t.stage(stage)) }
            small { (t.official_decree) }
            span class="cta" { (t.access_btn) }
          }
        }
      }
    }
  }
}

fn input_form(session: &Session, stage: EducationalStage, loading: bool, t: &Labels) -> Markup {
  let last = session.last_input.as_ref();
  let grade = last.map(|i| i.grade.as_str()).unwrap_or("");
  let subject = last.map(|i| i.subject.as_str()).unwrap_or("");
  let topic = last.map(|i| i.topic.as_str()).unwrap_or("");
  html! {
    section class="input-form" {
      h2 { (t.config_title) }
      p {
        (t.selected_stage) " " strong { (t.stage(stage)) }
        " "
        button type="button" data-action="reset" { (t.change_btn) }
      }
      form data-action="submit" {
        label {
          (t.grade_label)
          input type="text" name="grade" required value=(grade) placeholder=(t.grade_placeholder) disabled[loading];
        }
        label {
          (t.subject_label)
          input type="text" name="subject" required value=(subject) placeholder=(t.subject_placeholder) disabled[loading];
        }
        label {
          (t.topic_label)
          textarea name="topic" required rows="4" placeholder=(t.topic_placeholder) disabled[loading] { "\n" (topic) }
        }
        button type="submit" disabled[loading] {
          @if loading { (t.loading_btn) } @else { (t.generate_btn) }
        }
      }
      @if !loading && session.error_message().is_some() && session.last_input.is_some() {
        button type="button" data-action="retry" { (t.regenerate_btn) }
      }
    }
  }
}

fn document_screen(session: &Session, document: &LearningSituation, mode: Mode, t: &Labels) -> Markup {
  html! {
    div class="doc-toolbar" {
      h2 {
        @if mode == Mode::Edit { (t.edit_mode_title) } @else { (t.preview_title) }
      }
      @if mode == Mode::View && !session.is_downloading() {
        button type="button" data-action="retry" { (t.regenerate_btn) }
      }
    }
    (render_document(document, session.language, mode))
  }
}
