//! Two-column view model for the form.
//!
//! Built from the session record on every request; the page re-renders
//! from this alone.

use pulldown_cmark::{html, Event, Parser, Tag, TagEnd};
use serde::Serialize;

use super::prompts::display_question;
use super::report::{AlertLevel, SplitReport};
use super::session::TriageSession;
use super::stage::Stage;
use crate::directory::Directory;

pub const RESULT_PLACEHOLDER: &str = "Your analysis and doctor recommendation will appear here.";

#[derive(Debug, Clone, Serialize)]
pub struct TriageView {
    pub stage: Stage,
    pub input: InputPanel,
    pub result: ResultPanel,
    /// Recoverable failure to show above the panels.
    pub notice: Option<String>,
}

/// Left column.
#[derive(Debug, Clone, Serialize)]
pub struct InputPanel {
    pub patients: Vec<String>,
    pub selected_patient: Option<String>,
    pub medical_history: Option<String>,
    /// Guided questions, present in `clarifying_questions` only.
    pub questions: Vec<QuestionField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionField {
    pub ordinal: usize,
    pub label: String,
    pub answer: String,
}

/// Right column.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultPanel {
    Pending { message: &'static str },
    Report(ReportPanel),
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportPanel {
    pub alert: AlertLevel,
    pub banner: &'static str,
    pub lead: &'static str,
    pub patient_summary: String,
    /// Shown in the collapsed "for medical staff" section.
    pub doctor_report: String,
    pub patient_summary_html: String,
    pub doctor_report_html: String,
    pub parsed: bool,
}

impl ReportPanel {
    fn from_split(split: SplitReport) -> Self {
        let alert = split.alert_level();
        let (banner, lead) = match alert {
            AlertLevel::Urgent => (
                "URGENT: CRITICAL HEALTH ALERT",
                "Based on your symptoms, the AI analysis indicates a critical situation.",
            ),
            AlertLevel::Normal => ("Analysis Complete", "Here is your recommendation:"),
        };
        Self {
            alert,
            banner,
            lead,
            patient_summary_html: markdown_html(&split.patient_summary),
            doctor_report_html: markdown_html(&split.doctor_report),
            patient_summary: split.patient_summary,
            doctor_report: split.doctor_report,
            parsed: split.parsed,
        }
    }
}

/// Render model markdown to HTML. Raw HTML in the source is emitted as
/// escaped text; links and images keep only their text.
pub fn markdown_html(markdown: &str) -> String {
    let events = Parser::new(markdown).filter_map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Link { .. } | Tag::Image { .. })
        | Event::End(TagEnd::Link | TagEnd::Image) => None,
        other => Some(other),
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

impl TriageView {
    pub fn render(session: &TriageSession, directory: &Directory) -> Self {
        let selected = session
            .selected_patient
            .as_deref()
            .and_then(|name| directory.patient(name))
            .or_else(|| directory.default_patient());

        let questions = if session.stage == Stage::ClarifyingQuestions {
            session
                .questions
                .iter()
                .enumerate()
                .map(|(ordinal, q)| QuestionField {
                    ordinal,
                    label: display_question(q),
                    answer: session.answer(ordinal).to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let result = match (&session.stage, &session.report) {
            (Stage::ShowReport, Some(outcome)) => {
                ResultPanel::Report(ReportPanel::from_split(SplitReport::from_outcome(outcome)))
            }
            _ => ResultPanel::Pending {
                message: RESULT_PLACEHOLDER,
            },
        };

        Self {
            stage: session.stage,
            input: InputPanel {
                patients: directory.patients().iter().map(|p| p.name.clone()).collect(),
                selected_patient: selected.map(|p| p.name.clone()),
                medical_history: selected.map(|p| p.medical_history.clone()),
                questions,
            },
            result,
            notice: session.notice.clone(),
        }
    }
}
