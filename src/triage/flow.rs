//! Stage transitions.
//!
//! `TriageFlow` borrows the shared collaborators (directory and completion
//! client) and exposes one handler per transition. Handlers take the
//! session record by `&mut` and return whether the stage moved. A handler
//! invoked from the wrong stage leaves the session untouched.

use std::collections::BTreeMap;

use serde::Serialize;

use super::prompts::{self, QuestionAnswer};
use super::session::{QuestionsOutcome, ReportOutcome, TriageSession};
use super::stage::Stage;
use crate::completion::CompletionClient;
use crate::directory::Directory;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("Unknown patient: {0}")]
    UnknownPatient(String),

    #[error("No patient selected")]
    NoPatientSelected,
}

/// What a handler did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "stage", rename_all = "snake_case")]
pub enum Transition {
    /// The stage moved; carries the new stage.
    Advanced(Stage),
    /// Not valid for the current stage (or guard failed); carries the
    /// unchanged stage.
    Ignored(Stage),
}

impl Transition {
    pub fn advanced(&self) -> bool {
        matches!(self, Self::Advanced(_))
    }
}

pub struct TriageFlow<'a> {
    client: &'a dyn CompletionClient,
    directory: &'a Directory,
}

impl<'a> TriageFlow<'a> {
    pub fn new(client: &'a dyn CompletionClient, directory: &'a Directory) -> Self {
        Self { client, directory }
    }

    // ── Transitions ─────────────────────────────────────────

    /// Change the patient shown in the form. Allowed in every stage; the
    /// history already captured for a running triage is not touched.
    pub fn select_patient(
        &self,
        session: &mut TriageSession,
        patient_name: &str,
    ) -> Result<(), FlowError> {
        let patient = self
            .directory
            .patient(patient_name)
            .ok_or_else(|| FlowError::UnknownPatient(patient_name.to_string()))?;
        session.selected_patient = Some(patient.name.clone());
        Ok(())
    }

    /// `initial_input → clarifying_questions`.
    ///
    /// Blank symptoms are a no-op. A failed question request still
    /// advances, with no questions and the failure kept as the notice.
    pub fn start_examination(
        &self,
        session: &mut TriageSession,
        patient_name: Option<&str>,
        symptoms: &str,
    ) -> Result<Transition, FlowError> {
        if session.stage != Stage::InitialInput || symptoms.trim().is_empty() {
            return Ok(Transition::Ignored(session.stage));
        }

        let name = patient_name
            .map(str::to_string)
            .or_else(|| session.selected_patient.clone())
            .or_else(|| self.directory.default_patient().map(|p| p.name.clone()))
            .ok_or(FlowError::NoPatientSelected)?;
        let patient = self
            .directory
            .patient(&name)
            .ok_or(FlowError::UnknownPatient(name))?;

        session.selected_patient = Some(patient.name.clone());
        session.patient_history = patient.medical_history.clone();
        session.initial_symptoms = symptoms.to_string();

        match self.generate_questions(&session.patient_history, &session.initial_symptoms) {
            QuestionsOutcome::Generated(questions) => {
                session.questions = questions;
                session.notice = None;
            }
            QuestionsOutcome::Failed(reason) => {
                session.questions = Vec::new();
                session.notice = Some(reason);
            }
        }
        session.answers.clear();
        session.stage = Stage::ClarifyingQuestions;

        tracing::info!(
            questions = session.questions.len(),
            degraded = session.notice.is_some(),
            "Triage advanced to clarifying questions"
        );
        Ok(Transition::Advanced(session.stage))
    }

    /// `clarifying_questions → show_report`. Unanswered questions are sent
    /// with an empty answer.
    pub fn analyze_case(
        &self,
        session: &mut TriageSession,
        answers: BTreeMap<usize, String>,
    ) -> Transition {
        if session.stage != Stage::ClarifyingQuestions {
            return Transition::Ignored(session.stage);
        }

        let question_count = session.questions.len();
        session.answers = answers
            .into_iter()
            .filter(|(ordinal, _)| *ordinal < question_count)
            .collect();

        let pairs: Vec<QuestionAnswer> = session
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| QuestionAnswer {
                question: q.clone(),
                answer: session.answer(i).to_string(),
            })
            .collect();

        let outcome =
            self.generate_report(&session.patient_history, &session.initial_symptoms, &pairs);
        session.notice = match &outcome {
            ReportOutcome::Failed(reason) => Some(reason.clone()),
            ReportOutcome::Completed(_) => None,
        };
        session.report = Some(outcome);
        session.stage = Stage::ShowReport;

        tracing::info!(
            answered = pairs.iter().filter(|p| !p.answer.trim().is_empty()).count(),
            total = pairs.len(),
            degraded = session.notice.is_some(),
            "Triage advanced to report"
        );
        Transition::Advanced(session.stage)
    }

    /// `show_report → initial_input` ("Start New Triage").
    pub fn reset(session: &mut TriageSession) -> Transition {
        if session.stage != Stage::ShowReport {
            return Transition::Ignored(session.stage);
        }
        session.clear();
        tracing::info!("Triage reset");
        Transition::Advanced(session.stage)
    }

    // ── Completion calls ────────────────────────────────────

    pub fn generate_questions(&self, patient_history: &str, symptoms: &str) -> QuestionsOutcome {
        let prompt = prompts::clarifying_questions_prompt(patient_history, symptoms);
        match self.client.complete(&prompt) {
            Ok(text) => QuestionsOutcome::Generated(prompts::parse_questions(&text)),
            Err(e) => {
                tracing::warn!(model = self.client.model(), error = %e, "Question generation failed");
                QuestionsOutcome::Failed(format!(
                    "An error occurred while generating questions: {e}"
                ))
            }
        }
    }

    pub fn generate_report(
        &self,
        patient_history: &str,
        symptoms: &str,
        answers: &[QuestionAnswer],
    ) -> ReportOutcome {
        let prompt = prompts::doctor_report_prompt(
            patient_history,
            symptoms,
            answers,
            self.directory.doctors_markdown(),
        );
        match self.client.complete(&prompt) {
            Ok(text) => ReportOutcome::Completed(text),
            Err(e) => {
                tracing::warn!(model = self.client.model(), error = %e, "Report generation failed");
                ReportOutcome::Failed(format!("An error occurred: {e}"))
            }
        }
    }
}
