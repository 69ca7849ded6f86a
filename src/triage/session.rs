use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::stage::Stage;

/// Result of asking the completion service for questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum QuestionsOutcome {
    Generated(Vec<String>),
    Failed(String),
}

/// Result of asking the completion service for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// Raw, unsplit completion text.
    Completed(String),
    /// Human-readable failure reason.
    Failed(String),
}

/// Per-user triage state. A plain record; all transitions live in
/// [`super::TriageFlow`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageSession {
    pub stage: Stage,
    /// Patient currently chosen in the form. Kept across resets.
    pub selected_patient: Option<String>,
    pub patient_history: String,
    pub initial_symptoms: String,
    pub questions: Vec<String>,
    /// Answers keyed by question ordinal.
    pub answers: BTreeMap<usize, String>,
    pub report: Option<ReportOutcome>,
    /// Last recoverable failure to show the user.
    pub notice: Option<String>,
}

impl TriageSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to `initial_input` with every collected field cleared.
    pub(crate) fn clear(&mut self) {
        let selected_patient = self.selected_patient.take();
        *self = Self {
            selected_patient,
            ..Self::default()
        };
    }

    /// Answer for question `ordinal`, empty when never given.
    pub fn answer(&self, ordinal: usize) -> &str {
        self.answers.get(&ordinal).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_at_initial_input() {
        let session = TriageSession::new();
        assert_eq!(session.stage, Stage::InitialInput);
        assert!(session.questions.is_empty());
        assert!(session.report.is_none());
    }

    #[test]
    fn clear_keeps_only_selection() {
        let mut session = TriageSession {
            stage: Stage::ShowReport,
            selected_patient: Some("Aisha Khan".into()),
            patient_history: "Asthma".into(),
            initial_symptoms: "Cough".into(),
            questions: vec!["1. Breathe".into()],
            answers: BTreeMap::from([(0, "fine".into())]),
            report: Some(ReportOutcome::Completed("r".into())),
            notice: Some("n".into()),
        };
        session.clear();

        assert_eq!(
            session,
            TriageSession {
                selected_patient: Some("Aisha Khan".into()),
                ..TriageSession::default()
            }
        );
    }

    #[test]
    fn missing_answer_is_empty() {
        let mut session = TriageSession::new();
        session.answers.insert(1, "yes".into());
        assert_eq!(session.answer(0), "");
        assert_eq!(session.answer(1), "yes");
    }

    #[test]
    fn outcome_serializes_tagged() {
        let json = serde_json::to_value(ReportOutcome::Failed("down".into())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["value"], "down");
    }
}
