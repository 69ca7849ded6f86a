use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of the guided triage flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Patient selection and free-text symptoms.
    #[default]
    InitialInput,
    /// Answering the generated self-examination questions.
    ClarifyingQuestions,
    /// Showing the split report.
    ShowReport,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialInput => "initial_input",
            Self::ClarifyingQuestions => "clarifying_questions",
            Self::ShowReport => "show_report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_is_initial_input() {
        assert_eq!(Stage::default(), Stage::InitialInput);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Stage::ClarifyingQuestions).unwrap(),
            "\"clarifying_questions\""
        );
        let parsed: Stage = serde_json::from_str("\"show_report\"").unwrap();
        assert_eq!(parsed, Stage::ShowReport);
    }

    #[test]
    fn display_matches_serde_name() {
        for stage in [Stage::InitialInput, Stage::ClarifyingQuestions, Stage::ShowReport] {
            assert_eq!(serde_json::to_string(&stage).unwrap(), format!("\"{stage}\""));
        }
    }
}
