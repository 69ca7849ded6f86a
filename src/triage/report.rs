//! Splitting the report completion into its doctor and patient parts.

use serde::{Deserialize, Serialize};

use super::session::ReportOutcome;

pub const REPORT_SEPARATOR: &str = "---";
pub const DOCTOR_REPORT_TAG: &str = "[DOCTOR REPORT]";
pub const PATIENT_SUMMARY_TAG: &str = "[PATIENT SUMMARY]";

pub const DOCTOR_REPORT_PLACEHOLDER: &str =
    "Could not parse the AI's full report. The AI may be overloaded.";
pub const PATIENT_SUMMARY_PLACEHOLDER: &str =
    "There was an issue generating the patient summary. Please try again.";

/// Marker whose presence anywhere in the doctor report selects the urgent
/// rendering. Case-sensitive substring match, so negated phrasing such as
/// "not Critical" also matches.
const CRITICAL_MARKER: &str = "Critical";

/// The two display parts of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitReport {
    pub doctor_report: String,
    pub patient_summary: String,
    /// False when placeholders were substituted.
    pub parsed: bool,
}

impl SplitReport {
    fn placeholders() -> Self {
        Self {
            doctor_report: DOCTOR_REPORT_PLACEHOLDER.to_string(),
            patient_summary: PATIENT_SUMMARY_PLACEHOLDER.to_string(),
            parsed: false,
        }
    }

    /// Split a stored report outcome. A failed generation renders the same
    /// placeholders as an unparseable one.
    pub fn from_outcome(outcome: &ReportOutcome) -> Self {
        match outcome {
            ReportOutcome::Completed(raw) => split_report(raw),
            ReportOutcome::Failed(_) => Self::placeholders(),
        }
    }

    pub fn alert_level(&self) -> AlertLevel {
        AlertLevel::classify(&self.doctor_report)
    }
}

/// Split on the first `---`, strip the section tags, trim. Never fails:
/// a missing separator yields the fixed placeholders.
pub fn split_report(raw: &str) -> SplitReport {
    match raw.split_once(REPORT_SEPARATOR) {
        Some((doctor, patient)) => SplitReport {
            doctor_report: doctor.replace(DOCTOR_REPORT_TAG, "").trim().to_string(),
            patient_summary: patient.replace(PATIENT_SUMMARY_TAG, "").trim().to_string(),
            parsed: true,
        },
        None => {
            tracing::warn!(chars = raw.len(), "Report has no separator, using placeholders");
            SplitReport::placeholders()
        }
    }
}

/// Which banner the result panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Urgent,
    Normal,
}

impl AlertLevel {
    pub fn classify(doctor_report: &str) -> Self {
        if doctor_report.contains(CRITICAL_MARKER) {
            Self::Urgent
        } else {
            Self::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_strips_tags() {
        let split = split_report("[DOCTOR REPORT]\nX\n---\n[PATIENT SUMMARY]\nY");
        assert_eq!(split.doctor_report, "X");
        assert_eq!(split.patient_summary, "Y");
        assert!(split.parsed);
    }

    #[test]
    fn splits_on_first_separator_only() {
        let split = split_report("A\n---\nB\n---\nC");
        assert_eq!(split.doctor_report, "A");
        assert_eq!(split.patient_summary, "B\n---\nC");
    }

    #[test]
    fn markdown_bold_tags_leave_their_asterisks() {
        let split = split_report("**Part 1: [DOCTOR REPORT]**\nBody\n---\n**Part 2: [PATIENT SUMMARY]**\nSee Dr. A");
        assert_eq!(split.doctor_report, "**Part 1: **\nBody");
        assert_eq!(split.patient_summary, "**Part 2: **\nSee Dr. A");
    }

    #[test]
    fn missing_separator_yields_placeholders() {
        let split = split_report("[DOCTOR REPORT]\nOnly one part");
        assert_eq!(split.doctor_report, DOCTOR_REPORT_PLACEHOLDER);
        assert_eq!(split.patient_summary, PATIENT_SUMMARY_PLACEHOLDER);
        assert!(!split.parsed);
    }

    #[test]
    fn empty_report_yields_placeholders() {
        assert!(!split_report("").parsed);
    }

    #[test]
    fn failed_outcome_yields_placeholders() {
        let split = SplitReport::from_outcome(&ReportOutcome::Failed("timed out".into()));
        assert_eq!(split.doctor_report, DOCTOR_REPORT_PLACEHOLDER);
        assert_eq!(split.patient_summary, PATIENT_SUMMARY_PLACEHOLDER);
        assert_eq!(split.alert_level(), AlertLevel::Normal);
    }

    #[test]
    fn critical_anywhere_is_urgent() {
        assert_eq!(AlertLevel::classify("5. Urgency Assessment: Critical"), AlertLevel::Urgent);
        assert_eq!(AlertLevel::classify("Critical care may be needed"), AlertLevel::Urgent);
        // Substring match does not understand negation.
        assert_eq!(AlertLevel::classify("Not Critical at this time"), AlertLevel::Urgent);
    }

    #[test]
    fn high_without_critical_is_normal() {
        assert_eq!(AlertLevel::classify("Urgency Assessment: High"), AlertLevel::Normal);
    }

    #[test]
    fn critical_match_is_case_sensitive() {
        assert_eq!(AlertLevel::classify("no critical findings"), AlertLevel::Normal);
        assert_eq!(AlertLevel::classify("CRITICAL"), AlertLevel::Normal);
    }

    #[test]
    fn only_doctor_report_is_classified() {
        let split = split_report("Urgency: Medium\n---\nCritical wording in the summary");
        assert_eq!(split.alert_level(), AlertLevel::Normal);
    }
}
