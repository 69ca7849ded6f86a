//! Prompt templates for the two completion calls, and parsing of the
//! question list that comes back from the first one.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Leading "3." style ordinal on a generated question.
static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("static regex"));

/// One generated question paired with the user's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// Prompt asking for 3-4 numbered self-examination instructions.
///
/// History is only to be consulted when a current symptom clearly
/// continues a known condition.
pub fn clarifying_questions_prompt(patient_history: &str, current_symptoms: &str) -> String {
    format!(
        r#"You are a Medical AI Triage Assistant. Your primary goal is to create a set of guided self-examination questions for a patient based on their *current* symptoms.

**CRITICAL INSTRUCTION:** Your entire focus must be on the current symptoms: `{current_symptoms}`. **Do not** ask about the patient history (`{patient_history}`) unless a current symptom is a clear continuation of a known past condition. Create 3-4 simple, instructional questions.

**Patient History:** {patient_history}
Consider the history only if the symptoms match it; current symptoms are not always caused by past conditions.
**Initial Symptoms:** {current_symptoms}

**Instructions:**
- Example 1 (Pain): "Gently press on the upper right side of your stomach. Is the pain sharp or dull?"
- Example 2 (Breathing): "Take a deep breath. Does the pain in your chest get worse?"
- Example 3 (Dizziness): "From a sitting position, stand up slowly. Does the room feel like it's spinning?"
- Output only the questions, numbered. Do not add any conversational text or introductions.
"#
    )
}

/// Prompt asking for the two-part `[DOCTOR REPORT]` / `[PATIENT SUMMARY]`
/// reply separated by `---`.
pub fn doctor_report_prompt(
    patient_history: &str,
    current_symptoms: &str,
    answers: &[QuestionAnswer],
    doctors_table: &str,
) -> String {
    let qa_summary = answers
        .iter()
        .map(|qa| format!("- {} {}", qa.question, qa.answer))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert Medical AI. Your task is to perform a triage analysis and generate two separate summaries.
**CRITICAL INSTRUCTION: Prioritize the patient's current symptoms and their answers to the guided questions above all else.** Only use the patient's history for context if it is directly and obviously relevant. If the history is not relevant, you must ignore it.

**Available Doctors & Departments:**
{doctors_table}

**Patient Information:**
- History: {patient_history}
- Initial Symptoms: {current_symptoms}
- Guided Examination Answers:
{qa_summary}

**Your Task:**
Generate two distinct parts separated by a line containing only "---".

**Part 1: [DOCTOR REPORT]**
Generate a report with SIX sections.
1. Symptom Summary
2. Relevant History (if any)
3. Potential Diagnoses (Ranked)
4. Specialist Recommendation
5. Urgency Assessment (Low, Medium, High, or Critical)
6. Actionable Recommendation

---

**Part 2: [PATIENT SUMMARY]**
Generate a simple summary for the patient.
1. Acknowledge their information has been analyzed.
2. If urgency is "Critical", instruct them to seek immediate medical attention.
3. If not critical, you **must** recommend a specific doctor by name from the **Available Doctors** list. For example: "We recommend you see Dr. Kenji Tanaka (General Practitioner)."
"#
    )
}

/// Split a completion into questions: one per non-blank line, trimmed,
/// in order. The count is not validated.
pub fn parse_questions(completion: &str) -> Vec<String> {
    completion
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Question text without its leading ordinal, for form labels.
pub fn display_question(question: &str) -> String {
    ORDINAL_PREFIX.replace(question, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drops_blank_lines_and_keeps_order() {
        assert_eq!(parse_questions("1. Foo\n\n2. Bar\n"), vec!["1. Foo", "2. Bar"]);
    }

    #[test]
    fn parse_trims_and_handles_crlf() {
        assert_eq!(
            parse_questions("  1. Press here.  \r\n\r\n   \r\n2. Breathe in.\r\n"),
            vec!["1. Press here.", "2. Breathe in."]
        );
    }

    #[test]
    fn parse_keeps_any_number_of_lines() {
        assert_eq!(parse_questions("only one").len(), 1);
        assert_eq!(parse_questions("a\nb\nc\nd\ne\nf").len(), 6);
        assert!(parse_questions("\n \n").is_empty());
    }

    #[test]
    fn parse_is_idempotent_on_its_output() {
        let once = parse_questions("1. Foo\n\n2. Bar\n");
        let twice = parse_questions(&once.join("\n"));
        assert_eq!(once, twice);
    }

    #[test]
    fn display_strips_leading_ordinal() {
        assert_eq!(display_question("1. Take a deep breath."), "Take a deep breath.");
        assert_eq!(display_question("12.Stand up slowly."), "Stand up slowly.");
    }

    #[test]
    fn display_keeps_unnumbered_text() {
        assert_eq!(display_question("Is it sharp?"), "Is it sharp?");
        assert_eq!(display_question("Step 1. Press"), "Step 1. Press");
    }

    #[test]
    fn questions_prompt_embeds_inputs() {
        let prompt = clarifying_questions_prompt("Asthma since 2010", "Chest tightness");
        assert!(prompt.contains("**Patient History:** Asthma since 2010"));
        assert!(prompt.contains("**Initial Symptoms:** Chest tightness"));
        assert!(prompt.contains("3-4 simple, instructional questions"));
        assert!(prompt.contains("Output only the questions, numbered."));
    }

    #[test]
    fn questions_prompt_accepts_empty_history() {
        let prompt = clarifying_questions_prompt("", "Headache");
        assert!(prompt.contains("**Patient History:** \n"));
    }

    #[test]
    fn report_prompt_lists_answers_and_doctors() {
        let answers = vec![
            QuestionAnswer {
                question: "1. Does it hurt when you press?".into(),
                answer: "Yes, sharply".into(),
            },
            QuestionAnswer {
                question: "2. Any fever?".into(),
                answer: String::new(),
            },
        ];
        let prompt = doctor_report_prompt(
            "None",
            "Abdominal pain",
            &answers,
            "| name | specialty |\n|:-----|:----------|\n| Dr. A | GP |",
        );

        assert!(prompt.contains("- 1. Does it hurt when you press? Yes, sharply\n- 2. Any fever? \n"));
        assert!(prompt.contains("| Dr. A | GP |"));
        assert!(prompt.contains("- Initial Symptoms: Abdominal pain"));
        assert!(prompt.contains("[DOCTOR REPORT]"));
        assert!(prompt.contains("[PATIENT SUMMARY]"));
        assert!(prompt.contains("Low, Medium, High, or Critical"));
        assert!(prompt.contains("\n---\n"));
    }
}
