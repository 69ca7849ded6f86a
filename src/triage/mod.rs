//! Guided triage flow.
//!
//! A three-stage linear state machine (`initial_input` →
//! `clarifying_questions` → `show_report`) driven by two completion calls:
//! one for self-examination questions and one for the doctor report.

pub mod flow;
pub mod prompts;
pub mod report;
pub mod session;
pub mod stage;
pub mod view;

pub use flow::{Transition, TriageFlow};
pub use prompts::{display_question, parse_questions, QuestionAnswer};
pub use report::{split_report, AlertLevel, SplitReport};
pub use session::{QuestionsOutcome, ReportOutcome, TriageSession};
pub use stage::Stage;
pub use view::TriageView;
