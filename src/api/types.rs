//! Shared types for the API layer.

use std::sync::Arc;

use serde::Serialize;

use crate::core_state::CoreState;
use crate::session_store::SessionInfo;
use crate::triage::{Transition, TriageView};

/// Shared context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Session metadata plus its current view.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionInfo,
    pub view: TriageView,
}

/// Result of a form action.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub transition: Transition,
    pub view: TriageView,
}

/// Longest symptom or answer text accepted from the form.
pub const MAX_TEXT_LEN: usize = 4000;
