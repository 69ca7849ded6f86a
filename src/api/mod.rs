//! HTTP surface for the triage form.
//!
//! `triage_router()` returns a composable `Router`: the form page at `/`
//! and JSON endpoints under `/api/`. Every request passes through the
//! access-log middleware.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::triage_router;
pub use server::{start_server, ServerError, TriageServer};
pub use types::ApiContext;
