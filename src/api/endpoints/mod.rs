//! Endpoint handlers.
//!
//! Handlers that may call the completion service run the flow on the
//! blocking pool and render the view in the same critical section.

pub mod directory;
pub mod health;
pub mod page;
pub mod sessions;

use crate::api::error::ApiError;

/// Run blocking work (completion calls, session locks) off the runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
