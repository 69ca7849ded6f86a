pub mod api;
pub mod completion;
pub mod config;
pub mod core_state;
pub mod directory;
pub mod session_store;
pub mod triage;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::completion::OpenAiCompatClient;
use crate::config::AppConfig;
use crate::core_state::CoreState;
use crate::directory::Directory;

/// Errors that stop the process before it serves anything.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Directory(#[from] directory::DirectoryError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Load configuration and data, then serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    init_tracing();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::load()?;
    tracing::info!(
        model = %config.completion.model,
        base_url = %config.completion.base_url,
        "Completion service configured"
    );

    let directory = Directory::load(&config.patients_path, &config.doctors_path)?;
    let client = Arc::new(OpenAiCompatClient::new(&config.completion));
    let core = Arc::new(CoreState::new(
        directory,
        client,
        Duration::from_secs(config.session_idle_secs),
    ));

    let mut server = api::start_server(core, config.bind).await?;
    tracing::info!("Open http://{} in a browser", server.addr);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C, serving until killed: {e}");
        std::future::pending::<()>().await;
    }
    server.shutdown();
    server.wait().await?;
    Ok(())
}
