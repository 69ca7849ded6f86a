use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match triagedesk_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}
