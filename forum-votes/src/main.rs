//! Forum Votes Main Entry Point
//!
//! Serves the voting, reputation and forum endpoints over HTTP.

use dotenv::dotenv;
use forum_votes::config::LogFormat;
use forum_votes::{server, Dependencies, ServerError, Settings};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("forum_votes=info,forum_votes_engine=info,tower_http=info")
    });

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .try_init()
                .map_err(|e| ServerError::Tracing(e.to_string()))?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .try_init()
                .map_err(|e| ServerError::Tracing(e.to_string()))?;
        }
    }

    info!(
        service_name = "forum-votes",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Load environment variables from .env file
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format)?;

    info!("Starting Forum Votes service");

    let dependencies = match Dependencies::new(&settings).await {
        Ok(dependencies) => dependencies,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let app = server::create_app(&dependencies, &settings)?;
    if let Err(e) = server::run_server(app, settings.socket_addr()).await {
        error!(error = %e, "Server error");
        return Err(ServerError::Serve(e.to_string()));
    }
    Ok(())
}
