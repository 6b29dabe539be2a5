use fmdata_extractor::cli::Runner;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// User-facing errors (bad configuration, rejected credentials) exit
/// with 1; everything else is unexpected and exits with 2.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(err) = Runner::from_args().execute().await {
        if err.is_user_facing() {
            error!("{err}");
            std::process::exit(1);
        }
        error!("Unexpected error: {err}");
        std::process::exit(2);
    }
}
