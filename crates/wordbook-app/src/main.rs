use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wordbook_config::logging::LoggingConfig;

mod cli;
mod commands;
mod dialog;
mod profile;
mod state;

use self::cli::Cli;
use self::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let profiles = profile::profiles_dir();
    profile::init_user_config(&profiles)?;
    let config = profile::load_user_profile(&profiles, &cli.profile)?.with_env_overrides();

    init_logging(&config.logging);
    tracing::debug!("Using profile {}", cli.profile);

    let state = AppState::new(config).await?;
    let result = commands::run(&state, cli.command).await;
    state.close();
    result
}

/// `RUST_LOG` wins over the profile's level. Logs go to stderr.
fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(atty::is(atty::Stream::Stderr))
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
