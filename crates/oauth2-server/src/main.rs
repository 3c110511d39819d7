//! OAuth 2.0 authorization server binary.
//!
//! Runs either the authorization server (default) or the resource server
//! that validates bearer tokens against it.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use oauth2_server::config::{Config, defaults, demo_client};
use oauth2_server::server::{AppState, ResourceState, run_auth_server, run_resource_server};
use oauth2_server::store::{Client, spawn_sweeper};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "oauth2-server")]
#[command(about = "OAuth 2.0 authorization server with opaque tokens")]
#[command(version)]
struct Cli {
    /// Which server to run
    #[arg(long, value_enum, default_value_t = Role::Auth, env = "OAUTH_ROLE")]
    role: Role,

    /// Authorization server port
    #[arg(long, default_value_t = defaults::AUTH_PORT, env = "OAUTH_PORT")]
    port: u16,

    /// Resource server port (for the resource role)
    #[arg(long, default_value_t = defaults::RESOURCE_PORT, env = "RESOURCE_PORT")]
    resource_port: u16,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, env = "LOG_FORMAT")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Role {
    /// Authorization server: authorize, token, introspect
    #[default]
    Auth,
    /// Resource server validating bearer tokens via introspection
    Resource,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum LogFormat {
    /// Human-readable single-line logs
    #[default]
    Compact,
    /// JSON logs for aggregation
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    info!(version = env!("CARGO_PKG_VERSION"), role = ?cli.role, "Starting oauth2-server");

    let config = Config::from_env()?;

    match cli.role {
        Role::Auth => {
            let state = Arc::new(AppState::in_memory(&config));
            state
                .clients
                .register(Client {
                    client_id: demo_client::CLIENT_ID.to_string(),
                    client_secret: demo_client::CLIENT_SECRET.to_string(),
                    redirect_uri: demo_client::REDIRECT_URI.to_string(),
                    scopes: demo_client::SCOPES.iter().map(|s| (*s).to_string()).collect(),
                })
                .await?;
            info!(client_id = demo_client::CLIENT_ID, "Registered demo client");

            spawn_sweeper(
                Arc::clone(&state.grants),
                Arc::clone(&state.tokens),
                config.sweep_interval,
            );

            run_auth_server(state, cli.port).await
        }
        Role::Resource => {
            let state = Arc::new(ResourceState::new(&config)?);
            run_resource_server(state, cli.resource_port).await
        }
    }
}
