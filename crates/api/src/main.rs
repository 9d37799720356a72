use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use txcat_core::categorize::Categorizer;
use txcat_core::domain::Taxonomy;
use txcat_core::llm::openai::OpenAiClient;

mod app;

#[derive(Debug, Parser)]
#[command(name = "txcat_api")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let settings = txcat_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let taxonomy = Arc::new(Taxonomy::default());
    let categorizer = match OpenAiClient::from_settings(&settings) {
        Ok(client) => {
            tracing::info!(model = client.model(), "completion client ready");
            Some(Arc::new(Categorizer::new(Arc::new(client), taxonomy.clone())))
        }
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "completion client unavailable; starting API in degraded mode");
            None
        }
    };

    let app = app::router(app::AppState {
        taxonomy,
        categorizer,
    });

    let addr = SocketAddr::new(args.host, args.port);
    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &txcat_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
