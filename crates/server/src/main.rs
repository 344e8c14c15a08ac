// crates/server/src/main.rs
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsmith_server::pipeline::DocPipeline;
use docsmith_server::state::AppState;

const DEFAULT_PORT: u16 = 47911;
const DEFAULT_REAP_IDLE_SECS: i64 = 300;
const REAP_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn env_port() -> u16 {
    std::env::var("DOCSMITH_PORT")
        .or_else(|_| std::env::var("PORT"))
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn env_output_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCSMITH_OUTPUT_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("docsmith")
        .join("output")
}

fn env_reap_idle() -> chrono::Duration {
    let secs = std::env::var("DOCSMITH_REAP_IDLE_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_REAP_IDLE_SECS);
    chrono::Duration::seconds(secs)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsmith_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let output_dir = env_output_dir();
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let state = AppState::new(DocPipeline::with_defaults(output_dir.clone()));
    let app = docsmith_server::create_app(Arc::clone(&state));

    // Background reaper: fails jobs whose worker stopped heartbeating.
    let max_idle = env_reap_idle();
    let reaper_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REAP_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let reaped = reaper_state.tracker.reap_stalled(max_idle);
            if reaped > 0 {
                tracing::warn!(count = reaped, "reaped stalled jobs");
            }
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], env_port()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    eprintln!("docsmith listening on http://{addr}");
    eprintln!("artifacts written under {}", output_dir.display());
    tracing::info!(%addr, output_dir = %output_dir.display(), "server started");

    axum::serve(listener, app)
        .await
        .context("server exited with error")?;
    Ok(())
}
