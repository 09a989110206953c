//! Stub API server entrypoint.

use clap::Parser;
use finesdesk_core::config::env_flag_enabled;
use finesdesk_server::seed::{demo_store, DEMO_SEED};
use finesdesk_server::{resolve_bind_address, serve_router, AppState, Config, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment: `PORT`, `BIND`, `FINESDESK_SEED_DEMO`, `ALLOW_PUBLIC_ACCESS`.
#[derive(Parser, Debug)]
#[command(name = "finesdesk-server", about = "FinesDesk stub API", version)]
struct Args {
    /// Seed demo students, events, fines and absences
    #[arg(long)]
    demo: bool,

    /// Seed for the demo data generator
    #[arg(long, default_value_t = DEMO_SEED)]
    seed: u64,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Accept any CORS origin and non-loopback binds
    #[arg(long)]
    public: bool,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.demo {
            config.seed_demo = true;
        }
        config
    }

    fn allow_public(&self) -> bool {
        self.public || env_flag_enabled("ALLOW_PUBLIC_ACCESS")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finesdesk=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.config();
    let store = if config.seed_demo {
        let store = demo_store(args.seed)?;
        tracing::info!(
            seed = args.seed,
            students = store.students().len(),
            fines = store.fines().len(),
            "seeded demo data"
        );
        store
    } else {
        Store::default()
    };

    let allow_public = args.allow_public();
    if allow_public {
        tracing::warn!("public access enabled: any origin may call the API");
    }
    let bind_addr = resolve_bind_address(&config, allow_public);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(
        "FinesDesk stub API running at http://{}",
        listener.local_addr().unwrap_or(bind_addr)
    );

    serve_router(
        listener,
        AppState::new(config, store),
        allow_public,
        shutdown_signal(),
    )
    .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Ctrl+C handler unavailable: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("SIGTERM handler unavailable: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
