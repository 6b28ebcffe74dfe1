mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use placement_api::notifier::{LogNotifier, Notifier, ResendNotifier};
use placement_api::uploads::UploadStore;
use placement_api::{AppState, AppStateInner};

use crate::config::{Config, NotifierKind};

/// How often expired OTP codes are swept.
const OTP_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "placement=debug,placement_api=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::load()?;

    let db = placement_db::Database::open(&config.db_path)?;

    if let Some(seed) = &config.admin {
        placement_api::admin::ensure_admin(&db, &seed.email, &seed.password)?;
    }

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let uploads = UploadStore::new(&config.upload_dir);

    let notifier: Arc<dyn Notifier> = match config.notifier {
        NotifierKind::Log => {
            warn!("OTP codes will be written to the log (PLACEMENT_NOTIFIER=log)");
            Arc::new(LogNotifier)
        }
        NotifierKind::Resend { api_key, from } => {
            info!("OTP codes will be emailed via Resend from {}", from);
            Arc::new(ResendNotifier::new(api_key, from))
        }
    };

    let state = AppStateInner::new(db, config.jwt_secret, uploads, notifier);

    tokio::spawn(run_otp_sweep(state.clone()));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let app = placement_api::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Placement portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn run_otp_sweep(state: AppState) {
    let mut interval = tokio::time::interval(OTP_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let removed = state.otp.sweep();
        if removed > 0 {
            info!("OTP sweep: dropped {} expired codes", removed);
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
