use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use naiyaksetu_backend::config::CONFIG;
use naiyaksetu_backend::db;
use naiyaksetu_backend::endpoints::create_router;
use naiyaksetu_backend::services::scheduler::Scheduler;
use naiyaksetu_backend::services::sms::notifier_from_config;
use naiyaksetu_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "naiyaksetu_backend={},tower_http=info",
                    CONFIG.log_level
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting NaiyakSetu backend v{} ({})",
        env!("CARGO_PKG_VERSION"),
        CONFIG.environment
    );

    let db = db::connect().await?;
    tracing::info!("Database connection established");

    let sms = notifier_from_config();
    let state = AppState::new(db.clone(), sms);

    // Background maintenance: OTP sweep + rate limiter purge
    let _scheduler = Scheduler::start(
        Arc::new(db),
        vec![
            state.otp_limiter.clone(),
            state.verify_limiter.clone(),
            state.general_limiter.clone(),
        ],
    );

    let cors = CorsLayer::new()
        .allow_origin(
            CONFIG
                .frontend_url
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid frontend URL: {}", e))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from((
        CONFIG
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| [0, 0, 0, 0].into()),
        CONFIG.server.port,
    ));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
