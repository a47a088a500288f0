use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cuswash::config::AppConfig;
use cuswash::db;
use cuswash::handlers;
use cuswash::services::notify::resend::ResendMailer;
use cuswash::services::payment::midtrans::MidtransSnapProvider;
use cuswash::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    anyhow::ensure!(
        !config.midtrans_server_key.is_empty(),
        "MIDTRANS_SERVER_KEY must be set"
    );

    let conn = db::init_db(&config.database_url)?;

    let gateway = MidtransSnapProvider::new(
        config.midtrans_server_key.clone(),
        config.midtrans_is_production,
    );
    let mailer = ResendMailer::new(config.resend_api_key.clone(), config.email_from.clone());

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        gateway: Box::new(gateway),
        mailer: Box::new(mailer),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/availability", get(handlers::availability::get_availability))
        .route("/api/car-types", get(handlers::bookings::get_car_types))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/my-bookings", get(handlers::bookings::my_bookings))
        .route("/webhook/midtrans", post(handlers::webhook::midtrans_webhook))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings/:id/confirm",
            post(handlers::admin::confirm_booking),
        )
        .route(
            "/api/admin/bookings/:id/complete",
            post(handlers::admin::complete_booking),
        )
        .route(
            "/api/admin/bookings/:id/cancel",
            post(handlers::admin::cancel_booking),
        )
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
