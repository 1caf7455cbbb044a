use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::task;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedulite::{config::Config, controllers, services::reminder::ReminderSweep, AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting schedulite");

    let app_state = AppState::new(config.clone()).expect("Failed to build application state");

    // --- Start background tasks ---

    // Single-flight reminder sweep for the lifetime of the process
    let sweep = ReminderSweep::new(
        app_state.store.clone(),
        app_state.mailer.clone(),
        config.reminder.window_minutes,
    );
    task::spawn(sweep.run(config.reminder.sweep_interval_secs));

    // --- Start the web server ---

    let app = Router::new()
        .route("/", get(|| async { "schedulite v0.1" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(app_state.clone())
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
