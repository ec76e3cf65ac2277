use std::net::SocketAddr;

use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dotenvy::dotenv;

use ridership_portal::{app, app_state::AppState, config::AppConfig, session_store, store::TabularStore};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or("ridership_portal=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), anyhow::Error> {
    let config = AppConfig::from_env()?;

    let state = AppState::load(TabularStore::new(config.store.clone()), config.rules)?;
    let sessions = session_store(&state, config.session_config());

    let mut app = app(state, sessions);
    if let Some(origin) = config.frontend_origin.as_deref() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin.parse::<HeaderValue>()?)
                .allow_headers([header::CONTENT_TYPE])
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true),
        );
    }
    let app = app.layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from((config.host_ip, config.port));
    tracing::debug!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
