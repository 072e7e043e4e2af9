use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geomap_api::config::ApiConfig;
use geomap_api::router::create_router;
use geomap_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("GEOMAP_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "geomap_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    tracing::info!(
        port = config.port,
        data_dir = %config.data_dir().display(),
        llm_model = %config.geomap.llm_model.value,
        "Starting geomap API server"
    );

    let cors_origin: HeaderValue = config.cors_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let addr = config.bind_address();
    let origin = config.cors_origin.clone();
    let state = Arc::new(AppState::from_config(config)?);

    let app = create_router(state).layer(cors).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", origin);

    axum::serve(listener, app).await?;
    Ok(())
}
