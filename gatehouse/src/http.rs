use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{
    api::{actor::ACTOR_HEADER, router::ApiRoutes},
    app_state::SharedAppState,
};

pub async fn setup_http_server(
    app_state: SharedAppState,
    bind_address: &str,
) -> anyhow::Result<tokio::task::JoinHandle<anyhow::Result<()>>> {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, HeaderName::from_static(ACTOR_HEADER)]);

    let app = ApiRoutes::create(app_state.clone()).layer(cors);

    #[cfg(any(feature = "telemetry-grpc", feature = "telemetry-http"))]
    let app = if app_state.settings.traces_enabled() {
        use axum_tracing_opentelemetry::middleware::{OtelAxumLayer, OtelInResponseLayer};
        app.layer(OtelInResponseLayer)
            .layer(OtelAxumLayer::default())
    } else {
        app
    };

    println!("🚀 API-Server starting at {}", &bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    let stop_flag = app_state.stop_flag.clone();
    let handle = tokio::spawn(async move {
        info!("Starting HTTP server");
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                stop_flag.wait().await;
                info!("Stop flag was set, shutting down HTTP server gracefully");
            })
            .await?;
        info!("HTTP server is down");
        Ok::<(), anyhow::Error>(())
    });

    Ok(handle)
}
