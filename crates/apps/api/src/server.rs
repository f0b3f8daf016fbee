use crate::api_state::ApiContext;
use crate::create_router;
use app_state::TlsSettings;
use axum::Router;
use axum::routing::get_service;
use axum_server::tls_rustls::RustlsConfig;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use http::{HeaderValue, header};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// The full application: routes, thumbnail files and the cross-cutting layers.
pub fn build_app(api_state: ApiContext) -> Router {
    // --- CORS Configuration ---
    let allowed_origins: Vec<HeaderValue> = api_state
        .settings
        .api
        .allowed_origins
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::USER_AGENT,
            header::CACHE_CONTROL,
            header::PRAGMA,
        ]);

    // Thumbnail names are unique per upload, so they never change.
    let serve_dir = ServeDir::new(&api_state.settings.thumbnails.folder);
    let cache_layer = SetResponseHeaderLayer::if_not_present(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );

    create_router(api_state)
        .nest_service("/thumbnails", get_service(serve_dir).layer(cache_layer))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(api_state: ApiContext) -> Result<()> {
    info!("🚀 Initializing server...");
    let settings = api_state.settings.api.clone();
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .map_err(|e| eyre!("Invalid address: {}", e))?;

    let models = std::sync::Arc::clone(&api_state.models);
    let app = build_app(api_state);

    if let Some(tls) = &settings.tls {
        serve_tls(app, addr, tls).await?;
    } else {
        let listener = TcpListener::bind(addr).await?;
        info!("🐸 Server listening on http://{}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    models.unload();
    info!("Server stopped");
    Ok(())
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    api_state: ApiContext,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let models = std::sync::Arc::clone(&api_state.models);
    axum::serve(listener, build_app(api_state))
        .with_graceful_shutdown(shutdown)
        .await?;
    models.unload();
    Ok(())
}

async fn serve_tls(app: Router, addr: SocketAddr, tls: &TlsSettings) -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| eyre!("Failed to install rustls crypto provider"))?;
    let config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    info!("🐸 Server listening on https://{}", addr);
    axum_server::bind_rustls(addr, config)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Could not listen for the shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
