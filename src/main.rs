mod core;
mod features;
mod shared;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware::from_fn, Router};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::pages::dtos::ClientBootstrapDto;
use crate::features::pages::handlers::PagesState;
use crate::features::pages::routes as pages_routes;
use crate::features::reports::geofence::{Geofence, LatLng};
use crate::features::reports::handlers::ReportState;
use crate::features::reports::routes as reports_routes;
use crate::features::reports::services::{
    GeocodingService, LocalMarkerStore, MarkerStore, PgMarkerStore, ReverseGeocoder,
};
use crate::features::session::handlers::SessionState;
use crate::features::session::routes as session_routes;
use crate::features::session::{SessionRegistry, SessionSweeper};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Configuration loaded (tokio_worker_threads={}, pid={})",
        worker_threads,
        std::process::id()
    );

    // Pick the marker store: Postgres when configured, the legacy file
    // store otherwise
    let store: Arc<dyn MarkerStore> = match &config.database {
        Some(db_config) => {
            let pool = database::create_pool(db_config).await?;
            tracing::info!("Database connection pool created");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
            tracing::info!("Database migrations completed successfully");

            Arc::new(PgMarkerStore::new(pool))
        }
        None => {
            let local = LocalMarkerStore::open(&config.local_store.path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to open marker store: {}", e))?;
            tracing::info!(
                "DATABASE_URL not set, using local marker store at {}",
                config.local_store.path.display()
            );
            Arc::new(local)
        }
    };

    // Geofence from configuration
    let geofence = Geofence::new(
        LatLng::new(config.geofence.center_lat, config.geofence.center_lng),
        config.geofence.radius_km,
    );
    tracing::info!(
        "Geofence: {:.1} km around ({}, {})",
        geofence.radius_km,
        geofence.center.lat,
        geofence.center.lng
    );

    // Initialize geocoding client
    let geocoder: Arc<dyn ReverseGeocoder> = Arc::new(GeocodingService::new(&config.geocoder));
    tracing::info!("Geocoding client initialized ({})", config.geocoder.base_url);

    // Initialize session registry and spawn the idle sweeper
    let registry = Arc::new(SessionRegistry::new());
    let sweeper = SessionSweeper::new(
        Arc::clone(&registry),
        Duration::from_secs(config.session.idle_ttl_secs),
        Duration::from_secs(config.session.sweep_interval_secs),
    );
    tokio::spawn(async move {
        sweeper.run().await;
    });
    tracing::info!("Session registry initialized, sweeper worker spawned");

    // Initialize dashboard service
    let dashboard_service = Arc::new(DashboardService::new(Arc::clone(&store)));
    tracing::info!("Dashboard service initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let report_state = ReportState {
        store: Arc::clone(&store),
        geocoder: Arc::clone(&geocoder),
        geofence,
    };

    let session_state = SessionState {
        registry,
        store: Arc::clone(&store),
        geocoder,
        geofence,
    };

    let pages_state = PagesState {
        dashboard: Arc::clone(&dashboard_service),
        bootstrap: ClientBootstrapDto::from_config(&config.geofence),
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(pages_routes::routes(pages_state))
        .merge(reports_routes::routes(report_state))
        .merge(session_routes::routes(session_state))
        .merge(dashboard_routes::routes(dashboard_service))
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
