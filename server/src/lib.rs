// Relief Server
// HTTP surface for the flood relief dashboard

pub mod auth;
pub mod error;
pub mod routes;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use relief_core::config::ServerConfig;
use relief_core::{AuthConfig, EventBroadcaster, ReliefConfig, Store, WeatherProvider, WeatherSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub events: EventBroadcaster,
    pub weather: Arc<dyn WeatherSource>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(store: Store, weather: Arc<dyn WeatherSource>, auth: AuthConfig) -> Self {
        Self {
            store,
            events: EventBroadcaster::default(),
            weather,
            auth: Arc::new(auth),
        }
    }
}

fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/user", get(auth::current_user).patch(auth::update_profile))
        .route("/users", get(auth::list_users))
        .route("/users/:id/role", patch(auth::set_role))
        .route(
            "/flood-zones",
            get(routes::zones::list).post(routes::zones::create),
        )
        .route("/flood-zones/map", get(routes::zones::map))
        .route(
            "/flood-zones/:id",
            get(routes::zones::get_one).patch(routes::zones::update),
        )
        .route(
            "/affected-population",
            get(routes::population::list).post(routes::population::create),
        )
        .route(
            "/affected-population/:id",
            get(routes::population::get_one).patch(routes::population::update),
        )
        .route(
            "/relief-resources",
            get(routes::resources::list).post(routes::resources::create),
        )
        .route(
            "/relief-resources/:id",
            get(routes::resources::get_one).patch(routes::resources::update),
        )
        .route(
            "/distributions",
            get(routes::distributions::list).post(routes::distributions::create),
        )
        .route(
            "/distributions/:id",
            get(routes::distributions::get_one).patch(routes::distributions::update),
        )
        .route(
            "/weather-alerts",
            get(routes::alerts::list).post(routes::alerts::create),
        )
        .route(
            "/weather-alerts/:id",
            get(routes::alerts::get_one).patch(routes::alerts::update),
        )
        .route(
            "/response-teams",
            get(routes::teams::list).post(routes::teams::create),
        )
        .route(
            "/response-teams/:id",
            get(routes::teams::get_one).patch(routes::teams::update),
        )
        .route("/dashboard/stats", get(routes::dashboard::stats))
        .route("/weather", get(routes::dashboard::weather))
        .route("/events/stream", get(routes::dashboard::event_stream))
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth));

    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .merge(protected)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let methods = [Method::GET, Method::POST, Method::PATCH, Method::OPTIONS];
    if origins.iter().any(|o| o == "*") {
        return Some(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(methods)
                .allow_headers(Any),
        );
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(target: "http", origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(methods)
            .allow_headers(Any),
    )
}

/// Build the full application router
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .nest("/api", api_routes(state.clone()));

    if let Some(dir) = &config.static_dir {
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    if let Some(cors) = cors_layer(&config.cors_origins) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Open the database, wire everything up and serve until shutdown
pub async fn start_server(
    config: ReliefConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let store = Store::open(&config.database.path)?;
    let weather: Arc<dyn WeatherSource> =
        Arc::new(WeatherProvider::with_config(config.weather.clone()));
    let state = AppState::new(store.clone(), weather, config.auth.clone());

    let purge_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = purge_store.purge_expired_sessions().await {
                warn!(target: "auth", error = %e, "Session purge failed");
            }
        }
    });

    let app = build_router(state, &config.server);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        target: "http",
        url = %format!("http://{}", addr),
        "Relief server ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(target: "http", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(target: "http", error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(target: "http", error = %e, "Failed to listen for SIGTERM");
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

    info!(target: "http", "Shutdown signal received");
}
