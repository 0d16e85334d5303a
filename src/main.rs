mod api;
mod auth;
mod config;
mod db;
mod error;
mod models;
mod schema;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware;
use axum::Router;
use std::env;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;

/// Collaborators shared across all handlers, constructed once at startup.
pub struct App {
    pub pool: db::DbPool,
    pub sessions: auth::SessionStore,
    pub passwords: auth::PasswordHasher,
}

pub type AppState = Arc<App>;

fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let cookie_name =
            env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "session".to_string());
        let spec = api::openapi(&cookie_name).to_pretty_json().unwrap();
        println!("{}", spec);
        return;
    }

    init_telemetry();

    let config = Config::from_env().expect("Invalid configuration");

    let pool = db::create_pool(&config.database_url);
    let passwords = auth::PasswordHasher::new(config.salt_size);

    if let Some(seed) = &config.admin {
        db::ensure_admin(&pool, &passwords, seed).expect("Failed to seed admin user");
    }

    let sessions = auth::SessionStore::new(
        config.cookie_name.clone(),
        config.session_ttl_secs,
        config.session_refresh_secs,
    );

    let state: AppState = Arc::new(App {
        pool,
        sessions,
        passwords,
    });

    let swagger_ui = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", api::openapi(&config.cookie_name));

    let app = Router::new()
        .nest("/api/v1/auth", api::auth::router())
        .nest("/api/v1/recipes", api::recipes::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
        .merge(swagger_ui)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                ),
        );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());
    tracing::info!("Swagger UI available at /swagger-ui/");

    axum::serve(listener, app).await.unwrap();
}
