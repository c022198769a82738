use std::net::SocketAddr;

use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use opsboard::pool::{backend::PgConnector, Pool, PoolOptions};
use opsboard::{api, auth, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "opsboard=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::HashPassword { password }) => {
            let hash = auth::credentials::hash_password(&password)?;
            println!("{}", hash);
            Ok(())
        }
        Some(cli::Commands::Serve { port }) => {
            let cfg = config::load()?;
            run_server(cfg, port).await
        }
        None => {
            let cfg = config::load()?;
            run_server(cfg, None).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port_override: Option<u16>) -> anyhow::Result<()> {
    tracing::info!("Initializing connection pool...");
    let connector = PgConnector::new(cfg.db.url());
    let pool = Pool::initialize(PoolOptions::from(&cfg.pool), Box::new(connector)).await?;

    let port = port_override.unwrap_or(cfg.server.port);
    let host: std::net::IpAddr = cfg
        .server
        .host
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid server.host '{}'", cfg.server.host))?;

    let state = AppState::new(cfg, pool.clone())?;

    let app = api::router(state.clone())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors.allow_origins))
        .layer(axum::middleware::from_fn(request_id_middleware));

    let addr = SocketAddr::from((host, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("opsboard listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Draining connection pool...");
    pool.shutdown().await;

    Ok(())
}

/// CORS for the dashboard client. Only needed while the client is served
/// from a different origin during development.
fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    use axum::http::{HeaderName, HeaderValue, Method};

    let origins: Vec<HeaderValue> = allow_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        // NOTE: Cannot use AllowHeaders::any() with allow_credentials(true) per CORS spec
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
        ])
        .allow_credentials(true)
}

/// Middleware: injects a unique X-Request-Id into every response.
/// This allows clients to correlate errors with server logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
