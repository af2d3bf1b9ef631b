//! Latchkey demo server - username/password auth for axum applications

use anyhow::Result;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod user_info;

use config::Config;
use latchkey_db::Database;
use latchkey_web::{add_routes, AppState, ClientSession, RequireLogin};

/// Latchkey - pluggable username/password authentication demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "LATCHKEY_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "LATCHKEY_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting latchkey-server v{}", env!("CARGO_PKG_VERSION"));

    // Create data directory
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_path).await?;

    // Host extension table, composed on top of the core schema
    user_info::run_migrations(db.pool()).await?;

    // Create application state
    let auth = config.auth_config();
    let state = AppState::new(db, auth.clone());

    // Create router: auth pages plus the demo pages
    let app = add_routes(Router::new(), &auth.routes)
        .route("/", get(home))
        .route("/protected", get(protected))
        .route("/custom-register", get(user_info::show_custom_register).post(user_info::submit_custom_register))
        .route("/user-info", get(user_info::show_user_info))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("Login route: {}", auth.routes.login);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Public landing page showing the current auth state.
async fn home(
    State(state): State<AppState>,
    ClientSession(mut auth): ClientSession,
) -> Result<Html<String>, latchkey_web::WebError> {
    let greeting = match auth.authenticated_user().await? {
        Some(user) => format!(
            r#"<p>Logged in as {}.</p>
<form method="post" action="/logout"><button type="submit">Logout</button></form>"#,
            user.username
        ),
        None => format!(
            r#"<p><a href="{}">Login</a> or <a href="{}">Register</a></p>"#,
            state.auth.routes.login, state.auth.routes.register
        ),
    };
    Ok(Html(format!(
        r#"<h1>Welcome to my homepage!</h1>
{greeting}
<p><a href="/protected">Protected Page</a></p>
<p><a href="/custom-register">Custom Register</a></p>
<p><a href="/user-info">User Info</a></p>"#
    )))
}

/// A page behind the route guard; anonymous visitors are redirected to
/// the login page and brought back after authenticating.
async fn protected(RequireLogin(user): RequireLogin) -> Html<String> {
    Html(format!(
        "<h1>Protected Page</h1><p>This is truly private data for {}</p>",
        user.username
    ))
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
