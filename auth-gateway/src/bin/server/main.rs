use std::sync::Arc;

use auth::Authenticator;
use auth_gateway::config::Config;
use auth_gateway::directory::PostgresUserDirectory;
use auth_gateway::domain::user::service::AuthService;
use auth_gateway::inbound::http::router::create_router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-gateway",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        database_host = %config.database.host,
        database_port = config.database.port,
        database_name = %config.database.name,
        database_ssl = config.database.ssl,
        http_port = config.server.http_port,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(0)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect_lazy_with(config.database.connect_options());
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    match sqlx::query("SELECT 1").execute(&pg_pool).await {
        Ok(_) => tracing::info!(database = "postgresql", "Database connected successfully"),
        Err(e) => tracing::error!(error = %e, "Unable to connect to the database"),
    }

    let authenticator = Arc::new(Authenticator::new(config.jwt.secret.as_bytes()));
    let user_directory = Arc::new(PostgresUserDirectory::new(pg_pool));
    let auth_service = Arc::new(AuthService::new(user_directory, authenticator));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(auth_service)).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}
