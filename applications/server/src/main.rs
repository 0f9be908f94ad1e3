/// Tunebox Server - multi-user media library
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunebox_core::UserStore;
use tunebox_server::{
    config::ServerConfig,
    create_router,
    services::{auth::Registration, AuthService, FileStorage, UploadLimits},
    state::AppState,
};
use tunebox_storage::SqliteStore;

#[derive(Parser)]
#[command(name = "tunebox-server")]
#[command(about = "Tunebox multi-user media library server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "TUNEBOX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Email address used to sign in
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunebox_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            serve(config).await?;
        }
        Commands::AddUser {
            username,
            email,
            password,
        } => {
            add_user(config, username, email, password).await?;
        }
        Commands::ListUsers => {
            list_users(config).await?;
        }
    }

    Ok(())
}

async fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<SqliteStore>> {
    let pool = tunebox_storage::create_pool(&config.storage.database_url).await?;
    tunebox_storage::run_migrations(&pool).await?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

fn auth_service(config: &ServerConfig) -> AuthService {
    AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
        config.auth.jwt_refresh_expiration_days,
        config.auth.bcrypt_cost,
    )
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Tunebox Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Initialize database
    let store = open_store(&config).await?;
    tracing::info!("Database connected");

    // Initialize file storage
    let file_storage = FileStorage::new(config.storage.upload_path.clone());
    file_storage.initialize().await?;
    let file_storage = Arc::new(file_storage);
    tracing::info!(
        "File storage initialized at {}",
        config.storage.upload_path.display()
    );

    let auth_service = Arc::new(auth_service(&config));
    let limits = UploadLimits::new(
        config.uploads.max_upload_bytes,
        config.uploads.allowed_media_types.clone(),
    );

    // Build application state
    let app_state = AppState::from_store(store, auth_service, file_storage, limits);

    // Build router
    let app = create_router(app_state, &config.server.cors_allowed_origins);

    // Create server address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn add_user(
    config: ServerConfig,
    username: String,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let auth_service = auth_service(&config);

    let user = auth_service
        .register(
            store.as_ref(),
            Registration {
                username,
                email,
                password,
            },
        )
        .await?;

    println!("Created user {} ({})", user.username, user.id);
    Ok(())
}

async fn list_users(config: ServerConfig) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let users = store.get_all_users().await?;

    println!("Users:");
    for user in users {
        println!("  {} - {} <{}>", user.id, user.username, user.email);
    }

    Ok(())
}
