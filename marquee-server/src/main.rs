use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_config::{Config, ConfigLoad, ConfigLoader};
use marquee_core::AppUnitOfWork;
use marquee_core::database::PostgresDatabase;
use marquee_core::database::context::DatabaseContext;
use marquee_core::database::infrastructure::memory::InMemoryCatalogRepository;
use marquee_server::{AppState, build_app, infra::startup::seed_catalog};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "marquee-server")]
#[command(about = "Playback-progress tracking and view-count service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Path to a marquee.toml configuration file
    #[arg(short, long, env = "MARQUEE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Keep all state in process memory and seed the catalog from the config
    #[arg(long, env = "MARQUEE_IN_MEMORY", default_value_t = false)]
    in_memory: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        None => run_server(config, cli.serve.in_memory).await,
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(config)
}

fn database_url(config: &Config) -> anyhow::Result<&str> {
    config
        .database
        .primary_url
        .as_deref()
        .ok_or_else(|| anyhow!("DATABASE_URL is not configured"))
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pg = PostgresDatabase::new(
        database_url(config)?,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("failed to connect to PostgreSQL for migration")?;
    pg.initialize_schema()
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(config: Config, in_memory: bool) -> anyhow::Result<()> {
    let state = if in_memory {
        let catalog = InMemoryCatalogRepository::new();
        let seeded = seed_catalog(&catalog, &config.catalog)
            .await
            .context("failed to seed in-memory catalog")?;
        info!(movies = seeded, "running with in-memory storage");

        let unit_of_work = Arc::new(AppUnitOfWork::in_memory(catalog));
        AppState::new(unit_of_work, None, config)
    } else {
        let context = DatabaseContext::connect_postgres(
            database_url(&config)?,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .context("failed to connect to PostgreSQL")?;
        context
            .postgres()
            .initialize_schema()
            .await
            .context("database migration failed")?;

        let (postgres, unit_of_work) = context.into_parts();
        AppState::new(unit_of_work, Some(postgres), config)
    };

    let addr = state.config().server.bind_address();
    let router = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Starting Marquee progress service on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
