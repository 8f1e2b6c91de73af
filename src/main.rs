//! `sales-analytics` server and administration binary.
//!
//! - `serve` - Run the GraphQL API (default)
//! - `import` - Replace all collections from CSV exports

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, warn};
use sales_analytics::{
    backend::RedisBackend, config::AppConfig, create_router, import, store::PostgresStore,
    SalesService,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sales-analytics")]
#[command(author, version, about = "Cache-aside sales analytics GraphQL server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the GraphQL API
    Serve,
    /// Wipe and reload customers, orders and products from CSV files
    Import {
        /// Directory holding customers.csv, orders.csv and products.csv
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Import { data_dir } => {
            let dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
            let store = connect_store(&config).await?;
            let summary = import::import_all(&store, &dir).await?;
            info!(
                "All data imported successfully ({} customers, {} orders, {} products)",
                summary.customers, summary.orders, summary.products
            );
            Ok(())
        }
    }
}

async fn connect_store(config: &AppConfig) -> anyhow::Result<PostgresStore> {
    let store = PostgresStore::connect(&config.database_url, config.max_db_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    store.migrate().await?;
    Ok(store)
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let store = connect_store(&config).await?;

    // The pool connects lazily; an unreachable Redis only degrades caching.
    let backend = RedisBackend::with_pool_size(&config.redis_url, config.redis_pool_size)?;
    info!("Cache TTL: {:?}", config.cache_ttl);

    let service = SalesService::new(store, backend, config.cache_ttl);
    let app = create_router(Arc::new(service));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Server ready at http://{}/graphql", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Cannot listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
