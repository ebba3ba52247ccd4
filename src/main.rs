//! Professionals directory entry point.

use std::sync::Arc;

use axum::Router;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use professionals::api::{self, ApiState};
use professionals::client::ApiClient;
use professionals::config::{Config, Shape};
use professionals::front::{self, FrontState, StoreDirectory};
use professionals::render::Renderer;
use professionals::store::{connect_store, StoreTarget};
use professionals::telemetry::{self, Telemetry};
use professionals::utils::shutdown_signal;

/// Professionals directory web services.
#[derive(Parser, Debug)]
#[command(name = "professionals")]
#[command(about = "CRUD web services over the professionals table")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTML page straight from the database.
    Monolith {
        /// Listen port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Serve the JSON data-access API.
    Api {
        /// Listen port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Serve the HTML page, relaying to the data-access API.
    Front {
        /// Listen port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Create the professionals table if it does not exist.
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::CheckConfig => cmd_check_config(),
        Command::InitDb => cmd_init_db(args.verbose).await,
        Command::Monolith { port } => cmd_serve(Shape::Monolith, port, args.verbose).await,
        Command::Api { port } => cmd_serve(Shape::Api, port, args.verbose).await,
        Command::Front { port } => cmd_serve(Shape::Front, port, args.verbose).await,
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;
    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("PROFESSIONALS - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!();
    println!("Settings:");
    match StoreTarget::from_url(&config.database_url) {
        Ok(target) => println!("  Database:        {}", target.connection_string()),
        Err(e) => println!("  Database:        invalid ({})", e),
    }
    println!("  API URL:         {}", config.api_url);
    for shape in [Shape::Monolith, Shape::Api, Shape::Front] {
        if let Ok(addr) = config.listen_addr(shape) {
            println!("  {:<16} {} ({})", format!("{shape}:"), addr, config.service_name(shape));
        }
    }
    if config.telemetry_enabled {
        println!(
            "  Telemetry:       {} via {}",
            config.otel_span_export,
            config.otel_exporter_otlp_endpoint.as_deref().unwrap_or_default()
        );
    } else {
        println!("  Telemetry:       disabled");
    }
    println!("  Log format:      {}", config.log_format);

    println!();
    println!("Configuration is valid.");
    Ok(())
}

/// Create the table in the configured database.
async fn cmd_init_db(verbose: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let _guard = telemetry::init(
        &Config {
            telemetry_enabled: false,
            ..config.clone()
        },
        &config.service_name(Shape::Api),
        verbose,
    )?;

    let store = connect_store(&config.database_url)?;
    store.ensure_schema().await?;

    info!(
        store = %store.target().connection_string(),
        "professionals table is ready"
    );
    Ok(())
}

/// Serve one deployment shape until shutdown.
async fn cmd_serve(shape: Shape, port: Option<u16>, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config()?;
    if port.is_some() {
        config.port = port;
    }

    let guard = telemetry::init(&config, &config.service_name(shape), verbose)?;
    let router = build_router(shape, &config, guard.telemetry())?;

    let addr = config
        .listen_addr(shape)
        .map_err(|e| anyhow::anyhow!(e))?;
    let listener = TcpListener::bind(addr).await?;
    info!(%shape, "HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    drop(guard);
    Ok(())
}

fn build_router(shape: Shape, config: &Config, telemetry: Telemetry) -> anyhow::Result<Router> {
    let router = match shape {
        Shape::Api => {
            let store = connect_store(&config.database_url)?;
            info!(store = %store.target().connection_string(), "Using store");
            api::create_router(ApiState::new(store, telemetry))
        }
        Shape::Monolith => {
            let store = connect_store(&config.database_url)?;
            info!(store = %store.target().connection_string(), "Using store");
            let directory = StoreDirectory::new(store, telemetry);
            front::create_router(FrontState::new(
                Arc::new(directory),
                Arc::new(Renderer::new()?),
            ))
        }
        Shape::Front => {
            let client = ApiClient::new(&config.api_url, telemetry)?;
            info!(api_url = client.collection_url(), "Relaying to data-access service");
            front::create_router(FrontState::new(Arc::new(client), Arc::new(Renderer::new()?)))
        }
    };
    Ok(router)
}
