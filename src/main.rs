use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use varvault::auth::{CredentialHasher, SigningConfig, generate_signing_secret};
use varvault::config::ServerConfig;
use varvault::server::{AppState, create_router};
use varvault::store::{SqliteStore, Store};

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "varvault")]
#[command(about = "A multi-tenant typed variable store for devices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory (create database and signing secret)
    Init {
        /// Data directory for the database and signing secret
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Start the server
    Serve {
        /// TOML config file; flags below override its values
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database and signing secret
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn run_init(data_dir: PathBuf) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir,
        ..ServerConfig::default()
    };
    fs::create_dir_all(&config.data_dir)?;

    let secret_file = config.secret_path();
    if secret_file.exists() {
        bail!(
            "Server already initialized. Signing secret exists at: {}",
            secret_file.display()
        );
    }

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    fs::write(&secret_file, generate_signing_secret())?;

    #[cfg(unix)]
    set_restrictive_permissions(&secret_file);

    println!("Initialized {}", config.data_dir.display());
    println!("  database:       {}", config.db_path().display());
    println!("  signing secret: {}", secret_file.display());

    Ok(())
}

fn load_config(
    file: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<ServerConfig> {
    let mut config = match file {
        Some(path) => ServerConfig::load(&path)?,
        None => ServerConfig::default(),
    };

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }

    Ok(config)
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let secret_file = config.secret_path();
    if !secret_file.exists() {
        bail!("Server not initialized. Run 'varvault init' first to create the database and signing secret.");
    }

    let secret = fs::read_to_string(&secret_file)
        .with_context(|| format!("failed to read {}", secret_file.display()))?;
    let signing = SigningConfig::new(secret.trim().as_bytes(), config.session_ttl()?)?;
    let hasher = CredentialHasher::new(&config.password_cost)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let state = Arc::new(AppState::new(Arc::new(store), Arc::new(signing), hasher));

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("varvault=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => run_init(data_dir)?,
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let config = load_config(config, host, port, data_dir)?;
            run_serve(config).await?;
        }
    }

    Ok(())
}
