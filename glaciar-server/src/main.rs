//! glaciar-server - Main entry point
//!
//! Serves the project tracker over HTTP and offers offline maintenance
//! commands (user accounts, CSV import and export) against the same
//! database.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glaciar_common::api::auth::{count_users, upsert_user};
use glaciar_common::api::Role;
use glaciar_common::config::{database_path, load_config, resolve_root_folder};
use glaciar_common::db::{ProjectQuery, ProjectStore};
use glaciar_common::import::csv::{read_rows, write_projects, ExportOptions};
use glaciar_common::import::{run_import, ValidationRules};
use glaciar_common::time;
use glaciar_server::{build_router, AppState};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Command-line arguments for glaciar-server
#[derive(Parser, Debug)]
#[command(name = "glaciar-server")]
#[command(about = "GlaciarIng project tracker")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "GLACIAR_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database
    #[arg(short, long, env = "GLACIAR_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Create a user, or reset the password and role of an existing one
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// admin or reader
        #[arg(long, default_value = "reader")]
        role: Role,
    },

    /// Import projects from a CSV file
    Import {
        file: PathBuf,
    },

    /// Export all projects to a CSV file
    Export {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(format!("{},tower_http=info", config.logging.level))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let root_folder = resolve_root_folder(cli.root_folder.as_deref(), &config);
    std::fs::create_dir_all(&root_folder)
        .with_context(|| format!("Failed to create root folder {}", root_folder.display()))?;

    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let store = ProjectStore::open(&db_path)
        .await
        .context("Failed to open database")?;

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let port = cli.port.unwrap_or(config.port);
            let state = AppState::from_config(store.clone(), &config);
            serve(state, &config.host, port).await
        }
        Command::AddUser {
            username,
            password,
            role,
        } => upsert_user(store.pool(), &username, &password, role)
            .await
            .context("Failed to save user"),
        Command::Import { file } => {
            let rules = ValidationRules {
                monto_max: config.monto_max,
            };
            import_file(&store, &file, &rules).await
        }
        Command::Export { file } => export_file(&store, &file).await,
    };

    store.close().await;
    result
}

async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    if count_users(state.store.pool()).await? == 0 {
        warn!("No users configured; create one with `glaciar-server add-user`");
    }

    // Expired sessions are otherwise only dropped when their token comes back
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                debug!("Purged {} expired sessions", purged);
            }
        }
    });

    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Starting GlaciarIng server on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn import_file(store: &ProjectStore, file: &Path, rules: &ValidationRules) -> Result<()> {
    let reader = File::open(file).with_context(|| format!("Cannot open {}", file.display()))?;
    let rows = read_rows(reader).with_context(|| format!("Cannot read {}", file.display()))?;

    let report = run_import(store, rows, rules, time::today()).await?;

    println!(
        "Importados {} de {} proyectos ({} filas omitidas, {} advertencias)",
        report.imported, report.total, report.rejected, report.warnings
    );
    for message in &report.errors {
        println!("  {}", message);
    }
    Ok(())
}

async fn export_file(store: &ProjectStore, file: &Path) -> Result<()> {
    let projects = store.find(&ProjectQuery::all()).await?;

    let out = File::create(file).with_context(|| format!("Cannot create {}", file.display()))?;
    let mut writer = BufWriter::new(out);
    let written = write_projects(&mut writer, &projects, &ExportOptions::default())?;
    writer.flush()?;

    println!("Exportados {} proyectos a {}", written, file.display());
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
