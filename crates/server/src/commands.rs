//! Subcommand implementations.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use pressroom_core::{
    load_config, load_config_or_default, validate_config, CancelSignal, Capabilities, Config,
    DocumentStore, ItemEvent, ItemEventCallback, PipelineCoordinator, RunOptions,
    SqliteDocumentStore,
};

use crate::api::create_router;
use crate::state::AppState;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "PRESSROOM_CONFIG";

/// Configuration file used when neither `--config` nor `PRESSROOM_CONFIG` is set.
const DEFAULT_CONFIG_FILE: &str = "pressroom.toml";

/// Loads and validates configuration.
///
/// An explicit path must exist. The implicit path may be missing, in which
/// case defaults plus environment overrides apply.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => {
            let path = std::env::var(CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
            load_config_or_default(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
    };

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

/// Opens the configured document store without touching its schema.
pub fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    info!("Database path: {:?}", config.database.path);
    let store = SqliteDocumentStore::open(&config.database.path)
        .with_context(|| format!("Failed to open database {:?}", config.database.path))?;
    Ok(Arc::new(store))
}

/// Builds the extraction tools and warns about any that are unavailable.
async fn capabilities(config: &Config) -> Result<Capabilities> {
    let capabilities = Capabilities::from_config(&config.extraction, &config.tagger)
        .context("Failed to create extraction capabilities")?;

    for (name, problem) in capabilities.validate().await {
        warn!("Capability {} is not ready: {}", name, problem);
    }

    Ok(capabilities)
}

/// Processes the archive once and prints a one-line summary.
pub async fn run(config: Config, root: Option<PathBuf>, concurrency: Option<usize>) -> Result<()> {
    let root = root
        .or_else(|| config.scan.root_dir.clone())
        .context("No archive root given (pass ROOT, set scan.root_dir or ROOT_FOLDER)")?;

    let store = open_store(&config)?;
    let capabilities = capabilities(&config).await?;

    let on_event: ItemEventCallback = Arc::new(|event: &ItemEvent| match event {
        ItemEvent::Failed(failure) => {
            println!("FAILED {}: {}", failure.path.display(), failure.message);
        }
        ItemEvent::PersistFailed(failure) => {
            println!("FAILED {}: {}", failure.path.display(), failure.message);
        }
        _ => {}
    });

    let coordinator =
        PipelineCoordinator::from_config(&config, capabilities, store).with_event_callback(on_event);

    let cancel = CancelSignal::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            interrupt.cancel();
        }
    });

    let options = RunOptions { concurrency };
    info!(
        root = %root.display(),
        concurrency = coordinator.effective_concurrency(&options),
        "Starting run"
    );
    let report = coordinator.run(&root, options, cancel).await?;

    if report.cancelled {
        println!("Run cancelled");
    }
    if !report.summary_persisted {
        warn!("Run summary was not saved");
    }
    let summary = &report.summary;
    println!(
        "Processed {} files in {:.2} s (failed {}, skipped {})",
        summary.total_files_processed,
        summary.total_processing_time,
        summary.failed_files,
        summary.skipped_files
    );

    Ok(())
}

/// Starts the HTTP server and blocks until shutdown.
pub async fn serve(config: Config) -> Result<()> {
    let store = open_store(&config)?;
    {
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || store.initialize_schema())
            .await
            .context("Schema initialization task failed")?
            .context("Failed to initialize database schema")?;
    }

    let capabilities = capabilities(&config).await?;
    let coordinator = Arc::new(PipelineCoordinator::from_config(
        &config,
        capabilities,
        Arc::clone(&store),
    ));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, store, coordinator));
    let app = create_router(Arc::clone(&state));

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    state.shutdown().await;
    if state.coordinator().is_running() {
        warn!("Pipeline run still active at exit");
    }

    Ok(())
}

/// Creates the database schema.
pub async fn init_db(config: Config) -> Result<()> {
    let store = open_store(&config)?;
    tokio::task::spawn_blocking(move || store.initialize_schema())
        .await
        .context("Schema initialization task failed")?
        .context("Failed to initialize database schema")?;

    println!("Initialized database at {}", config.database.path.display());
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
