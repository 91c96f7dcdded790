use anyhow::{Context, Result};
use std::sync::Arc;
use tickscope::{
    arguments::{
        get_config_path, get_ledger_path, get_port, is_help_requested, is_version_requested,
        print_help,
    },
    config::{self, CONFIG_FILE_PATH},
    explorer::Explorer,
    logger::{self, LogTag},
    store::SqliteStore,
};

/// Entry point: args, config, logger, ledger store, explorer, webserver.
///
/// Runs until Ctrl-C.
#[tokio::main]
async fn main() {
    logger::init();

    if is_help_requested() {
        print_help();
        std::process::exit(0);
    }
    if is_version_requested() {
        println!("tickscope {}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    if let Err(e) = run().await {
        logger::error(LogTag::System, &format!("Fatal: {:#}", e));
        logger::flush();
        std::process::exit(1);
    }
    logger::flush();
}

async fn run() -> Result<()> {
    let config_path = get_config_path().unwrap_or_else(|| CONFIG_FILE_PATH.to_string());
    config::load_config_from_path(&config_path).context("loading configuration")?;
    let mut settings = config::get_config_clone();

    logger::apply_settings(&settings.logging);
    logger::info(
        LogTag::System,
        &format!("tickscope {} starting", env!("CARGO_PKG_VERSION")),
    );

    if let Some(path) = get_ledger_path() {
        settings.store.path = path;
    }
    if let Some(port) = get_port() {
        settings.webserver.port = port;
    }

    let store = SqliteStore::open(&settings.store.path, settings.store.read_connections)
        .with_context(|| format!("opening ledger {}", settings.store.path))?;
    let explorer = Arc::new(Explorer::new(Arc::new(store), &settings));

    serve(explorer, settings).await
}

#[cfg(feature = "web")]
async fn serve(explorer: Arc<Explorer>, settings: config::Config) -> Result<()> {
    use tickscope::webserver::{self, AppState};

    if !settings.webserver.enabled {
        logger::warning(
            LogTag::System,
            "webserver.enabled is false, nothing to serve; exiting",
        );
        return Ok(());
    }

    let state = AppState::new(explorer, settings.webserver);
    let mut server = tokio::spawn(webserver::start_server(state));

    let exited = tokio::select! {
        result = &mut server => Some(result),
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl-C")?;
            None
        }
    };
    let finished = match exited {
        Some(result) => result,
        None => {
            logger::info(LogTag::System, "Shutdown requested");
            webserver::shutdown();
            server.await
        }
    };
    finished
        .context("webserver task panicked")?
        .map_err(anyhow::Error::msg)?;

    logger::info(LogTag::System, "tickscope stopped");
    Ok(())
}

#[cfg(not(feature = "web"))]
async fn serve(_explorer: Arc<Explorer>, _settings: config::Config) -> Result<()> {
    logger::warning(
        LogTag::System,
        "Built without the `web` feature, no HTTP surface to start",
    );
    Ok(())
}
