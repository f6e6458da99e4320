//! Run command implementation

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::RunArgs;
use crate::config::{GridboardConfig, LogFormat};
use crate::dashboard::{Dashboard, DashboardDocument, DashboardError};
use crate::layout::GridLayout;
use crate::plugin::{NoopPluginLoader, PluginRegistry};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &RunArgs,
) -> Result<GridboardConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        GridboardConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        GridboardConfig::default()
    };

    // Apply environment variable overrides
    config = config.with_env_overrides();

    // Apply CLI overrides (highest priority)
    if let Some(ref dashboard) = args.dashboard {
        config.engine.dashboard = Some(dashboard.clone());
    }
    if let Some(columns) = args.columns {
        config.engine.columns = columns;
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Read and parse a dashboard document from disk
pub fn read_document(path: &Path) -> Result<DashboardDocument, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let document: DashboardDocument = serde_json::from_str(&content)
        .map_err(|e| DashboardError::InvalidDocument(format!("{}: {}", path.display(), e)))?;
    Ok(document)
}


/// Handle `gridboard run`
pub async fn run_dashboard(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args)?;
    init_tracing(&config.logging)?;

    let registry = PluginRegistry::with_builtins();
    let (mut dashboard, events) = Dashboard::with_layout(
        registry,
        Box::new(GridLayout::new(config.engine.columns)),
    );

    if let Some(path) = &config.engine.dashboard {
        let document = read_document(path)?;
        dashboard.deserialize(document, &NoopPluginLoader).await?;
        tracing::info!(
            dashboard = %path.display(),
            datasources = dashboard.datasources().len(),
            panes = dashboard.pane_count(),
            "dashboard loaded"
        );
    } else {
        tracing::info!("no dashboard document configured, starting empty");
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    dashboard.run(events, cancel).await;
    dashboard.clear();
    Ok(())
}
