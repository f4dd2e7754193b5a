//! Subcommands and the helpers they share.

pub mod chat;
pub mod config;
pub mod import;
pub mod output;
pub mod payload;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use invget_core::models::config::InvgetConfig;
use invget_core::{
    DiagnosticLog, DiagnosticSink, ExtractionSettings, GeminiClient, Importer, Orchestrator,
    TracingSink,
};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "INVGET_CONFIG";

pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invget")
        .join("config.json")
}

/// Resolve the config path: `--config` wins over the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the config file, or defaults when the default location is missing.
///
/// An explicit path that does not exist is an error.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<InvgetConfig> {
    let path = config_path(explicit);
    if path.exists() {
        debug!("Loading config from {}", path.display());
        return Ok(InvgetConfig::from_file(&path)?);
    }
    if explicit.is_some() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    Ok(InvgetConfig::default())
}

/// Build an importer wired to Gemini.
///
/// With `keep_log` the diagnostics are also collected in a log returned to
/// the caller; otherwise they only go to `tracing`.
pub fn build_importer(
    config: &InvgetConfig,
    offline: bool,
    keep_log: bool,
) -> anyhow::Result<(Importer<GeminiClient>, Option<Arc<DiagnosticLog>>)> {
    let mut settings = ExtractionSettings::from_config(config);
    if offline {
        settings.api_key.clear();
    }

    let log = keep_log.then(|| Arc::new(DiagnosticLog::new(config.import.diagnostics_capacity)));
    let sink: Arc<dyn DiagnosticSink> = match &log {
        Some(log) => log.clone(),
        None => Arc::new(TracingSink),
    };
    let client = GeminiClient::from_config(&config.remote)?;
    let orchestrator = Orchestrator::new(client, settings, sink.clone());

    Ok((Importer::new(orchestrator, config.company.clone(), sink), log))
}

/// File name used for format detection and bid inference.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
