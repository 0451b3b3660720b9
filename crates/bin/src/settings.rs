//! Configuration and default locations for the CLI.

use intrinsic::{Region, ValuationConfig};
use std::path::{Path, PathBuf};

/// Errors raised while assembling the run configuration.
#[derive(Debug, thiserror::Error)]
pub(crate) enum SettingsError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Config file is not valid JSON for `ValuationConfig`.
    #[error("Invalid config {path}: {source}")]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Default directory holding `<TICKER>.json` statement snapshots.
///
/// - Linux: `~/.local/share/intrinsic/statements/`
/// - macOS: `~/Library/Application Support/intrinsic/statements/`
/// - Windows: `%APPDATA%\intrinsic\statements\`
pub(crate) fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("intrinsic")
        .join("statements")
}

/// Command-line overrides applied on top of the file or default config.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) region: Option<String>,
    pub(crate) risk_free_rate: Option<f64>,
    pub(crate) terminal_growth: Option<f64>,
}

/// Load the valuation config from `path` (or defaults) and apply overrides.
pub(crate) fn load_config(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<ValuationConfig, SettingsError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => ValuationConfig::default(),
    };

    if let Some(region) = &overrides.region {
        config.market.region = Region::from_code(region);
    }
    if let Some(rate) = overrides.risk_free_rate {
        config.market.risk_free_rate = Some(rate);
    }
    if let Some(growth) = overrides.terminal_growth {
        config.terminal_growth = growth;
    }

    tracing::debug!(?config, "loaded valuation config");
    Ok(config)
}
