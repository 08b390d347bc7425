use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Config directory not found at {0}. Run 'portfolio init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("No backend URL configured. Set [backend] url in config.toml.")]
    MissingBackendUrl,

    #[error("Request to '{endpoint}' failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Backend rejected '{endpoint}' with status {status}: {message}")]
    Backend {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Could not decode response from '{endpoint}': {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Worker for '{0}' panicked")]
    WorkerPanicked(String),

    #[error("{} of {total} requests failed ({}): {first}", .failed.len(), .failed.join(", "))]
    BatchFailed {
        failed: Vec<String>,
        total: usize,
        first: Box<DashboardError>,
    },

    #[error("Failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Endpoints that failed, for batch errors; a single-call error names its own endpoint.
    pub fn failed_endpoints(&self) -> Vec<&str> {
        match self {
            DashboardError::BatchFailed { failed, .. } => {
                failed.iter().map(String::as_str).collect()
            }
            DashboardError::Transport { endpoint, .. }
            | DashboardError::Backend { endpoint, .. }
            | DashboardError::Decode { endpoint, .. } => vec![endpoint.as_str()],
            DashboardError::WorkerPanicked(endpoint) => vec![endpoint.as_str()],
            _ => Vec::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
