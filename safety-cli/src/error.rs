use std::path::PathBuf;

use safety_dashboard::DashboardError;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Dashboard(#[from] DashboardError),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
