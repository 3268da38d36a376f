use std::path::PathBuf;

/// Errors produced while setting up a dashboard session.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
