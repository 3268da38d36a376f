use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::DashboardError;
use crate::error::Result;

/// Timing of the debounced password-check indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Minimum time the indicator stays visible once shown.
    pub min_display_ms: u64,
    /// Time after which a check without results is reported unavailable.
    pub max_wait_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            min_display_ms: 1000,
            max_wait_ms: 5000,
        }
    }
}

impl LoadingConfig {
    pub fn min_display(&self) -> Duration {
        Duration::from_millis(self.min_display_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// One password module combining both stores instead of one per store.
    pub unified_passwords_module: bool,
    /// Show the local store as its own module when not unified.
    pub local_passwords_module: bool,
    /// Report weak and reused passwords.
    pub weak_and_reused_passwords: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            unified_passwords_module: true,
            local_passwords_module: true,
            weak_and_reused_passwords: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckupConfig {
    /// Run a password checkup when the dashboard opens.
    pub run_on_open: bool,
}

impl Default for CheckupConfig {
    fn default() -> Self {
        Self { run_on_open: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub loading: LoadingConfig,
    pub features: FeatureFlags,
    pub checkup: CheckupConfig,
}

impl HubConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: HubConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.loading.min_display_ms == 0 {
            return Err(DashboardError::InvalidConfig(
                "loading.min_display_ms must be positive".to_string(),
            ));
        }
        if self.loading.max_wait_ms <= self.loading.min_display_ms {
            return Err(DashboardError::InvalidConfig(format!(
                "loading.max_wait_ms ({}) must exceed loading.min_display_ms ({})",
                self.loading.max_wait_ms, self.loading.min_display_ms
            )));
        }
        Ok(())
    }
}
