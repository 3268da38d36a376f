pub mod config;
pub mod error;
pub mod mediator;
pub mod reconciler;
pub mod session;
pub mod timer;
pub mod view_model;

// Re-export key types for convenience.
pub use config::{CheckupConfig, FeatureFlags, HubConfig, LoadingConfig};
pub use error::{DashboardError, Result};
pub use mediator::{ButtonRecord, ModuleMediator, ModuleRecord};
pub use reconciler::{
    DashboardReconciler, effective_severity, has_unmanaged_warning, is_expanded, order_key,
};
pub use session::{DashboardSession, SessionEvent};
pub use timer::{LoadingTimers, TimerFired};
pub use view_model::{DashboardEntry, DashboardViewModel};
