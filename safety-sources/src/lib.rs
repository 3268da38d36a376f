pub mod checker;
pub mod error;
pub mod notifications;
pub mod passwords;
pub mod permissions;
pub mod safe_browsing;
pub mod source;
pub mod static_checker;
pub mod update;

// Re-export key types for convenience.
pub use checker::{
    CheckDomain, Counts, PasswordCounts, SafeBrowsingMode, SecurityChecker, UpdateState,
};
pub use error::{CheckerError, Result};
pub use notifications::NotificationReviewState;
pub use passwords::{PasswordSnapshot, PasswordSourceState, classify_passwords};
pub use permissions::UnusedPermissionsState;
pub use safe_browsing::SafeBrowsingState;
pub use source::{DataSource, FetchOutcome, ModuleSource, ModuleState, SourceContext, SourceEvent};
pub use static_checker::StaticChecker;
pub use update::UpdateCheckState;
