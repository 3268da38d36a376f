pub mod combine;
pub mod loading;
pub mod reducer;

// Re-export key types for convenience.
pub use combine::{combine, unified_classification};
pub use loading::{LoadingIndicator, LoadingState, LoadingTimer, TimerOutcome};
pub use reducer::{PasswordSide, UnifiedPasswordReducer};
