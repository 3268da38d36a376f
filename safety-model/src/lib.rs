pub mod action;
pub mod classification;
pub mod copy;
pub mod counters;
pub mod fetched;
pub mod kind;
pub mod module;
pub mod observer;
pub mod severity;

// Re-export key types for convenience.
pub use action::{ActionRequest, ButtonSlot, ModuleAction, Snackbar};
pub use classification::ModuleClassification;
pub use copy::{ModuleCopy, copy_for};
pub use counters::{CounterStore, MemoryCounterStore, UNAVAILABLE_COUNT, counter_key};
pub use fetched::Fetched;
pub use kind::{
    ModuleKind, NotificationReviewStatus, PasswordScope, PasswordStatus, SafeBrowsingStatus,
    UnusedPermissionsStatus, UpdateStatus,
};
pub use module::ModuleOption;
pub use observer::{Observer, ObserverId, ObserverList};
pub use severity::{Severity, StatusIcon};
