pub mod error;
pub mod render;
pub mod scenario;

// Re-export key types for convenience.
pub use error::{Result, ScenarioError};
pub use render::{OutputFormat, render};
pub use scenario::{ActionInput, Scenario, ScenarioReport, ScenarioResponse, run_scenario};
