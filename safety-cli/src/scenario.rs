//! JSON scenarios scripting the checker, the persisted counters and the
//! user's input for one dashboard session.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use safety_dashboard::DashboardSession;
use safety_dashboard::DashboardViewModel;
use safety_dashboard::HubConfig;
use safety_model::ActionRequest;
use safety_model::ButtonSlot;
use safety_model::MemoryCounterStore;
use safety_model::ModuleOption;
use safety_sources::CheckDomain;
use safety_sources::CheckerError;
use safety_sources::Counts;
use safety_sources::StaticChecker;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::error::Result;
use crate::error::ScenarioError;

/// Scripted answer for one check domain: either counts or `{"error": ".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioResponse {
    Failure { error: String },
    Counts(Counts),
}

impl ScenarioResponse {
    fn into_result(self, domain: CheckDomain) -> std::result::Result<Counts, CheckerError> {
        match self {
            ScenarioResponse::Failure { error } => Err(CheckerError::Failed {
                domain,
                reason: error,
            }),
            ScenarioResponse::Counts(counts) => Ok(counts),
        }
    }
}

/// A button press issued once the dashboard has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInput {
    pub option: ModuleOption,
    pub slot: ButtonSlot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Counters persisted by an earlier session, keyed like
    /// `safety_hub.account_passwords.total`.
    pub counters: BTreeMap<String, i64>,
    /// Domains without a response fail as unreachable.
    pub responses: BTreeMap<CheckDomain, ScenarioResponse>,
    pub delays_ms: BTreeMap<CheckDomain, u64>,
    /// Counts a checkup produces, replacing the domain's response.
    pub checkup_results: BTreeMap<CheckDomain, Counts>,
    /// Skip every checkup as if the provider were cooling down.
    pub cooldown: bool,
    /// Sign-in change applied after the first settle.
    pub signed_in: Option<bool>,
    pub actions: Vec<ActionInput>,
}

impl Scenario {
    pub fn from_json(path: &Path, contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|source| ScenarioError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &contents)
    }

    pub fn checker(&self) -> StaticChecker {
        let checker = StaticChecker::new();
        for (domain, response) in &self.responses {
            checker.set_response(*domain, response.clone().into_result(*domain));
        }
        for (domain, delay_ms) in &self.delays_ms {
            checker.set_delay(*domain, Duration::from_millis(*delay_ms));
        }
        for (domain, counts) in &self.checkup_results {
            checker.set_checkup_result(*domain, *counts);
        }
        checker.set_cooldown(self.cooldown);
        checker
    }

    pub fn store(&self) -> MemoryCounterStore {
        MemoryCounterStore::with_values(self.counters.clone())
    }
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub view: DashboardViewModel,
    pub actions: Vec<ActionRequest>,
    /// Counters as persisted when the session closed.
    pub counters: BTreeMap<String, i64>,
}

/// Runs a session against the scenario until it settles, then presses the
/// scripted buttons.
pub async fn run_scenario(scenario: &Scenario, config: HubConfig) -> Result<ScenarioReport> {
    let checker = Arc::new(scenario.checker());
    let store = Arc::new(scenario.store());
    let mut session = DashboardSession::new(config, checker, store.clone())?;

    session.start();
    session.run_until_settled().await;
    if let Some(signed_in) = scenario.signed_in {
        session.set_signed_in(signed_in);
        session.run_until_settled().await;
    }

    let mut actions = Vec::new();
    for input in &scenario.actions {
        match session.press(input.option, input.slot) {
            Some(request) => actions.push(request),
            None => warn!(option = %input.option, slot = ?input.slot, "button has no action"),
        }
    }

    let view = session.view_model().clone();
    session.close();
    info!(
        modules = view.entries.len(),
        browser_safe = view.browser_safe,
        "scenario settled"
    );
    Ok(ScenarioReport {
        view,
        actions,
        counters: store.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use safety_model::ModuleAction;
    use safety_model::Severity;

    const HEALTHY: &str = r#"{
        "responses": {
            "account_passwords": {"kind": "passwords", "total": 10, "compromised": 0, "weak": 0, "reused": 0},
            "local_passwords": {"kind": "passwords", "total": 3, "compromised": 0, "weak": 0, "reused": 0},
            "update": {"kind": "update", "state": "up_to_date"},
            "safe_browsing": {"kind": "safe_browsing", "mode": "enhanced"},
            "unused_permissions": {"kind": "unused_permissions", "sites": 0},
            "notification_review": {"kind": "notification_review", "sites": 0}
        }
    }"#;

    fn healthy() -> Scenario {
        Scenario::from_json(Path::new("healthy.json"), HEALTHY).unwrap()
    }

    #[test]
    fn test_parses_counts_and_failures() {
        let json = r#"{
            "responses": {
                "update": {"error": "version service down"},
                "unused_permissions": {"kind": "unused_permissions", "sites": 2}
            },
            "delays_ms": {"local_passwords": 250},
            "signed_in": false,
            "actions": [{"option": "unused_permissions", "slot": "primary"}]
        }"#;
        let scenario = Scenario::from_json(Path::new("s.json"), json).unwrap();

        assert_eq!(
            scenario.responses[&CheckDomain::Update],
            ScenarioResponse::Failure {
                error: "version service down".to_string()
            }
        );
        assert_eq!(
            scenario.responses[&CheckDomain::UnusedPermissions],
            ScenarioResponse::Counts(Counts::UnusedPermissions { sites: 2 })
        );
        assert_eq!(scenario.delays_ms[&CheckDomain::LocalPasswords], 250);
        assert_eq!(scenario.signed_in, Some(false));
        assert_eq!(
            scenario.actions,
            vec![ActionInput {
                option: ModuleOption::UnusedPermissions,
                slot: ButtonSlot::Primary,
            }]
        );
        assert!(!scenario.cooldown);
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = Scenario::from_json(Path::new("broken.json"), "{").unwrap_err();
        assert!(matches!(err, ScenarioError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthy.json");
        std::fs::write(&path, HEALTHY).unwrap();
        assert_eq!(Scenario::load(&path).unwrap(), healthy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_scenario_is_safe() {
        let report = run_scenario(&healthy(), HubConfig::default()).await.unwrap();

        assert!(report.view.browser_safe);
        assert_eq!(report.view.entries.len(), 5);
        assert!(report.actions.is_empty());
        assert_eq!(report.counters["safety_hub.account_passwords.total"], 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_and_actions() {
        let mut scenario = healthy();
        scenario.responses.insert(
            CheckDomain::Update,
            ScenarioResponse::Failure {
                error: "offline".to_string(),
            },
        );
        scenario.responses.insert(
            CheckDomain::UnusedPermissions,
            ScenarioResponse::Counts(Counts::UnusedPermissions { sites: 1 }),
        );
        scenario.actions = vec![
            ActionInput {
                option: ModuleOption::UnusedPermissions,
                slot: ButtonSlot::Primary,
            },
            ActionInput {
                option: ModuleOption::UpdateCheck,
                slot: ButtonSlot::Primary,
            },
        ];

        let report = run_scenario(&scenario, HubConfig::default()).await.unwrap();

        let update = report.view.entry(ModuleOption::UpdateCheck).unwrap();
        assert_eq!(update.classification.severity, Severity::Unavailable);
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.actions[0].action, ModuleAction::AcknowledgeRevokedPermissions);
        assert_eq!(
            report.actions[0].snackbar.as_ref().map(|s| s.message.as_str()),
            Some("Permissions review cleared for 1 site")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkup_result_replaces_response() {
        let mut scenario = healthy();
        scenario.checkup_results.insert(
            CheckDomain::AccountPasswords,
            Counts::Passwords(safety_sources::PasswordCounts {
                total: 10,
                compromised: 2,
                weak: 0,
                reused: 0,
                signed_in: true,
                saving_disabled_by_policy: false,
            }),
        );

        let report = run_scenario(&scenario, HubConfig::default()).await.unwrap();

        assert_eq!(report.view.order()[0], ModuleOption::UnifiedPasswords);
        assert!(report.view.has_unmanaged_warning);
        assert_eq!(report.counters["safety_hub.account_passwords.compromised"], 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bundled_mixed_scenario() {
        let scenario = Scenario::from_json(
            Path::new("mixed.json"),
            include_str!("../scenarios/mixed.json"),
        )
        .unwrap();
        let report = run_scenario(&scenario, HubConfig::default()).await.unwrap();

        assert_eq!(
            report.view.order(),
            vec![
                ModuleOption::UnifiedPasswords,
                ModuleOption::UpdateCheck,
                ModuleOption::SafeBrowsing,
                ModuleOption::NotificationReview,
                ModuleOption::UnusedPermissions,
            ]
        );
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.counters["safety_hub.unused_permissions.sites"], 0);
        assert_eq!(report.counters["safety_hub.local_passwords.reused"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config_is_rejected() {
        let mut config = HubConfig::default();
        config.loading.min_display_ms = 0;
        let err = run_scenario(&healthy(), config).await.unwrap_err();
        assert!(matches!(err, ScenarioError::Dashboard(_)));
    }
}
