use std::fmt::Write as _;

use clap::ValueEnum;
use safety_dashboard::DashboardEntry;
use safety_model::ModuleOption;
use safety_model::Severity;

use crate::scenario::ScenarioReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn render(report: &ScenarioReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "warning",
        Severity::Unavailable => "unavailable",
        Severity::Info => "info",
        Severity::Safe => "safe",
    }
}

fn headline(report: &ScenarioReport) -> &'static str {
    let view = &report.view;
    if view.browser_safe {
        "Your browser is safe"
    } else if view.has_unmanaged_warning {
        "Some settings need your attention"
    } else {
        "Review the modules below"
    }
}

fn write_entry(out: &mut String, entry: &DashboardEntry) {
    let severity = severity_label(entry.classification.severity);
    let managed = if entry.classification.is_managed {
        " (managed)"
    } else {
        ""
    };
    let _ = writeln!(out, "  [{severity}] {}{managed}", entry.record.title);
    // Collapsed modules only show their title.
    if !entry.expanded {
        return;
    }
    let _ = writeln!(out, "      {}", entry.record.summary);
    for button in [&entry.record.primary_button, &entry.record.secondary_button]
        .into_iter()
        .flatten()
    {
        let _ = writeln!(out, "      > {}", button.label);
    }
}

fn render_text(report: &ScenarioReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", headline(report));
    for entry in &report.view.entries {
        write_entry(&mut out, entry);
    }
    if !report.view.loading.is_empty() {
        let loading: Vec<_> = report
            .view
            .loading
            .iter()
            .copied()
            .map(ModuleOption::key)
            .collect();
        let _ = writeln!(out, "Still loading: {}", loading.join(", "));
    }
    for request in &report.actions {
        let _ = write!(out, "Action {} on {}", request.action.label(), request.option);
        match &request.snackbar {
            Some(snackbar) if snackbar.undoable => {
                let _ = writeln!(out, ": {} (undo)", snackbar.message);
            }
            Some(snackbar) => {
                let _ = writeln!(out, ": {}", snackbar.message);
            }
            None => out.push('\n'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use safety_dashboard::DashboardReconciler;
    use safety_model::ActionRequest;
    use safety_model::ModuleAction;
    use safety_model::ModuleClassification;
    use safety_model::ModuleKind;
    use safety_model::Snackbar;
    use safety_model::UpdateStatus;
    use std::collections::BTreeMap;

    fn report(status: UpdateStatus, actions: Vec<ActionRequest>) -> ScenarioReport {
        let mut reconciler = DashboardReconciler::new();
        reconciler.register(ModuleOption::UpdateCheck);
        reconciler.module_changed(ModuleClassification::new(
            ModuleOption::UpdateCheck,
            ModuleKind::Update { status },
            false,
        ));
        ScenarioReport {
            view: reconciler.view_model().clone(),
            actions,
            counters: BTreeMap::new(),
        }
    }

    #[test]
    fn test_safe_dashboard_text() {
        let report = report(UpdateStatus::UpToDate, Vec::new());
        let text = render(&report, OutputFormat::Text).unwrap();
        assert_eq!(text, "Your browser is safe\n  [safe] Browser is up to date\n");
    }

    #[test]
    fn test_warning_is_expanded_with_buttons() {
        let actions = vec![ActionRequest {
            option: ModuleOption::NotificationReview,
            action: ModuleAction::ResetAllNotifications,
            snackbar: Some(Snackbar {
                message: "Notifications reset for 2 sites".to_string(),
                undoable: true,
            }),
        }];
        let report = report(UpdateStatus::UpdateAvailable, actions);
        let text = render(&report, OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "Some settings need your attention\n\
             \x20 [warning] Update available\n\
             \x20     Update now to get the latest security fixes\n\
             \x20     > Update\n\
             Action Reset all on notification_review: Notifications reset for 2 sites (undo)\n"
        );
    }

    #[test]
    fn test_json_output_is_the_report() {
        let report = report(UpdateStatus::UpToDate, Vec::new());
        let json = render(&report, OutputFormat::Json).unwrap();
        let parsed: ScenarioReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
