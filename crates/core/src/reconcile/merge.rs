//! Merging declared configurations with a live snapshot.

use fm_protocol::config_models::DeclaredProcessConfig;
use fm_protocol::process_models::LiveProcessRecord;
use fm_protocol::process_models::MergedProjectView;
use std::collections::HashMap;

/// Overlay `live` onto `declared`, keyed by name, sorted by name.
///
/// The result holds exactly the declared names. Live records without a
/// declaration are left out. When the supervisor reports several records
/// under one name (cluster instances), the first one is used.
pub fn reconcile(
    declared: &[DeclaredProcessConfig],
    live: &[LiveProcessRecord],
) -> Vec<MergedProjectView> {
    let mut by_name: HashMap<&str, &LiveProcessRecord> = HashMap::with_capacity(live.len());
    for record in live {
        by_name.entry(record.name.as_str()).or_insert(record);
    }

    let mut views: Vec<MergedProjectView> = declared
        .iter()
        .map(|config| MergedProjectView {
            config: config.clone(),
            live: by_name.get(config.name.as_str()).map(|record| (*record).clone()),
        })
        .collect();

    let orphans = live
        .iter()
        .filter(|record| !declared.iter().any(|config| config.name == record.name))
        .count();
    if orphans > 0 {
        tracing::debug!(orphans, "Live processes without a declaration were not merged");
    }

    views.sort_by(|a, b| a.name().cmp(b.name()));
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_protocol::process_models::Monitoring;
    use fm_protocol::process_models::ProcessStatus;

    fn live(name: &str, id: u32, status: ProcessStatus) -> LiveProcessRecord {
        LiveProcessRecord {
            name: name.to_string(),
            id,
            pid: Some(1000 + id),
            status,
            restart_count: 0,
            uptime_start: None,
            monitoring: Monitoring::default(),
            max_memory_bytes: None,
            out_log_path: None,
            err_log_path: None,
        }
    }

    fn declared(names: &[&str]) -> Vec<DeclaredProcessConfig> {
        names
            .iter()
            .map(|name| DeclaredProcessConfig::new(*name, format!("/srv/{name}"), "main.js"))
            .collect()
    }

    #[test]
    fn test_reconcile_sorts_and_keeps_only_declared_names() {
        let views = reconcile(
            &declared(&["web", "api", "cron"]),
            &[live("api", 0, ProcessStatus::Online), live("ghost", 1, ProcessStatus::Online)],
        );

        let names: Vec<&str> = views.iter().map(MergedProjectView::name).collect();
        assert_eq!(names, vec!["api", "cron", "web"]);
        assert_eq!(views[0].status(), ProcessStatus::Online);
        assert_eq!(views[1].status(), ProcessStatus::Undeployed);
    }

    #[test]
    fn test_reconcile_uses_first_record_per_name() {
        let views = reconcile(
            &declared(&["api"]),
            &[live("api", 4, ProcessStatus::Online), live("api", 5, ProcessStatus::Errored)],
        );
        assert_eq!(views[0].live.as_ref().map(|l| l.id), Some(4));
    }

    #[test]
    fn test_reconcile_empty_inputs() {
        assert!(reconcile(&[], &[live("a", 0, ProcessStatus::Online)]).is_empty());
        assert_eq!(reconcile(&declared(&["a"]), &[]).len(), 1);
    }
}
