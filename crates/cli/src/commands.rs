//! One-shot commands.
//!
//! Each command builds its own `FleetClient`, runs to completion on the
//! current task and prints the events it produced. Commands return `false`
//! when an error was reported, which the binary turns into a failing exit
//! status.

use color_eyre::Result;
use fm_core::config::loader::default_config_path;
use fm_core::config::loader::load_settings;
use fm_core::config::models::Settings;
use fm_core::fleet::FleetClient;
use fm_core::reconcile::reconcile;
use fm_core::store::ProjectStore;
use fm_core::telemetry;
use fm_core::telemetry::LogTarget;
use fm_protocol::ipc::Event;
use fm_protocol::ipc::Op;
use fm_protocol::process_models::FleetSummary;
use fm_protocol::process_models::LiveProcessRecord;
use std::path::PathBuf;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::output;

pub struct Context {
    settings: Settings,
}

impl Context {
    /// Load settings and send logs to stderr.
    ///
    /// Only warnings are logged unless `verbose` is set, in which case the
    /// configured level applies. `FLEET_LOG` overrides both.
    pub fn load(config: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let path = config.unwrap_or_else(default_config_path);
        let settings = load_settings(&path)?;
        let level = if verbose {
            settings.log_level.as_str()
        } else {
            "warn"
        };
        telemetry::init(LogTarget::Stderr, level)?;
        tracing::debug!(config = %path.display(), "Settings loaded");
        Ok(Self { settings })
    }

    fn store(&self) -> ProjectStore {
        ProjectStore::open(self.settings.projects_path())
    }

    fn client(&self) -> (FleetClient, UnboundedReceiver<Event>) {
        let (events_tx, events_rx) = unbounded_channel();
        (FleetClient::system(&self.settings, events_tx), events_rx)
    }
}

fn drain(mut events: UnboundedReceiver<Event>) -> Vec<Event> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}

/// Print `events`; the final process list is shown against the store.
fn report(ctx: &Context, events: Vec<Event>) -> bool {
    let mut ok = true;
    let mut last_list: Option<Vec<LiveProcessRecord>> = None;
    for event in events {
        match event {
            Event::ActionFinished { title, message } => output::success(&title, &message),
            Event::Error { message } => {
                output::error(&message);
                ok = false;
            }
            Event::DaemonStatus { running } => output::daemon_status(running),
            Event::ListReady { processes } => last_list = Some(processes),
            Event::LogsReady { logs, .. } => print!("{logs}"),
        }
    }
    if let Some(live) = last_list {
        output::process_table(&reconcile(ctx.store().list(), &live));
    }
    ok
}

pub async fn status(ctx: &Context) -> bool {
    let (client, _events) = ctx.client();
    let initial = client.get_initial_state().await;
    let views = reconcile(ctx.store().list(), &initial.live);

    output::daemon_status(initial.daemon_running);
    output::summary(&FleetSummary::from_views(&views));
    true
}

pub async fn list(ctx: &Context, json: bool) -> Result<bool> {
    let (client, _events) = ctx.client();
    let initial = client.get_initial_state().await;
    let views = reconcile(ctx.store().list(), &initial.live);

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        output::daemon_status(initial.daemon_running);
        output::process_table(&views);
    }
    Ok(true)
}

pub fn projects_list(ctx: &Context) -> bool {
    output::project_list(ctx.store().list());
    true
}

pub fn projects_add(ctx: &Context, name: &str, path: &str, script: &str) -> bool {
    match ctx.store().try_add(name, path, script) {
        Ok(()) => {
            output::success("Project added", &format!("Project '{}' added.", name.trim()));
            true
        }
        Err(e) => {
            output::error(&e.to_string());
            false
        }
    }
}

/// Forget a declaration; a deployed process is deleted from the supervisor first.
pub async fn projects_remove(ctx: &Context, name: &str) -> bool {
    let mut store = ctx.store();
    if store.find(name).is_none() {
        output::error(&format!("No project named '{name}'"));
        return false;
    }

    let (client, events) = ctx.client();
    let initial = client.get_initial_state().await;
    let mut ok = true;
    if initial.live.iter().any(|live| live.name == name) {
        client.delete_process(name).await;
        drop(client);
        ok = report(ctx, drain(events));
    }

    match store.try_remove(name) {
        Ok(()) => {
            output::success("Project removed", &format!("Project '{name}' removed."));
            ok
        }
        Err(e) => {
            output::error(&e.to_string());
            false
        }
    }
}

pub async fn start(ctx: &Context, name: &str) -> bool {
    let Some(config) = ctx.store().find(name).cloned() else {
        output::error(&format!(
            "No project named '{name}'. Declare it with `fleet projects add`."
        ));
        return false;
    };
    control(ctx, Op::StartProcess { config }).await
}

/// Run one control operation and print its outcome and the refreshed list.
pub async fn control(ctx: &Context, op: Op) -> bool {
    let (client, events) = ctx.client();
    client.dispatch(op).await;
    drop(client);
    report(ctx, drain(events))
}

pub async fn logs(ctx: &Context, target: &str) -> bool {
    let (client, events) = ctx.client();
    client.fetch_logs(target).await;
    drop(client);

    let events = drain(events);
    if events.is_empty() {
        output::error(&format!("No logs available for '{target}'"));
        return false;
    }
    report(ctx, events)
}
