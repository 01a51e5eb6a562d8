//! # fm-tui
//!
//! Terminal User Interface for fleet-monitor.
//!
//! The UI thread owns a [`fm_core::controller::Controller`]; all supervisor
//! traffic goes through a single `FleetWorker` task over the `Op`/`Event`
//! channels defined in `fm-protocol`.

pub mod app;
pub mod event;
pub mod event_handler;
pub mod tui;
pub mod widgets;

pub use app::App;
pub use tui::Tui;

use anyhow::Context;
use anyhow::Result;
use fm_core::config::loader::default_config_path;
use fm_core::config::loader::load_settings;
use fm_core::config::models::app_data_dir;
use fm_core::controller::Controller;
use fm_core::fleet::FleetClient;
use fm_core::fleet::FleetWorker;
use fm_core::store::ProjectStore;
use fm_core::telemetry;
use fm_core::telemetry::LogTarget;
use fm_protocol::ipc::Op;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;

/// Grace period for an in-flight supervisor command at exit.
const WORKER_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Run the interactive UI until the user quits.
///
/// # Arguments
///
/// * `config_path` - Settings file; `None` uses `$FLEET_CONFIG` or the
///   per-user default.
pub async fn run_app(config_path: Option<PathBuf>) -> Result<()> {
    let config_path = config_path.unwrap_or_else(default_config_path);
    let settings = load_settings(&config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;

    let log_file = app_data_dir().join("fleet.log");
    telemetry::init(LogTarget::File(log_file), &settings.log_level)?;
    tracing::info!(config = %config_path.display(), "Starting fleet-monitor UI");

    let store = ProjectStore::open(settings.projects_path());
    let (events_tx, events_rx) = unbounded_channel();
    let (ops_tx, ops_rx) = unbounded_channel();
    let client = FleetClient::system(&settings, events_tx);

    let controller = Controller::new(store, ops_tx.clone());
    let mut app = App::new(controller, events_rx, settings.poll_interval());

    let mut tui = Tui::init()?;
    // First frame shows the pending overlay while the initial state loads.
    tui.draw(|frame| app.render(frame))?;

    let initial = client.get_initial_state().await;
    app.bootstrap(initial);

    let worker = tokio::spawn(FleetWorker::new(client, ops_rx).run());
    let result = app.run(&mut tui).await;

    let _ = ops_tx.send(Op::Shutdown);
    if tokio::time::timeout(WORKER_SHUTDOWN_GRACE, worker)
        .await
        .is_err()
    {
        tracing::warn!("Fleet worker still busy at exit; abandoning it");
    }

    tui.restore()?;
    tracing::info!("fleet-monitor UI stopped");
    result
}
