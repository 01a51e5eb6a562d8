//! Standalone entry point for the fleet-monitor TUI.
//!
//! The `fleet` binary in `fm-cli` is the usual way in; this one takes no
//! arguments and reads settings from `$FLEET_CONFIG` or the default path.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use fm_tui::run_app;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    run_app(None).await.map_err(|e| eyre!("{e:#}"))
}
