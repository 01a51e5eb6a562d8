//! The worker loop that owns every supervisor invocation.
//!
//! Operations are handled one at a time in arrival order, so two commands
//! never race on the daemon and events reach the control thread in the order
//! the operations were issued.

use fm_protocol::ipc::Op;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::fleet::client::FleetClient;

pub struct FleetWorker {
    client: FleetClient,
    ops_rx: UnboundedReceiver<Op>,
}

impl FleetWorker {
    pub fn new(client: FleetClient, ops_rx: UnboundedReceiver<Op>) -> Self {
        Self { client, ops_rx }
    }

    /// Serve operations until `Op::Shutdown` or until every sender is gone.
    pub async fn run(mut self) {
        tracing::info!("Fleet worker started");
        while let Some(op) = self.ops_rx.recv().await {
            if !self.client.dispatch(op).await {
                break;
            }
        }
        tracing::info!("Fleet worker stopped");
    }
}

/// Spawn a worker for `client` on the current runtime.
///
/// # Returns
///
/// The operation sender and the worker's task handle.
pub fn spawn_worker(client: FleetClient) -> (UnboundedSender<Op>, JoinHandle<()>) {
    let (ops_tx, ops_rx) = unbounded_channel();
    let handle = tokio::spawn(FleetWorker::new(client, ops_rx).run());
    (ops_tx, handle)
}
