//! Scripted collaborators for deterministic testing.

use async_trait::async_trait;
use fm_core::executor::CommandExecutor;
use fm_core::executor::CommandLine;
use fm_core::executor::CommandResult;
use fm_core::executor::ProcessInvoker;
use fm_core::fleet::FleetClient;
use fm_core::probe::DaemonProbe;
use fm_protocol::ipc::Event;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedReceiver;

/// What the invoker saw for one `start <descriptor>` call.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct DescriptorSighting {
    pub path: PathBuf,
    /// Contents at invocation time, `None` if the file was missing.
    pub contents: Option<String>,
}

/// Invoker that answers from a per-verb script and records every call.
///
/// Responses are keyed by the first argument (`jlist`, `stop`, `logs`, ...).
/// Queued responses are consumed in order; once a verb's queue is empty the
/// verb's sticky response is used, then the default.
#[derive(Default)]
pub struct ScriptedInvoker {
    calls: Mutex<Vec<CommandLine>>,
    queued: Mutex<HashMap<String, VecDeque<CommandResult>>>,
    sticky: Mutex<HashMap<String, CommandResult>>,
    descriptors: Mutex<Vec<DescriptorSighting>>,
}

#[allow(dead_code)]
impl ScriptedInvoker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every `verb` call with `result`.
    pub fn always(&self, verb: &str, result: CommandResult) {
        self.sticky
            .lock()
            .expect("lock")
            .insert(verb.to_string(), result);
    }

    /// Answer the next `verb` call with `result`.
    pub fn once(&self, verb: &str, result: CommandResult) {
        self.queued
            .lock()
            .expect("lock")
            .entry(verb.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn count(&self, verb: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.args_slice().first().map(String::as_str) == Some(verb))
            .count()
    }

    pub fn descriptors(&self) -> Vec<DescriptorSighting> {
        self.descriptors.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ProcessInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        command: &CommandLine,
        _cwd: Option<&Path>,
        _timeout: Duration,
    ) -> CommandResult {
        self.calls.lock().expect("lock").push(command.clone());

        let args = command.args_slice();
        let verb = args.first().cloned().unwrap_or_default();

        if verb == "start" {
            if let Some(path) = args.get(1).map(PathBuf::from) {
                let contents = std::fs::read_to_string(&path).ok();
                self.descriptors
                    .lock()
                    .expect("lock")
                    .push(DescriptorSighting { path, contents });
            }
        }

        if let Some(result) = self
            .queued
            .lock()
            .expect("lock")
            .get_mut(&verb)
            .and_then(VecDeque::pop_front)
        {
            return result;
        }
        self.sticky
            .lock()
            .expect("lock")
            .get(&verb)
            .cloned()
            .unwrap_or_else(|| CommandResult::Success(String::new()))
    }
}

/// Probe with a settable answer and a call counter.
#[derive(Default)]
pub struct ScriptedProbe {
    running: AtomicBool,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedProbe {
    pub fn new(running: bool) -> Arc<Self> {
        let probe = Self::default();
        probe.running.store(running, Ordering::SeqCst);
        Arc::new(probe)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DaemonProbe for ScriptedProbe {
    async fn is_daemon_running(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.running.load(Ordering::SeqCst)
    }
}

/// A client wired to scripted collaborators, plus its event receiver.
#[allow(dead_code)]
pub struct Harness {
    pub client: FleetClient,
    pub invoker: Arc<ScriptedInvoker>,
    pub probe: Arc<ScriptedProbe>,
    pub events: UnboundedReceiver<Event>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(running: bool) -> Self {
        let invoker = ScriptedInvoker::new();
        let probe = ScriptedProbe::new(running);
        let (tx, events) = unbounded_channel();
        let executor = CommandExecutor::new(invoker.clone(), tx.clone(), Duration::from_secs(15));
        let client = FleetClient::new(executor, probe.clone(), tx, "pm2", 200);
        Self {
            client,
            invoker,
            probe,
            events,
        }
    }

    /// Every event emitted so far.
    pub fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
