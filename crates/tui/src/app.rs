//! TUI application state and event loop.
//!
//! `App` wraps the core [`Controller`] with the pieces only a terminal needs:
//! the selected row index, the command line, log scrolling and the poll
//! timer. The loop selects over worker events, terminal input and the poll
//! tick; the tick is live only while the controller says to poll.

use anyhow::Result;
use chrono::Utc;
use crossterm::event::KeyEvent;
use fm_core::controller::Controller;
use fm_core::controller::Notification;
use fm_core::controller::UiEffect;
use fm_core::daemon::Overlay;
use fm_core::fleet::InitialState;
use fm_protocol::ipc::Event;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::Frame;
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;

use crate::event::EventStatus;
use crate::event_handler::action_for_key;
use crate::event_handler::apply_setting;
use crate::event_handler::parse_command;
use crate::event_handler::Action;
use crate::event_handler::Command;
use crate::tui::Tui;
use crate::tui::TuiEvent;
use crate::widgets::dashboard::render_dashboard;
use crate::widgets::detail_view::max_scroll;
use crate::widgets::detail_view::SUMMARY_HEIGHT;
use crate::widgets::overlay::render_blocking;
use crate::widgets::overlay::render_notification;
use crate::widgets::status_bar::render_footer;
use crate::widgets::status_bar::render_summary;
use crate::widgets::CommandLine;
use crate::widgets::DetailView;

pub struct App {
    controller: Controller,
    events_rx: UnboundedReceiver<Event>,
    command_line: CommandLine,
    detail: DetailView,
    /// Row index of the selection, kept so a removed row can hand the
    /// selection to its neighbour.
    selected_index: usize,
    /// Lines visible in the log pane at the last draw.
    log_viewport: usize,
    poll_interval: Duration,
    should_exit: bool,
}

impl App {
    pub fn new(
        controller: Controller,
        events_rx: UnboundedReceiver<Event>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            controller,
            events_rx,
            command_line: CommandLine::new(),
            detail: DetailView::new(),
            selected_index: 0,
            log_viewport: 10,
            poll_interval,
            should_exit: false,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    /// Apply the startup snapshot fetched before the worker took the client.
    pub fn bootstrap(&mut self, initial: InitialState) {
        let effects = self.controller.bootstrap(initial);
        self.apply_effects(effects);
    }

    /// Main event loop.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut tui_events = tui.event_stream();
        let frames = tui.frame_requester();

        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll.reset();

        frames.schedule_frame();

        while !self.should_exit {
            select! {
                Some(event) = self.events_rx.recv() => {
                    let effects = self.controller.handle_event(event);
                    if self.apply_effects(effects) {
                        poll.reset();
                    }
                    frames.schedule_frame();
                }
                Some(tui_event) = tui_events.next() => match tui_event {
                    TuiEvent::Key(key) => {
                        if self.handle_key_event(key) {
                            poll.reset();
                        }
                        frames.schedule_frame();
                    }
                    TuiEvent::Paste(text) => {
                        self.command_line.paste(&text);
                        frames.schedule_frame();
                    }
                    TuiEvent::Draw => tui.draw(|frame| self.render(frame))?,
                },
                _ = poll.tick(), if self.controller.is_polling() => self.poll(),
                else => {
                    tracing::warn!("Event sources closed; leaving the UI");
                    break;
                }
            }
        }

        Ok(())
    }

    /// One poll tick: refresh the list, and the logs of a deployed selection.
    fn poll(&mut self) {
        self.controller.refresh();
        if self
            .controller
            .selected_view()
            .is_some_and(|view| view.is_deployed())
        {
            let effects = self.controller.refresh_logs();
            self.apply_effects(effects);
        }
    }

    /// Carry out controller effects.
    ///
    /// Returns `true` when polling was just started, so the caller can
    /// restart its timer from now.
    pub fn apply_effects(&mut self, effects: Vec<UiEffect>) -> bool {
        let mut poll_started = false;
        for effect in effects {
            match effect {
                UiEffect::StartPolling => poll_started = true,
                UiEffect::StopPolling => {}
                UiEffect::StateChanged(transition) => {
                    if matches!(transition.effects.overlay, Overlay::Blocking(_)) {
                        self.command_line.close();
                    }
                }
                UiEffect::ViewChanged(_) => self.sync_selection(),
                UiEffect::LogsUpdated { .. } => {
                    let max = max_scroll(self.controller.selected_logs(), self.log_viewport);
                    self.detail.scroll_to_bottom(max);
                }
                UiEffect::Notify(notification) => {
                    tracing::debug!(title = %notification.title, "Notification shown");
                }
            }
        }
        poll_started
    }

    /// Keep the selection on an existing row after the list changed.
    fn sync_selection(&mut self) {
        let rows = self.controller.rows();
        let current = self
            .controller
            .selected()
            .and_then(|name| rows.iter().position(|row| row.name() == name));
        if let Some(index) = current {
            self.selected_index = index;
            return;
        }
        let fallback = match rows.len() {
            0 => None,
            len => Some(self.selected_index.min(len - 1)),
        };
        self.select_index(fallback);
    }

    fn select_index(&mut self, index: Option<usize>) {
        let name = index
            .and_then(|i| self.controller.rows().get(i))
            .map(|row| row.name().to_string());
        if let Some(i) = index {
            self.selected_index = i;
        }
        if name.as_deref() != self.controller.selected() {
            self.detail.scroll_to_top();
        }
        let effects = self.controller.select(name.as_deref());
        self.apply_effects(effects);
    }

    fn select_name(&mut self, name: &str) {
        let index = self
            .controller
            .rows()
            .iter()
            .position(|row| row.name() == name);
        if index.is_some() {
            self.select_index(index);
        }
    }

    fn is_blocked(&self) -> bool {
        matches!(self.controller.effects().overlay, Overlay::Blocking(_))
    }

    /// Route a key to the command line, then to the key map.
    ///
    /// Returns `true` when polling was just started.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        match self.command_line.handle_key_event(key) {
            EventStatus::Submitted(line) => return self.run_command(&line),
            EventStatus::Consumed => return false,
            EventStatus::NotConsumed => {}
        }

        let Some(action) = action_for_key(key) else {
            return false;
        };
        if self.is_blocked() && !action.allowed_while_blocked() {
            tracing::debug!(?action, "Ignoring key while the daemon state is pending");
            return false;
        }
        self.handle_action(action)
    }

    fn handle_action(&mut self, action: Action) -> bool {
        let effects = match action {
            Action::Quit => {
                self.should_exit = true;
                return false;
            }
            Action::SelectPrevious => {
                if !self.controller.rows().is_empty() {
                    self.select_index(Some(self.selected_index.saturating_sub(1)));
                }
                return false;
            }
            Action::SelectNext => {
                let len = self.controller.rows().len();
                if len > 0 {
                    let next = if self.controller.selected().is_none() {
                        0
                    } else {
                        (self.selected_index + 1).min(len - 1)
                    };
                    self.select_index(Some(next));
                }
                return false;
            }
            Action::OpenCommandLine => {
                self.command_line.open();
                return false;
            }
            Action::DismissNotification => {
                self.controller.dismiss_notification();
                return false;
            }
            Action::ScrollLogsUp => {
                self.detail.scroll_up();
                return false;
            }
            Action::ScrollLogsDown => {
                self.detail.scroll_down(self.log_scroll_max());
                return false;
            }
            Action::PageLogsUp => {
                self.detail.page_up(self.log_viewport);
                return false;
            }
            Action::PageLogsDown => {
                self.detail.page_down(self.log_viewport, self.log_scroll_max());
                return false;
            }
            Action::Refresh => {
                self.controller.refresh();
                return false;
            }
            Action::RefreshLogs => self.controller.refresh_logs(),
            Action::StartSelected => self.controller.start_selected(),
            Action::StopSelected => self.controller.stop_selected(),
            Action::RestartSelected => self.controller.restart_selected(),
            Action::ReloadSelected => self.controller.reload_selected(),
            Action::DeleteSelected => self.controller.delete_selected(),
            Action::StopAll => self.controller.stop_all(),
            Action::RestartAll => self.controller.restart_all(),
            Action::StartDaemon => self.controller.request_start_daemon(),
            Action::KillDaemon => self.controller.request_kill_daemon(),
        };
        self.apply_effects(effects)
    }

    fn log_scroll_max(&self) -> usize {
        max_scroll(self.controller.selected_logs(), self.log_viewport)
    }

    fn run_command(&mut self, line: &str) -> bool {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                let effect = self
                    .controller
                    .notify(Notification::error("Invalid command", message));
                return self.apply_effects(vec![effect]);
            }
        };
        tracing::debug!(?command, "Running command");

        match command {
            Command::Quit => {
                self.should_exit = true;
                false
            }
            Command::Logs => {
                let effects = self.controller.refresh_logs();
                self.apply_effects(effects)
            }
            Command::Add { name, path, script } => {
                let effects = self.controller.add_project(&name, &path, &script);
                let started = self.apply_effects(effects);
                self.select_name(name.trim());
                started
            }
            Command::Remove { name } => {
                let effects = self.controller.remove_project(&name);
                self.apply_effects(effects)
            }
            Command::Set { name, key, value } => {
                let Some(mut config) = self.controller.store().find(&name).cloned() else {
                    let effect = self.controller.notify(Notification::error(
                        "Update failed",
                        format!("No project named '{name}'"),
                    ));
                    return self.apply_effects(vec![effect]);
                };
                if let Err(message) = apply_setting(&mut config, &key, &value) {
                    let effect = self
                        .controller
                        .notify(Notification::error("Update failed", message));
                    return self.apply_effects(vec![effect]);
                }
                let effects = self.controller.reconfigure_project(&name, config);
                self.apply_effects(effects)
            }
        }
    }

    /// Draw the whole screen.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let bottom_height = if self.command_line.is_open() { 3 } else { 1 };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(bottom_height),
            ])
            .split(area);
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);

        let state = self.controller.state();
        let effects = self.controller.effects();
        render_summary(frame, rows[0], &self.controller.summary(), state);

        let selected = self
            .controller
            .selected()
            .and(Some(self.selected_index));
        render_dashboard(
            frame,
            main[0],
            self.controller.rows(),
            selected,
            state,
            Utc::now(),
        );

        self.log_viewport = main[1]
            .height
            .saturating_sub(SUMMARY_HEIGHT + 2)
            .max(1) as usize;
        self.detail.render(
            frame,
            main[1],
            self.controller.selected_view(),
            self.controller.selected_logs(),
        );

        if self.command_line.is_open() {
            self.command_line.render(frame, rows[2]);
        } else {
            render_footer(frame, rows[2], &effects);
        }

        if let Some(notification) = self.controller.notification() {
            render_notification(frame, area, notification);
        }
        if let Overlay::Blocking(message) = &effects.overlay {
            render_blocking(frame, area, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use crossterm::event::KeyModifiers;
    use fm_core::store::ProjectStore;
    use fm_protocol::daemon_models::DaemonState;
    use fm_protocol::ipc::Op;
    use fm_protocol::process_models::LiveProcessRecord;
    use fm_protocol::process_models::Monitoring;
    use fm_protocol::process_models::ProcessStatus;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;
    use tokio::sync::mpsc::unbounded_channel;

    struct Fixture {
        app: App,
        ops_rx: UnboundedReceiver<Op>,
        _dir: TempDir,
    }

    impl Fixture {
        fn new(names: &[&str]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut store = ProjectStore::open(dir.path().join("projects.json"));
            for name in names {
                assert!(store.add(name, &format!("/srv/{name}"), "main.js"));
            }
            let (ops_tx, ops_rx) = unbounded_channel();
            let (_events_tx, events_rx) = unbounded_channel();
            let controller = Controller::new(store, ops_tx);
            Self {
                app: App::new(controller, events_rx, Duration::from_secs(5)),
                ops_rx,
                _dir: dir,
            }
        }

        fn running_with(names: &[&str], live: &[&str]) -> Self {
            let mut fixture = Self::new(names);
            fixture.app.bootstrap(InitialState {
                live: live.iter().map(|name| online(name)).collect(),
                daemon_running: true,
            });
            fixture
        }

        fn key(&mut self, code: KeyCode) {
            self.app
                .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
        }

        fn type_command(&mut self, line: &str) {
            for c in line.chars() {
                self.key(KeyCode::Char(c));
            }
            self.key(KeyCode::Enter);
        }

        fn ops(&mut self) -> Vec<Op> {
            let mut ops = Vec::new();
            while let Ok(op) = self.ops_rx.try_recv() {
                ops.push(op);
            }
            ops
        }

        fn screen(&mut self) -> String {
            let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
            terminal.draw(|frame| self.app.render(frame)).unwrap();
            terminal
                .backend()
                .buffer()
                .content()
                .iter()
                .map(|cell| cell.symbol())
                .collect()
        }
    }

    fn online(name: &str) -> LiveProcessRecord {
        LiveProcessRecord {
            name: name.to_string(),
            id: 0,
            pid: Some(100),
            status: ProcessStatus::Online,
            restart_count: 0,
            uptime_start: None,
            monitoring: Monitoring::default(),
            max_memory_bytes: None,
            out_log_path: None,
            err_log_path: None,
        }
    }

    #[test]
    fn test_pending_ui_blocks_actions_but_not_quit() {
        let mut fixture = Fixture::new(&["api"]);
        assert!(fixture.screen().contains("Loading state..."));

        fixture.key(KeyCode::Char('X'));
        fixture.key(KeyCode::Char('f'));
        assert!(fixture.ops().is_empty());

        fixture.key(KeyCode::Char('q'));
        assert!(fixture.app.should_exit());
    }

    #[test]
    fn test_running_ui_renders_rows_and_selects_first() {
        let mut fixture = Fixture::running_with(&["api", "worker"], &["api"]);

        let screen = fixture.screen();
        assert!(screen.contains("daemon: running"));
        assert!(screen.contains("online"));
        assert!(screen.contains("undeployed"));
        assert!(!screen.contains("Loading state..."));

        assert_eq!(fixture.app.controller().selected(), Some("api"));
        assert_eq!(
            fixture.ops(),
            vec![Op::FetchLogs {
                target: "api".to_string()
            }]
        );
    }

    #[test]
    fn test_navigation_and_process_actions() {
        let mut fixture = Fixture::running_with(&["api", "worker"], &["api", "worker"]);
        fixture.ops();

        fixture.key(KeyCode::Down);
        assert_eq!(fixture.app.controller().selected(), Some("worker"));
        fixture.key(KeyCode::Down);
        assert_eq!(fixture.app.controller().selected(), Some("worker"));

        fixture.key(KeyCode::Char('r'));
        fixture.key(KeyCode::Char('R'));
        assert_eq!(
            fixture.ops(),
            vec![
                Op::FetchLogs {
                    target: "worker".to_string()
                },
                Op::RestartProcess {
                    target: "worker".to_string()
                },
                Op::RestartAll,
            ]
        );
    }

    #[test]
    fn test_add_command_selects_new_project() {
        let mut fixture = Fixture::running_with(&["api"], &["api"]);
        fixture.ops();

        fixture.key(KeyCode::Char('/'));
        fixture.type_command("add web /srv/web index.js");

        assert!(fixture.app.controller().store().find("web").is_some());
        assert_eq!(fixture.app.controller().selected(), Some("web"));
        assert_eq!(fixture.ops(), vec![Op::RefreshList]);
        assert!(fixture.screen().contains("Project 'web' added."));
    }

    #[test]
    fn test_set_command_reconfigures_deployed_project() {
        let mut fixture = Fixture::running_with(&["api"], &["api"]);
        fixture.ops();

        fixture.key(KeyCode::Char('/'));
        fixture.type_command("set api env.PORT=9000");

        let config = fixture.app.controller().store().find("api").cloned().unwrap();
        assert_eq!(config.env.get("PORT").map(String::as_str), Some("9000"));
        assert_eq!(
            fixture.ops(),
            vec![Op::DeleteProcess {
                target: "api".to_string()
            }]
        );
    }

    #[test]
    fn test_invalid_command_is_reported() {
        let mut fixture = Fixture::running_with(&["api"], &[]);
        fixture.key(KeyCode::Char('/'));
        fixture.type_command("launch api");

        let notification = fixture.app.controller().notification().cloned().unwrap();
        assert_eq!(notification.title, "Invalid command");

        fixture.key(KeyCode::Esc);
        assert!(fixture.app.controller().notification().is_none());
    }

    #[test]
    fn test_removing_selected_project_moves_selection() {
        let mut fixture = Fixture::running_with(&["api", "web"], &[]);
        fixture.key(KeyCode::Down);
        assert_eq!(fixture.app.controller().selected(), Some("web"));

        fixture.key(KeyCode::Char('/'));
        fixture.type_command("remove web");

        assert_eq!(fixture.app.controller().selected(), Some("api"));
    }

    #[test]
    fn test_kill_shows_overlay_and_closes_command_line() {
        let mut fixture = Fixture::running_with(&["api"], &["api"]);
        fixture.ops();

        fixture.key(KeyCode::Char('K'));
        assert_eq!(fixture.app.controller().state(), DaemonState::Pending);
        assert_eq!(fixture.ops(), vec![Op::KillDaemon]);
        assert!(fixture.screen().contains("Killing daemon..."));

        // The daemon reports back down: overlay gone, list shows undeployed.
        let effects = fixture
            .app
            .controller
            .handle_event(Event::DaemonStatus { running: false });
        let poll_started = fixture.app.apply_effects(effects);
        assert!(!poll_started);
        let screen = fixture.screen();
        assert!(!screen.contains("Killing daemon..."));
        assert!(screen.contains("undeployed"));
    }
}
