//! Detail pane for the selected process: its declaration, live figures and
//! recent logs.
//!
//! The log section scrolls; the summary above it does not.

use fm_core::format::format_memory;
use fm_core::format::parse_memory_threshold;
use fm_protocol::process_models::MergedProjectView;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::widgets::ScrollbarState;
use ratatui::widgets::Wrap;
use ratatui::Frame;

use super::dashboard::status_style;

pub const SUMMARY_HEIGHT: u16 = 9;

/// Scroll state for the log section.
pub struct DetailView {
    pub scroll_offset: usize,
}

fn field(label: &'static str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(Color::Cyan)),
        Span::raw(value.into()),
    ])
}

fn summary_lines(view: &MergedProjectView) -> Vec<Line<'static>> {
    let config = &view.config;
    let status = view.status();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<12}", "Status"), Style::default().fg(Color::Cyan)),
            Span::styled(status.to_string(), status_style(status)),
        ]),
        field("Path", config.path.clone()),
        field("Script", config.script.clone()),
    ];
    if let Some(interpreter) = &config.interpreter {
        lines.push(field("Interpreter", interpreter.clone()));
    }

    // Live threshold wins over the declared one.
    let threshold = view
        .live
        .as_ref()
        .and_then(|live| live.max_memory_bytes)
        .or_else(|| {
            config
                .max_memory_restart
                .as_deref()
                .and_then(parse_memory_threshold)
        });
    if let Some(bytes) = threshold {
        lines.push(field("Mem limit", format_memory(bytes)));
    }

    if let Some(live) = &view.live {
        let pid = live.pid.map_or_else(|| "-".to_string(), |pid| pid.to_string());
        lines.push(field("PID", pid));
    }
    if let Some(out) = view.out_log_path() {
        lines.push(field("Out log", out.to_string()));
    }
    if let Some(err) = view.err_log_path() {
        lines.push(field("Error log", err.to_string()));
    }
    lines
}

impl DetailView {
    pub fn new() -> Self {
        Self { scroll_offset: 0 }
    }

    /// Render the detail pane.
    ///
    /// # Arguments
    ///
    /// * `frame` - The ratatui frame to render to
    /// * `area` - The area to render within
    /// * `view` - The selected process, if any
    /// * `logs` - Log text fetched for that process, if any
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        view: Option<&MergedProjectView>,
        logs: Option<&str>,
    ) {
        let Some(view) = view else {
            let placeholder = Paragraph::new("No process selected.")
                .block(Block::default().borders(Borders::ALL).title("Details"));
            frame.render_widget(placeholder, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(SUMMARY_HEIGHT), Constraint::Min(3)])
            .split(area);

        let summary = Paragraph::new(summary_lines(view))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Details - {}", view.name())),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(summary, chunks[0]);

        let text = match logs {
            Some(logs) if !logs.trim().is_empty() => logs.to_string(),
            _ if !view.is_deployed() => "Not deployed.".to_string(),
            _ => "No logs yet.".to_string(),
        };
        let total_lines = text.lines().count();

        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Logs"))
            .scroll((self.scroll_offset.min(u16::MAX as usize) as u16, 0));
        frame.render_widget(paragraph, chunks[1]);

        let visible_lines = chunks[1].height.saturating_sub(2) as usize;
        if total_lines > visible_lines {
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(total_lines)
                .viewport_content_length(visible_lines)
                .position(self.scroll_offset);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            frame.render_stateful_widget(scrollbar, chunks[1], &mut scrollbar_state);
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Scroll down by one line, up to `max`.
    pub fn scroll_down(&mut self, max: usize) {
        self.scroll_offset = (self.scroll_offset + 1).min(max);
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
    }

    pub fn page_down(&mut self, page_size: usize, max: usize) {
        self.scroll_offset = (self.scroll_offset + page_size).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self, max: usize) {
        self.scroll_offset = max;
    }
}

impl Default for DetailView {
    fn default() -> Self {
        Self::new()
    }
}

/// Largest useful scroll offset for `logs` in a pane of `viewport` lines.
pub fn max_scroll(logs: Option<&str>, viewport: usize) -> usize {
    logs.map_or(0, |logs| logs.lines().count().saturating_sub(viewport))
}
