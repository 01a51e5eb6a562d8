//! Dashboard widget: one table row per declared process.
//!
//! Undeployed rows show dashes for every live column.

use chrono::DateTime;
use chrono::Utc;
use fm_core::format::format_memory;
use fm_core::format::format_uptime;
use fm_protocol::daemon_models::DaemonState;
use fm_protocol::process_models::MergedProjectView;
use fm_protocol::process_models::ProcessStatus;
use ratatui::layout::Constraint;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Cell;
use ratatui::widgets::Row;
use ratatui::widgets::Table;
use ratatui::widgets::TableState;
use ratatui::Frame;

const PLACEHOLDER: &str = "-";

pub fn status_style(status: ProcessStatus) -> Style {
    let color = match status {
        ProcessStatus::Online => Color::Green,
        ProcessStatus::Launching => Color::Cyan,
        ProcessStatus::Stopping | ProcessStatus::Stopped => Color::Yellow,
        ProcessStatus::Errored => Color::Red,
        ProcessStatus::OneLaunchStatus => Color::Magenta,
        ProcessStatus::Undeployed | ProcessStatus::Unknown => Color::DarkGray,
    };
    Style::default().fg(color)
}

/// Cells for one process. Live columns are dashes when undeployed.
fn row_cells(view: &MergedProjectView, now: DateTime<Utc>) -> Vec<Cell<'static>> {
    let status = view.status();
    let name = Cell::from(view.name().to_string());
    let status_cell = Cell::from(status.to_string()).style(status_style(status));

    let Some(live) = &view.live else {
        return vec![
            Cell::from(PLACEHOLDER),
            name,
            status_cell,
            Cell::from(PLACEHOLDER),
            Cell::from(PLACEHOLDER),
            Cell::from(PLACEHOLDER),
            Cell::from(PLACEHOLDER),
        ];
    };

    let uptime = match (status, live.uptime_start) {
        (ProcessStatus::Online, Some(start)) => format_uptime(start, now),
        _ => PLACEHOLDER.to_string(),
    };
    vec![
        Cell::from(live.id.to_string()),
        name,
        status_cell,
        Cell::from(format!("{:.1}%", live.monitoring.cpu_percent)),
        Cell::from(format_memory(live.monitoring.memory_bytes)),
        Cell::from(live.restart_count.to_string()),
        Cell::from(uptime),
    ]
}

/// Renders the process table.
///
/// # Arguments
/// * `frame` - The frame to render into
/// * `area` - The area to render the table in
/// * `rows` - Rendered rows, already sorted by name
/// * `selected` - Index of the selected row, if any
/// * `daemon` - Daemon state, shown in the title
/// * `now` - Reference instant for uptimes
pub fn render_dashboard(
    frame: &mut Frame,
    area: Rect,
    rows: &[MergedProjectView],
    selected: Option<usize>,
    daemon: DaemonState,
    now: DateTime<Utc>,
) {
    let table_rows: Vec<Row> = rows.iter().map(|view| Row::new(row_cells(view, now))).collect();

    let header = Row::new(vec![
        Cell::from("ID"),
        Cell::from("Name"),
        Cell::from("Status"),
        Cell::from("CPU"),
        Cell::from("Memory"),
        Cell::from("Restarts"),
        Cell::from("Uptime"),
    ])
    .style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Cyan),
    );

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(30),
        Constraint::Length(18),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(10),
    ];

    let title = format!("Processes - daemon {daemon}");
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(Color::White)),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    table_state.select(selected.filter(|index| *index < rows.len()));

    frame.render_stateful_widget(table, area, &mut table_state);
}
