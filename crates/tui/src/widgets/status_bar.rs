//! Header with fleet totals and footer with key hints.

use fm_core::daemon::StateEffects;
use fm_core::format::format_memory;
use fm_protocol::daemon_models::DaemonState;
use fm_protocol::process_models::FleetSummary;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

fn daemon_style(state: DaemonState) -> Style {
    let color = match state {
        DaemonState::Running => Color::Green,
        DaemonState::Stopped => Color::Red,
        DaemonState::Pending => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn render_summary(frame: &mut Frame, area: Rect, summary: &FleetSummary, daemon: DaemonState) {
    let line = Line::from(vec![
        Span::styled(" fleet-monitor ", Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw("  daemon: "),
        Span::styled(daemon.to_string(), daemon_style(daemon)),
        Span::raw(format!(
            "  total {}  online {}  stopped {}  errored {}  undeployed {}  cpu {:.1}%  mem {}",
            summary.total,
            summary.online,
            summary.stopped,
            summary.errored,
            summary.undeployed,
            summary.cpu_percent,
            format_memory(summary.memory_bytes),
        )),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Key hints for the actions enabled right now.
pub fn key_hints(effects: &StateEffects) -> String {
    let mut hints = Vec::new();
    if effects.process_actions_enabled {
        hints.push("s start  x stop  r restart  l reload  d delete  X stop all  R restart all");
    }
    if effects.start_daemon_enabled {
        hints.push("D start daemon");
    }
    if effects.kill_daemon_enabled {
        hints.push("K kill daemon");
    }
    hints.push("f refresh  / command  q quit");
    hints.join("  ")
}

pub fn render_footer(frame: &mut Frame, area: Rect, effects: &StateEffects) {
    let paragraph =
        Paragraph::new(key_hints(effects)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
