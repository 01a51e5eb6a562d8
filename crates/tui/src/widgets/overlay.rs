//! Popups drawn over the main layout.
//!
//! The blocking overlay covers the screen while the daemon state is pending
//! and swallows all input except quit. Notifications sit at the bottom and
//! are dismissed with Esc.

use fm_core::controller::Notification;
use fm_core::controller::NotificationKind;
use ratatui::layout::Alignment;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Frame;

/// A `width` x `height` rectangle centered in `area`, clipped to it.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn render_blocking(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(44, 5, area);
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Please wait")
                .style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

pub fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let color = match notification.kind {
        NotificationKind::Info => Color::Green,
        NotificationKind::Error => Color::Red,
    };
    let lines = notification.message.lines().count().max(1) as u16;
    let height = (lines + 2).min(area.height / 2).max(3);
    let popup = Rect {
        x: area.x + 2,
        y: area.y + area.height.saturating_sub(height + 2),
        width: area.width.saturating_sub(4),
        height,
    };

    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(notification.message.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} (Esc to dismiss)", notification.title))
                .style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}
