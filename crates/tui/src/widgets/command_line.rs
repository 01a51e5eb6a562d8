//! Single-line command input, opened with `/`.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::event::EventStatus;

#[derive(Debug, Default)]
pub struct CommandLine {
    /// `None` while closed.
    buffer: Option<String>,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn open(&mut self) {
        self.buffer = Some("/".to_string());
    }

    pub fn close(&mut self) {
        self.buffer = None;
    }

    pub fn text(&self) -> &str {
        self.buffer.as_deref().unwrap_or_default()
    }

    /// Insert pasted text, dropping newlines.
    pub fn paste(&mut self, text: &str) {
        if let Some(buffer) = &mut self.buffer {
            buffer.extend(text.chars().filter(|c| *c != '\n' && *c != '\r'));
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> EventStatus {
        let Some(buffer) = &mut self.buffer else {
            return EventStatus::NotConsumed;
        };

        match key.code {
            KeyCode::Esc => self.buffer = None,
            KeyCode::Enter => {
                let line = buffer.trim().to_string();
                self.buffer = None;
                return EventStatus::Submitted(line);
            }
            KeyCode::Backspace => {
                buffer.pop();
                if buffer.is_empty() {
                    self.buffer = None;
                }
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                buffer.clear();
                buffer.push('/');
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
        EventStatus::Consumed
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(self.text().to_string())
            .style(Style::default().fg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Command (Enter to run, Esc to cancel)"),
            );
        frame.render_widget(paragraph, area);
    }
}
