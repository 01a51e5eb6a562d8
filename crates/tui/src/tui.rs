//! Terminal setup and the merged input/redraw event stream.
//!
//! `Tui` puts the terminal into raw mode on the alternate screen and restores
//! it on drop (and from the panic hook). Redraws are requested through a
//! [`FrameRequester`]; any number of requests made before the next frame
//! collapse into one draw.

use anyhow::Result;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::Event;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::execute;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::stdout;
use std::io::Stdout;
use std::pin::Pin;
use std::sync::Arc;
use tokio::select;
use tokio::sync::Notify;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

pub type TerminalBackend = CrosstermBackend<Stdout>;

/// Input and redraw events, in arrival order.
#[derive(Debug)]
pub enum TuiEvent {
    /// A key press. Releases and repeats are filtered out.
    Key(KeyEvent),
    /// Text pasted with bracketed paste.
    Paste(String),
    Draw,
}

pub struct Tui {
    terminal: Terminal<TerminalBackend>,
    frame_notify: Arc<Notify>,
}

impl Tui {
    /// Enter raw mode and the alternate screen.
    pub fn init() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableBracketedPaste)?;
        set_panic_hook();

        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self {
            terminal,
            frame_notify: Arc::new(Notify::new()),
        })
    }

    pub fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    pub fn frame_requester(&self) -> FrameRequester {
        FrameRequester {
            notify: Arc::clone(&self.frame_notify),
        }
    }

    /// Terminal input merged with frame requests.
    pub fn event_stream(&self) -> Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>> {
        let mut input = crossterm::event::EventStream::new();
        let frame_notify = Arc::clone(&self.frame_notify);

        Box::pin(async_stream::stream! {
            loop {
                select! {
                    next = input.next() => match next {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            yield TuiEvent::Key(key);
                        }
                        Some(Ok(Event::Paste(text))) => yield TuiEvent::Paste(text),
                        Some(Ok(Event::Resize(_, _))) => yield TuiEvent::Draw,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Terminal input error");
                        }
                        None => break,
                    },
                    _ = frame_notify.notified() => yield TuiEvent::Draw,
                }
            }
        })
    }

    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Requests a redraw from anywhere in the app.
#[derive(Clone, Debug)]
pub struct FrameRequester {
    notify: Arc<Notify>,
}

impl FrameRequester {
    pub fn schedule_frame(&self) {
        // Stores a permit if the stream is busy, so no request is lost.
        self.notify.notify_one();
    }
}

fn set_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_frame_requests_coalesce() {
        let requester = FrameRequester {
            notify: Arc::new(Notify::new()),
        };
        requester.schedule_frame();
        requester.schedule_frame();

        let notify = Arc::clone(&requester.notify);
        tokio::time::timeout(Duration::from_millis(100), notify.notified())
            .await
            .expect("first request should be pending");
        assert!(
            tokio::time::timeout(Duration::from_millis(50), notify.notified())
                .await
                .is_err(),
            "second request should have been merged into the first"
        );
    }
}
