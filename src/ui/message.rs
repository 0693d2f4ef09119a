use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Paragraph, Widget};

use crate::theme::Theme;

/// How long a message stays on the bar.
const DISPLAY_FOR: Duration = Duration::from_secs(5);

/// The one-row message bar. Every user-visible failure in the program
/// lands here; nothing propagates across the event loop.
#[derive(Debug, Default)]
pub struct MessageBar {
  current: Option<Message>,
}

#[derive(Debug)]
struct Message {
  text: String,
  is_error: bool,
  shown_at: Instant,
}

impl MessageBar {
  pub fn info(&mut self, text: impl Into<String>) {
    self.current = Some(Message { text: text.into(), is_error: false, shown_at: Instant::now() });
  }

  pub fn error(&mut self, text: impl Into<String>) {
    self.current = Some(Message { text: text.into(), is_error: true, shown_at: Instant::now() });
  }

  pub fn current(&self) -> Option<(&str, bool)> {
    self
      .current
      .as_ref()
      .filter(|m| m.shown_at.elapsed() < DISPLAY_FOR)
      .map(|m| (m.text.as_str(), m.is_error))
  }

  pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
    let Some((text, is_error)) = self.current() else {
      return;
    };
    let color = if is_error { theme.error } else { theme.info };
    Paragraph::new(text)
      .style(Style::default().fg(color))
      .render(area, buf);
  }
}
