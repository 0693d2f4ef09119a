use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Gauge, Paragraph, Widget};

use crate::theme::Theme;

/// Two-row progress display for bulk copy/move: the current task name
/// above a byte gauge. Occupies its rows only while running.
#[derive(Debug, Default)]
pub struct ProgressBar {
  total: f64,
  done: f64,
  task: String,
  tasks_total: usize,
  tasks_done: usize,
  running: bool,
}

impl ProgressBar {
  pub fn start(&mut self, total_bytes: f64, tasks: usize) {
    self.total = total_bytes.max(0.0);
    self.done = 0.0;
    self.tasks_total = tasks;
    self.tasks_done = 0;
    self.task.clear();
    self.running = true;
  }

  pub fn start_task(&mut self, name: &str) {
    self.task = name.to_string();
  }

  pub fn update(&mut self, bytes: f64) {
    self.done = (self.done + bytes).min(self.total);
  }

  pub fn finish_task(&mut self) {
    self.tasks_done += 1;
  }

  pub fn finish(&mut self) {
    self.running = false;
  }

  pub fn is_running(&self) -> bool {
    self.running
  }

  pub fn ratio(&self) -> f64 {
    if self.total <= 0.0 {
      return 0.0;
    }
    (self.done / self.total).clamp(0.0, 1.0)
  }

  /// Renders into two rows: `area` must be 2 high.
  pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
    if !self.running || area.height < 2 {
      return;
    }
    let label_area = Rect::new(area.x, area.y, area.width, 1);
    let gauge_area = Rect::new(area.x, area.y + 1, area.width, 1);

    let label = format!("[{}/{}] {}", self.tasks_done, self.tasks_total, self.task);
    Paragraph::new(label)
      .style(Style::default().fg(theme.info))
      .render(label_area, buf);

    Gauge::default()
      .ratio(self.ratio())
      .gauge_style(Style::default().fg(theme.info).bg(theme.bg_bar))
      .render(gauge_area, buf);
  }
}
