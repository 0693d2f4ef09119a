pub mod cmdline;
pub mod help;
pub mod menu;
pub mod message;
pub mod pane;
pub mod progress;
pub mod toolbar;

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::Frame;

use crate::app::{App, Modal};
use crate::filer::Layout;
use self::toolbar::ToolbarParams;

/// Composes one frame: toolbar, panes, then the status rows pinned to
/// the bottom in order (info, message, diff status when active, the
/// two progress rows above when running), and any mounted modal on top.
pub fn draw(frame: &mut Frame, app: &mut App) {
  let area = frame.area();
  if area.width < 4 || area.height < 5 {
    return;
  }
  let buf = frame.buffer_mut();

  let progress_active = app.progress.is_running();
  let diff_active = app.filer.workspace().is_diff_search_active();
  let mut offset: u16 = 0;
  if progress_active {
    offset += 2;
  }
  if diff_active {
    offset += 1;
  }

  // Toolbar row.
  let titles: Vec<String> = app.filer.workspaces.iter().map(|w| w.title.clone()).collect();
  let panes: Vec<(String, bool)> = {
    let ws = app.filer.workspace();
    ws.dirs
      .iter()
      .enumerate()
      .map(|(i, d)| (d.title.clone(), i == ws.focus))
      .collect()
  };
  let params = ToolbarParams {
    linked: app.linked_nav,
    ignore_failures: app.ignore_failures,
    workspace_titles: &titles,
    current_workspace: app.filer.current,
    diff_status: diff_active.then(|| app.diff_status_text()),
    panes: &panes,
  };
  app.toolbar = toolbar::render_toolbar(&params, Rect::new(0, 0, area.width, 1), buf, &app.theme);

  // Workspace panes.
  let pane_height = area.height.saturating_sub(3 + offset);
  let ws_area = Rect::new(0, 1, area.width, pane_height);
  {
    let ws = app.filer.workspace_mut();
    if ws.geometry != ws_area {
      ws.resize(ws_area);
    }
  }
  let ws = app.filer.workspace();
  if ws.layout == Layout::Fullscreen {
    pane::render_pane(
      ws.dir(),
      ws.focus,
      true,
      ws.comparison.as_ref(),
      ws.dir().geometry,
      buf,
      &app.theme,
    );
  } else {
    for (i, dir) in ws.dirs.iter().enumerate() {
      pane::render_pane(
        dir,
        i,
        i == ws.focus,
        ws.comparison.as_ref(),
        dir.geometry,
        buf,
        &app.theme,
      );
    }
  }

  // Status rows, bottom up.
  let info_row = Rect::new(0, area.height - 1, area.width, 1);
  let message_row = Rect::new(0, area.height - 2, area.width, 1);
  render_info_row(app, info_row.y, buf);
  app.message.render(message_row, buf, &app.theme);

  if diff_active {
    let y = if progress_active { area.height - 5 } else { area.height - 3 };
    let style = Style::default()
      .fg(app.theme.text)
      .add_modifier(Modifier::REVERSED);
    let text = app.diff_status_text();
    let text: String = text.chars().take(area.width as usize).collect();
    buf.set_string(0, y, text, style);
  }
  if progress_active {
    let rows = Rect::new(0, area.height - 4, area.width, 2);
    app.progress.render(rows, buf, &app.theme);
  }

  // Modal widgets draw last.
  match &app.modal {
    Some(Modal::Cmdline(cmdline)) => cmdline.render(message_row, buf, &app.theme),
    Some(Modal::Menu(menu)) => menu.render(area, buf, &app.theme),
    Some(Modal::Help(help)) => help.render(area, buf, &app.theme),
    None => {}
  }
}

fn render_info_row(app: &App, y: u16, buf: &mut ratatui::buffer::Buffer) {
  let dir = app.filer.dir();
  let marks = dir.mark_count();
  let mut info = format!(
    "{} [{}/{}] sort:{}",
    dir.path.display(),
    dir.cursor + 1,
    dir.entries.len().max(1),
    dir.sort.label(),
  );
  if marks > 0 {
    info.push_str(&format!(" {marks} marked"));
  }
  if let Some(entry) = dir.file() {
    if !entry.is_parent() {
      info.push_str(&format!(
        " | {} {}",
        pane::format_size(entry.size),
        pane::format_mtime(entry)
      ));
    }
  }
  let width = buf.area.width as usize;
  let mut text: String = info.chars().take(width).collect();
  if info.chars().count() > width && width > 0 {
    text.pop();
    text.push('~');
  }
  buf.set_string(0, y, text, Style::default().fg(app.theme.text_dim));
}
