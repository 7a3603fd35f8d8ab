use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Top-level pages, in header order
pub const PAGES: [&str; 3] = ["Dashboard", "Employees", "Job Titles"];

/// Draw the header bar with logo, page tabs, context and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  active_page: usize,
  shortcuts: &[ShortcutInfo],
) {
  let sep = || Span::styled("│", Style::default().fg(Color::DarkGray));

  let mut spans = vec![
    Span::styled(" staffdesk ", Style::default().fg(Color::Cyan).bold()),
    sep(),
    Span::styled(format!(" {} ", title), Style::default().fg(Color::White)),
    sep(),
  ];

  for (i, page) in PAGES.iter().enumerate() {
    let style = if i == active_page {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };
    spans.push(Span::styled(format!(" {} ", page), style));
  }
  spans.push(Span::raw(" "));

  let mut sorted: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);
  for shortcut in sorted {
    // Shortcuts - keys and brackets highlighted, descriptions dimmed
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
