use crate::notify::{Level, Notifications};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Draw the footer bar with view breadcrumb
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String]) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view - highlighted
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Stack notifications in the top-right corner of `area`, newest at the
/// bottom
pub fn draw_toasts(frame: &mut Frame, area: Rect, notifications: &Notifications) {
  if notifications.is_empty() {
    return;
  }
  let width = 44.min(area.width);
  let mut y = area.y + 1;

  for note in notifications.iter() {
    if y + 3 > area.y + area.height {
      break;
    }
    let color = match note.level {
      Level::Success => Color::Green,
      Level::Error => Color::Red,
    };
    let toast_area = Rect::new(area.x + area.width - width, y, width, 3);
    frame.render_widget(Clear, toast_area);
    let paragraph = Paragraph::new(note.message.as_str())
      .style(Style::default().fg(color))
      .block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(color)),
      );
    frame.render_widget(paragraph, toast_area);
    y += 3;
  }
}
