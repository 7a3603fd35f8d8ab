use crate::app::AppContext;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{BarChart, Block, Borders, Paragraph, Sparkline};

// Placeholder figures, not backed by the API
const STATS: [(&str, &str); 3] = [
  ("Total Employees", "120"),
  ("Job Titles", "24"),
  ("Avg. Salary", "$85k"),
];

const DEPARTMENTS: &[(&str, u64)] = &[
  ("Engineering", 45),
  ("Sales", 32),
  ("Marketing", 28),
  ("HR", 15),
];

const MONTHS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

/// Average salary per month, in thousands
const SALARY_TREND: [u64; 6] = [75, 77, 78, 80, 82, 85];

const HIRING_TREND: [u64; 6] = [8, 12, 15, 10, 18, 14];

const STAT_COLORS: [Color; 3] = [Color::Blue, Color::Magenta, Color::Green];

#[derive(Default)]
pub struct DashboardView;

impl DashboardView {
  pub fn new() -> Self {
    Self
  }

  fn draw_stats(frame: &mut Frame, area: Rect) {
    let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    for ((label, value), (column, color)) in STATS
      .iter()
      .zip(columns.iter().zip(STAT_COLORS.iter()))
    {
      let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(*color));
      let lines = vec![
        Line::styled(*label, Style::default().fg(Color::DarkGray)),
        Line::styled(*value, Style::default().fg(*color).bold()),
      ];
      frame.render_widget(Paragraph::new(lines).block(block), *column);
    }
  }

  fn draw_trend(frame: &mut Frame, area: Rect, title: &str, data: &[u64; 6], color: Color) {
    let block = Block::default()
      .title(format!(" {} ({} - {}) ", title, MONTHS[0], MONTHS[MONTHS.len() - 1]))
      .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [chart, axis] =
      Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(
      Sparkline::default()
        .data(data)
        .style(Style::default().fg(color)),
      chart,
    );
    let legend = data
      .iter()
      .zip(MONTHS.iter())
      .map(|(value, month)| format!("{} {}", month, value))
      .collect::<Vec<_>>()
      .join("  ");
    frame.render_widget(
      Paragraph::new(legend).style(Style::default().fg(Color::DarkGray)),
      axis,
    );
  }
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent, _ctx: &mut AppContext) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, _ctx: &AppContext) {
    let [stats, charts] =
      Layout::vertical([Constraint::Length(4), Constraint::Min(8)]).areas(area);
    Self::draw_stats(frame, stats);

    let [departments, trends] =
      Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .areas(charts);

    frame.render_widget(
      BarChart::default()
        .block(
          Block::default()
            .title(" Employees by Department ")
            .borders(Borders::ALL),
        )
        .data(DEPARTMENTS)
        .bar_width(11)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan)),
      departments,
    );

    let [salary, hiring] =
      Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(trends);
    Self::draw_trend(frame, salary, "Average Salary, $k", &SALARY_TREND, Color::Green);
    Self::draw_trend(frame, hiring, "Hires", &HIRING_TREND, Color::Yellow);
  }

  fn breadcrumb_label(&self) -> String {
    "Dashboard".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiClient;
  use crossterm::event::KeyModifiers;
  use ratatui::backend::TestBackend;
  use std::time::Duration;

  #[tokio::test]
  async fn test_renders_sample_figures() {
    let ctx = AppContext::new(
      ApiClient::new("http://localhost:8000").unwrap(),
      Duration::from_secs(60),
      Duration::from_secs(4),
    );
    let mut view = DashboardView::new();
    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal
      .draw(|frame| {
        let area = frame.area();
        view.render(frame, area, &ctx);
      })
      .unwrap();

    let buffer = terminal.backend().buffer().clone();
    let text = buffer
      .content()
      .chunks(buffer.area.width as usize)
      .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n");

    for expected in ["Total Employees", "120", "24", "$85k", "Employees by Department"] {
      assert!(text.contains(expected), "missing {expected:?}");
    }
    assert!(text.contains("Jan 75"));
    assert!(text.contains("May 18"));
  }

  #[tokio::test]
  async fn test_quit_keys_pop() {
    let mut ctx = AppContext::new(
      ApiClient::new("http://localhost:8000").unwrap(),
      Duration::from_secs(60),
      Duration::from_secs(4),
    );
    let mut view = DashboardView::new();
    let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
    let other = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
    assert!(matches!(view.handle_key(esc, &mut ctx), ViewAction::Pop));
    assert!(matches!(view.handle_key(other, &mut ctx), ViewAction::None));
  }
}
