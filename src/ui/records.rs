//! How each record type is presented: cards, table rows and detail pages.

use crate::api::types::{Employee, JobTitle};
use crate::forms::Editable;
use crate::ui::renderfns::{format_optional_money, salary_range};
use ratatui::prelude::*;

pub trait RecordView: Editable {
  /// Page title, e.g. "Job Titles"
  const TITLE: &'static str;
  /// Lowercase plural for messages, e.g. "job titles"
  const PLURAL: &'static str;
  /// Card height including borders
  const CARD_HEIGHT: u16;

  /// Short human label: full name or title
  fn label(&self) -> String;

  fn delete_message(&self) -> String;

  /// Text the `/` filter matches against
  fn search_text(&self) -> String;

  fn card_lines(&self) -> Vec<Line<'static>>;

  fn table_header() -> &'static [&'static str];

  fn table_widths() -> Vec<Constraint>;

  fn table_row(&self) -> Vec<String>;

  fn detail_lines(&self) -> Vec<Line<'static>>;
}

fn field_line(name: &'static str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{:<14}", name), Style::default().fg(Color::DarkGray)),
    Span::raw(value),
  ])
}

impl RecordView for Employee {
  const TITLE: &'static str = "Employees";
  const PLURAL: &'static str = "employees";
  const CARD_HEIGHT: u16 = 7;

  fn label(&self) -> String {
    self.full_name()
  }

  fn delete_message(&self) -> String {
    format!(
      "Are you sure you want to delete {}? This action cannot be undone.",
      self.full_name()
    )
  }

  fn search_text(&self) -> String {
    format!(
      "{} {} {} #{}",
      self.first_name, self.last_name, self.email, self.employee_number
    )
  }

  fn card_lines(&self) -> Vec<Line<'static>> {
    vec![
      Line::from(vec![
        Span::styled(self.full_name(), Style::default().bold()),
        Span::styled(
          format!("  #{}", self.employee_number),
          Style::default().fg(Color::DarkGray),
        ),
      ]),
      Line::styled(self.email.clone(), Style::default().fg(Color::Cyan)),
      Line::raw(format!("Hired {}", self.hire_date)),
      Line::from(vec![
        Span::raw(format!("Job title {}", self.job_title_id)),
        Span::raw("  "),
        Span::styled(
          format_optional_money(self.salary),
          Style::default().fg(Color::Green),
        ),
      ]),
    ]
  }

  fn table_header() -> &'static [&'static str] {
    &["#", "Name", "Email", "Job Title", "Hire Date", "Salary"]
  }

  fn table_widths() -> Vec<Constraint> {
    vec![
      Constraint::Length(6),
      Constraint::Min(18),
      Constraint::Min(22),
      Constraint::Length(10),
      Constraint::Length(11),
      Constraint::Length(11),
    ]
  }

  fn table_row(&self) -> Vec<String> {
    vec![
      self.employee_number.to_string(),
      self.full_name(),
      self.email.clone(),
      self.job_title_id.to_string(),
      self.hire_date.to_string(),
      format_optional_money(self.salary),
    ]
  }

  fn detail_lines(&self) -> Vec<Line<'static>> {
    vec![
      field_line("Number", format!("#{}", self.employee_number)),
      field_line("Name", self.full_name()),
      field_line("Email", self.email.clone()),
      field_line("Job title", self.job_title_id.to_string()),
      field_line("Hire date", self.hire_date.to_string()),
      field_line("Salary", format_optional_money(self.salary)),
    ]
  }
}

impl RecordView for JobTitle {
  const TITLE: &'static str = "Job Titles";
  const PLURAL: &'static str = "job titles";
  const CARD_HEIGHT: u16 = 6;

  fn label(&self) -> String {
    self.title.clone()
  }

  fn delete_message(&self) -> String {
    format!(
      "Are you sure you want to delete \"{}\"? This action cannot be undone.",
      self.title
    )
  }

  fn search_text(&self) -> String {
    format!(
      "{} {} #{}",
      self.title,
      self.department.as_deref().unwrap_or(""),
      self.job_title_id
    )
  }

  fn card_lines(&self) -> Vec<Line<'static>> {
    vec![
      Line::from(vec![
        Span::styled(self.title.clone(), Style::default().bold()),
        Span::styled(
          format!("  #{}", self.job_title_id),
          Style::default().fg(Color::DarkGray),
        ),
      ]),
      Line::styled(
        self.department.clone().unwrap_or_else(|| "-".to_string()),
        Style::default().fg(Color::Cyan),
      ),
      Line::styled(
        salary_range(self.min_salary, self.max_salary),
        Style::default().fg(Color::Green),
      ),
    ]
  }

  fn table_header() -> &'static [&'static str] {
    &["#", "Title", "Department", "Salary Range"]
  }

  fn table_widths() -> Vec<Constraint> {
    vec![
      Constraint::Length(6),
      Constraint::Min(20),
      Constraint::Min(16),
      Constraint::Length(22),
    ]
  }

  fn table_row(&self) -> Vec<String> {
    vec![
      format!("#{}", self.job_title_id),
      self.title.clone(),
      self.department.clone().unwrap_or_else(|| "-".to_string()),
      salary_range(self.min_salary, self.max_salary),
    ]
  }

  fn detail_lines(&self) -> Vec<Line<'static>> {
    vec![
      field_line("ID", format!("#{}", self.job_title_id)),
      field_line("Title", self.title.clone()),
      field_line(
        "Department",
        self.department.clone().unwrap_or_else(|| "-".to_string()),
      ),
      field_line("Minimum", format_optional_money(self.min_salary)),
      field_line("Maximum", format_optional_money(self.max_salary)),
    ]
  }
}
