use ratatui::prelude::Rect;

/// Truncate a string to at most `max_len` characters, adding "..." if
/// truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Whole-dollar amount with thousands separators, e.g. "$90,000"
pub fn format_money(amount: f64) -> String {
  let rounded = amount.round() as i64;
  let digits = rounded.unsigned_abs().to_string();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(c);
  }
  if rounded < 0 {
    format!("-${}", grouped)
  } else {
    format!("${}", grouped)
  }
}

pub fn format_optional_money(amount: Option<f64>) -> String {
  amount.map(format_money).unwrap_or_else(|| "-".to_string())
}

/// "$min - $max" when both bounds are known
pub fn salary_range(min: Option<f64>, max: Option<f64>) -> String {
  match (min, max) {
    (Some(min), Some(max)) => format!("{} - {}", format_money(min), format_money(max)),
    _ => "-".to_string(),
  }
}

/// A `width` x `height` rect centered in `area`, clamped to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Zoë Ångström", 6), "Zoë...");
  }

  #[test]
  fn test_format_money() {
    assert_eq!(format_money(90000.0), "$90,000");
    assert_eq!(format_money(1234567.4), "$1,234,567");
    assert_eq!(format_money(999.0), "$999");
    assert_eq!(format_money(0.0), "$0");
  }

  #[test]
  fn test_salary_range() {
    assert_eq!(salary_range(Some(80000.0), Some(120000.0)), "$80,000 - $120,000");
    assert_eq!(salary_range(Some(80000.0), None), "-");
    assert_eq!(salary_range(None, None), "-");
    assert_eq!(format_optional_money(None), "-");
  }

  #[test]
  fn test_centered_rect_clamps() {
    let area = Rect::new(0, 0, 40, 10);
    assert_eq!(centered_rect(20, 4, area), Rect::new(10, 3, 20, 4));
    assert_eq!(centered_rect(80, 20, area), area);
  }
}
