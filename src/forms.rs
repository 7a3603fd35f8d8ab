//! Field layout and validation for the create/edit forms.
//!
//! Forms edit plain text. `Editable` turns those strings into a create body
//! or a patch holding only the fields that changed, rejecting input the
//! backend could not accept before any request is sent.

use crate::api::resource::Resource;
use crate::api::types::{Employee, EmployeePatch, JobTitle, JobTitlePatch, NewEmployee, NewJobTitle};
use crate::error::ApiError;
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  Email,
  Integer,
  Amount,
  Date,
}

impl FieldKind {
  /// Placeholder shown in an empty input
  pub fn hint(self) -> &'static str {
    match self {
      Self::Text => "",
      Self::Email => "name@example.com",
      Self::Integer => "number",
      Self::Amount => "amount",
      Self::Date => "YYYY-MM-DD",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  pub name: &'static str,
  pub label: &'static str,
  pub required: bool,
  pub kind: FieldKind,
}

impl FieldSpec {
  const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
    Self {
      name,
      label,
      required: true,
      kind,
    }
  }

  const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
    Self {
      name,
      label,
      required: false,
      kind,
    }
  }
}

/// A resource that can be created and edited through a form.
///
/// Form values are positional, one string per entry of `fields()`.
pub trait Editable: Resource {
  fn fields() -> &'static [FieldSpec];

  /// Initial values for the create form
  fn defaults(today: NaiveDate) -> Vec<String>;

  /// Current values of this record, for the edit form
  fn values(&self) -> Vec<String>;

  fn draft(values: &[String]) -> Result<Self::Draft, ApiError>;

  /// Patch holding only the fields whose value differs from `self`
  fn patch(&self, values: &[String]) -> Result<Self::Patch, ApiError>;
}

const EMPLOYEE_FIELDS: &[FieldSpec] = &[
  FieldSpec::required("first_name", "First Name", FieldKind::Text),
  FieldSpec::required("last_name", "Last Name", FieldKind::Text),
  FieldSpec::required("email", "Email", FieldKind::Email),
  FieldSpec::required("job_title_id", "Job Title ID", FieldKind::Integer),
  FieldSpec::required("hire_date", "Hire Date", FieldKind::Date),
  FieldSpec::optional("salary", "Salary", FieldKind::Amount),
];

const JOB_TITLE_FIELDS: &[FieldSpec] = &[
  FieldSpec::required("title", "Title", FieldKind::Text),
  FieldSpec::optional("department", "Department", FieldKind::Text),
  FieldSpec::optional("min_salary", "Minimum Salary", FieldKind::Amount),
  FieldSpec::optional("max_salary", "Maximum Salary", FieldKind::Amount),
];

impl Editable for Employee {
  fn fields() -> &'static [FieldSpec] {
    EMPLOYEE_FIELDS
  }

  fn defaults(today: NaiveDate) -> Vec<String> {
    vec![
      String::new(),
      String::new(),
      String::new(),
      "1".to_string(),
      today.format(DATE_FORMAT).to_string(),
      String::new(),
    ]
  }

  fn values(&self) -> Vec<String> {
    vec![
      self.first_name.clone(),
      self.last_name.clone(),
      self.email.clone(),
      self.job_title_id.to_string(),
      self.hire_date.format(DATE_FORMAT).to_string(),
      format_amount(self.salary),
    ]
  }

  fn draft(values: &[String]) -> Result<NewEmployee, ApiError> {
    Ok(NewEmployee {
      first_name: required_text("first_name", field(values, 0))?,
      last_name: required_text("last_name", field(values, 1))?,
      email: required_email("email", field(values, 2))?,
      job_title_id: required_int("job_title_id", field(values, 3))?,
      hire_date: required_date("hire_date", field(values, 4))?,
      salary: optional_amount("salary", field(values, 5))?,
    })
  }

  fn patch(&self, values: &[String]) -> Result<EmployeePatch, ApiError> {
    let draft = Self::draft(values)?;
    Ok(EmployeePatch {
      first_name: changed(&self.first_name, draft.first_name),
      last_name: changed(&self.last_name, draft.last_name),
      email: changed(&self.email, draft.email),
      job_title_id: changed(&self.job_title_id, draft.job_title_id),
      hire_date: changed(&self.hire_date, draft.hire_date),
      salary: changed(&self.salary, draft.salary),
    })
  }
}

impl Editable for JobTitle {
  fn fields() -> &'static [FieldSpec] {
    JOB_TITLE_FIELDS
  }

  fn defaults(_today: NaiveDate) -> Vec<String> {
    vec![String::new(); JOB_TITLE_FIELDS.len()]
  }

  fn values(&self) -> Vec<String> {
    vec![
      self.title.clone(),
      self.department.clone().unwrap_or_default(),
      format_amount(self.min_salary),
      format_amount(self.max_salary),
    ]
  }

  fn draft(values: &[String]) -> Result<NewJobTitle, ApiError> {
    Ok(NewJobTitle {
      title: required_text("title", field(values, 0))?,
      department: optional_text(field(values, 1)),
      min_salary: optional_amount("min_salary", field(values, 2))?,
      max_salary: optional_amount("max_salary", field(values, 3))?,
    })
  }

  fn patch(&self, values: &[String]) -> Result<JobTitlePatch, ApiError> {
    let draft = Self::draft(values)?;
    Ok(JobTitlePatch {
      title: changed(&self.title, draft.title),
      department: changed(&self.department, draft.department),
      min_salary: changed(&self.min_salary, draft.min_salary),
      max_salary: changed(&self.max_salary, draft.max_salary),
    })
  }
}

fn field(values: &[String], index: usize) -> &str {
  values.get(index).map(|v| v.trim()).unwrap_or("")
}

fn changed<T: PartialEq>(old: &T, new: T) -> Option<T> {
  if *old == new {
    None
  } else {
    Some(new)
  }
}

fn format_amount(amount: Option<f64>) -> String {
  amount.map(|a| a.to_string()).unwrap_or_default()
}

fn required_text(name: &'static str, raw: &str) -> Result<String, ApiError> {
  if raw.is_empty() {
    return Err(ApiError::validation(name, "is required"));
  }
  Ok(raw.to_string())
}

fn optional_text(raw: &str) -> Option<String> {
  if raw.is_empty() {
    None
  } else {
    Some(raw.to_string())
  }
}

fn required_email(name: &'static str, raw: &str) -> Result<String, ApiError> {
  let email = required_text(name, raw)?;
  match email.split_once('@') {
    Some((user, domain)) if !user.is_empty() && !domain.is_empty() && !domain.contains('@') => {
      Ok(email)
    }
    _ => Err(ApiError::validation(name, "must be an email address")),
  }
}

fn required_int(name: &'static str, raw: &str) -> Result<i64, ApiError> {
  if raw.is_empty() {
    return Err(ApiError::validation(name, "is required"));
  }
  raw
    .parse()
    .map_err(|_| ApiError::validation(name, "must be a whole number"))
}

fn optional_amount(name: &'static str, raw: &str) -> Result<Option<f64>, ApiError> {
  if raw.is_empty() {
    return Ok(None);
  }
  match raw.replace(',', "").parse::<f64>() {
    Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(Some(amount)),
    _ => Err(ApiError::validation(name, "must be a non-negative number")),
  }
}

fn required_date(name: &'static str, raw: &str) -> Result<NaiveDate, ApiError> {
  if raw.is_empty() {
    return Err(ApiError::validation(name, "is required"));
  }
  NaiveDate::parse_from_str(raw, DATE_FORMAT)
    .map_err(|_| ApiError::validation(name, "must be a date (YYYY-MM-DD)"))
}
