use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employee record as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
  pub employee_number: i64,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub job_title_id: i64,
  pub hire_date: NaiveDate,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub salary: Option<f64>,
}

impl Employee {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Body for creating an employee (everything but the backend-assigned number)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEmployee {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub job_title_id: i64,
  pub hire_date: NaiveDate,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub salary: Option<f64>,
}

/// Partial update for an employee.
///
/// `None` leaves a field untouched. For `salary`, `Some(None)` clears it
/// (serialized as `null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmployeePatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub job_title_id: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hire_date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub salary: Option<Option<f64>>,
}

/// Job title record as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTitle {
  pub job_title_id: i64,
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub department: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_salary: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_salary: Option<f64>,
}

/// Body for creating a job title
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewJobTitle {
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub department: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub min_salary: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_salary: Option<f64>,
}

/// Partial update for a job title. Optional fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobTitlePatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub department: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub min_salary: Option<Option<f64>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_salary: Option<Option<f64>>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_employee_without_salary_deserializes() {
    let employee: Employee = serde_json::from_value(json!({
      "employee_number": 3,
      "first_name": "Grace",
      "last_name": "Hopper",
      "email": "grace@x.com",
      "job_title_id": 2,
      "hire_date": "2023-05-17"
    }))
    .unwrap();

    assert_eq!(employee.salary, None);
    assert_eq!(employee.hire_date, NaiveDate::from_ymd_opt(2023, 5, 17).unwrap());
    assert_eq!(employee.full_name(), "Grace Hopper");
  }

  #[test]
  fn test_new_employee_omits_absent_salary() {
    let draft = NewEmployee {
      first_name: "Ada".into(),
      last_name: "Lovelace".into(),
      email: "ada@x.com".into(),
      job_title_id: 1,
      hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
      salary: None,
    };
    let value = serde_json::to_value(&draft).unwrap();
    assert_eq!(value.get("salary"), None);
    assert_eq!(value["hire_date"], "2024-01-01");
  }

  #[test]
  fn test_patch_distinguishes_untouched_from_cleared() {
    let patch = JobTitlePatch {
      department: Some(None),
      max_salary: Some(Some(120000.0)),
      ..Default::default()
    };
    let value = serde_json::to_value(&patch).unwrap();
    assert_eq!(value, json!({ "department": null, "max_salary": 120000.0 }));
  }

  #[test]
  fn test_empty_patch_serializes_to_empty_object() {
    let value = serde_json::to_value(EmployeePatch::default()).unwrap();
    assert_eq!(value, json!({}));
  }
}
