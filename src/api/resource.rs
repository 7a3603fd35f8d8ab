//! The `Resource` trait ties a record type to its REST collection and its
//! slots in the query cache.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;

use super::types::{Employee, EmployeePatch, JobTitle, JobTitlePatch, NewEmployee, NewJobTitle};

/// Which backend collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
  Employees,
  JobTitles,
}

/// A record type served by a REST collection.
pub trait Resource: Clone + fmt::Debug + PartialEq + DeserializeOwned + Send + Sync + 'static {
  /// Create body (all fields except the identifier)
  type Draft: Serialize + Send + Sync + 'static;
  /// Partial update body
  type Patch: Serialize + Send + Sync + 'static;

  const KIND: ResourceKind;
  /// Path segment of the collection, e.g. "employees"
  const COLLECTION: &'static str;
  /// Lowercase singular name for messages, e.g. "job title"
  const NAME: &'static str;

  /// Backend-assigned identifier
  fn id(&self) -> i64;

  /// Wrap a fetched collection for storage in the cache
  fn wrap_list(items: Vec<Self>) -> ResourceData;

  /// Borrow a cached collection of this type
  fn list_of(data: &ResourceData) -> Option<&[Self]>;

  /// Wrap a single fetched record
  fn wrap_one(item: Self) -> ResourceData;

  /// Borrow a cached single record of this type
  fn one_of(data: &ResourceData) -> Option<&Self>;

  fn list_key() -> ResourceKey {
    ResourceKey::List(Self::KIND)
  }

  fn record_key(id: i64) -> ResourceKey {
    ResourceKey::Record(Self::KIND, id)
  }
}

/// Cache key for a collection or a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
  List(ResourceKind),
  Record(ResourceKind, i64),
}

impl fmt::Display for ResourceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = |kind: &ResourceKind| match kind {
      ResourceKind::Employees => "employees",
      ResourceKind::JobTitles => "jobTitles",
    };
    match self {
      Self::List(kind) => write!(f, "{}", name(kind)),
      Self::Record(kind, id) => write!(f, "{}/{}", name(kind), id),
    }
  }
}

/// Values held by the query cache. `Arc` keeps clones cheap since every
/// waiter on a shared fetch gets its own copy.
#[derive(Debug, Clone)]
pub enum ResourceData {
  Employees(Arc<Vec<Employee>>),
  Employee(Arc<Employee>),
  JobTitles(Arc<Vec<JobTitle>>),
  JobTitle(Arc<JobTitle>),
}

impl Resource for Employee {
  type Draft = NewEmployee;
  type Patch = EmployeePatch;

  const KIND: ResourceKind = ResourceKind::Employees;
  const COLLECTION: &'static str = "employees";
  const NAME: &'static str = "employee";

  fn id(&self) -> i64 {
    self.employee_number
  }

  fn wrap_list(items: Vec<Self>) -> ResourceData {
    ResourceData::Employees(Arc::new(items))
  }

  fn list_of(data: &ResourceData) -> Option<&[Self]> {
    match data {
      ResourceData::Employees(items) => Some(items.as_slice()),
      _ => None,
    }
  }

  fn wrap_one(item: Self) -> ResourceData {
    ResourceData::Employee(Arc::new(item))
  }

  fn one_of(data: &ResourceData) -> Option<&Self> {
    match data {
      ResourceData::Employee(item) => Some(item),
      _ => None,
    }
  }
}

impl Resource for JobTitle {
  type Draft = NewJobTitle;
  type Patch = JobTitlePatch;

  const KIND: ResourceKind = ResourceKind::JobTitles;
  const COLLECTION: &'static str = "job_titles";
  const NAME: &'static str = "job title";

  fn id(&self) -> i64 {
    self.job_title_id
  }

  fn wrap_list(items: Vec<Self>) -> ResourceData {
    ResourceData::JobTitles(Arc::new(items))
  }

  fn list_of(data: &ResourceData) -> Option<&[Self]> {
    match data {
      ResourceData::JobTitles(items) => Some(items.as_slice()),
      _ => None,
    }
  }

  fn wrap_one(item: Self) -> ResourceData {
    ResourceData::JobTitle(Arc::new(item))
  }

  fn one_of(data: &ResourceData) -> Option<&Self> {
    match data {
      ResourceData::JobTitle(item) => Some(item),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_key_display() {
    assert_eq!(Employee::list_key().to_string(), "employees");
    assert_eq!(JobTitle::list_key().to_string(), "jobTitles");
    assert_eq!(Employee::record_key(7).to_string(), "employees/7");
  }

  #[test]
  fn test_keys_are_distinct_per_kind() {
    assert_ne!(Employee::list_key(), JobTitle::list_key());
    assert_ne!(Employee::record_key(1), JobTitle::record_key(1));
    assert_eq!(
      JobTitle::record_key(3),
      ResourceKey::Record(ResourceKind::JobTitles, 3)
    );
  }

  #[test]
  fn test_data_does_not_cross_types() {
    let data = JobTitle::wrap_list(vec![JobTitle {
      job_title_id: 1,
      title: "Engineer".into(),
      department: None,
      min_salary: None,
      max_salary: None,
    }]);
    assert_eq!(JobTitle::list_of(&data).map(|l| l.len()), Some(1));
    assert!(Employee::list_of(&data).is_none());
    assert!(JobTitle::one_of(&data).is_none());
  }
}
