//! Test helpers for collector scenario tests.
//!
//! Models an employer actor that owns a roster of employee actors and answers
//! aggregate questions about them ("everyone's name", "total payroll") with
//! the Collector, the way a real owner would.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{
  Actor, ActorHandle, Collector, Promise, Roster, SendError, capability::on_reject, spawn_actor,
};

/// Errors an employee query can end with
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StaffError {
  #[error("Employee {0} is unavailable")]
  Unavailable(String),
  #[error("Employee has left")]
  Gone,
}

impl From<SendError> for StaffError {
  fn from(_: SendError) -> Self {
    StaffError::Gone
  }
}

/// Public view of an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
  pub name: String,
  pub salary: u64,
}

// ============================================================================
// Employee
// ============================================================================

/// How an employee responds to requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Answer after the configured delay
  Respond,
  /// Reject every request
  Unavailable,
  /// Keep requests forever without answering
  Silent,
}

pub enum EmployeeMessage {
  Name(Promise<String, StaffError>),
  Salary(Promise<u64, StaffError>),
  Profile(Promise<Profile, StaffError>),
}

pub struct Employee {
  profile: Profile,
  delay: Duration,
  mode: Mode,
  /// Requests held by a silent employee
  parked: Vec<EmployeeMessage>,
}

#[async_trait]
impl Actor for Employee {
  type Message = EmployeeMessage;

  fn name(&self) -> &str {
    &self.profile.name
  }

  async fn handle(&mut self, msg: EmployeeMessage) {
    match self.mode {
      Mode::Silent => {
        self.parked.push(msg);
        return;
      }
      Mode::Unavailable => {
        let error = StaffError::Unavailable(self.profile.name.clone());
        let _ = match msg {
          EmployeeMessage::Name(reply) => reply.reject(error),
          EmployeeMessage::Salary(reply) => reply.reject(error),
          EmployeeMessage::Profile(reply) => reply.reject(error),
        };
        return;
      }
      Mode::Respond => {}
    }

    tokio::time::sleep(self.delay).await;
    let _ = match msg {
      EmployeeMessage::Name(reply) => reply.fulfill(self.profile.name.clone()),
      EmployeeMessage::Salary(reply) => reply.fulfill(self.profile.salary),
      EmployeeMessage::Profile(reply) => reply.fulfill(self.profile.clone()),
    };
  }
}

/// Spawn an employee that answers after `delay_ms`
pub fn spawn_employee(
  name: &str,
  salary: u64,
  delay_ms: u64,
  mode: Mode,
  cancel: CancellationToken,
) -> ActorHandle<EmployeeMessage> {
  let employee = Employee {
    profile: Profile {
      name: name.to_string(),
      salary,
    },
    delay: Duration::from_millis(delay_ms),
    mode,
    parked: Vec::new(),
  };
  spawn_actor(employee, cancel)
}

// ============================================================================
// Employer
// ============================================================================

pub enum EmployerMessage {
  Hire(ActorHandle<EmployeeMessage>),
  Names(Promise<Vec<String>, StaffError>),
  Payroll(Promise<u64, StaffError>),
  Directory(Promise<serde_json::Value, StaffError>),
}

pub struct Employer {
  employed: Roster<ActorHandle<EmployeeMessage>>,
  collector: Collector,
}

#[async_trait]
impl Actor for Employer {
  type Message = EmployerMessage;

  fn name(&self) -> &str {
    "employer"
  }

  async fn handle(&mut self, msg: EmployerMessage) {
    match msg {
      EmployerMessage::Hire(employee) => self.employed.push(employee),
      EmployerMessage::Names(reply) => {
        let rejected = reply.clone();
        self.collector.apply(
          self.employed.snapshot(),
          |employee: ActorHandle<EmployeeMessage>, promise: Promise<String, StaffError>| {
            employee.fetch_into(promise, EmployeeMessage::Name)
          },
          on_reject(
            move |names: Vec<String>| {
              let _ = reply.fulfill(names);
            },
            move |error: StaffError| {
              let _ = rejected.reject(error);
            },
          ),
        );
      }
      EmployerMessage::Payroll(reply) => {
        let rejected = reply.clone();
        self.collector.apply(
          self.employed.snapshot(),
          |employee: ActorHandle<EmployeeMessage>, promise: Promise<u64, StaffError>| {
            employee.fetch_into(promise, EmployeeMessage::Salary)
          },
          on_reject(
            move |salaries: Vec<u64>| {
              let _ = reply.fulfill(salaries.iter().sum());
            },
            move |error: StaffError| {
              let _ = rejected.reject(error);
            },
          ),
        );
      }
      EmployerMessage::Directory(reply) => {
        let rejected = reply.clone();
        self.collector.apply(
          self.employed.snapshot(),
          |employee: ActorHandle<EmployeeMessage>, promise: Promise<Profile, StaffError>| {
            employee.fetch_into(promise, EmployeeMessage::Profile)
          },
          on_reject(
            move |profiles: Vec<Profile>| {
              let _ = reply.fulfill(serde_json::json!({
                "count": profiles.len(),
                "employees": profiles,
              }));
            },
            move |error: StaffError| {
              let _ = rejected.reject(error);
            },
          ),
        );
      }
    }
  }
}

/// Spawn an employer and hire `staff` in order
pub fn spawn_employer(
  staff: Vec<ActorHandle<EmployeeMessage>>,
  collector: Collector,
  cancel: CancellationToken,
) -> ActorHandle<EmployerMessage> {
  let employer = Employer {
    employed: Roster::new(),
    collector,
  };
  let handle = spawn_actor(employer, cancel);

  for employee in staff {
    handle
      .send(EmployerMessage::Hire(employee))
      .expect("employer should be running");
  }

  handle
}
