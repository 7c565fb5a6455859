//! Reports test outcomes to a TestRail run.
//!
//! # Design
//! A `RunReporter` is created once per suite, which opens a new run, and
//! is then handed to every test. `run_case` executes a test body, derives
//! its status from the returned `Result` or from a panic, and posts the
//! result before returning. A panicking test is re-raised after its result
//! has been recorded so the test framework still sees the failure.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use testrail_core::{ClientError, TestRailClient, Transport, UreqTransport};
use tracing::{debug, error, info, warn};

use crate::status::TestStatus;

/// Handle to one TestRail run.
#[derive(Debug)]
pub struct RunReporter<'a, T = UreqTransport> {
    client: &'a TestRailClient<T>,
    run_id: u64,
}

impl<'a, T: Transport> RunReporter<'a, T> {
    /// Open a run in `project_id`.
    pub fn start(client: &'a TestRailClient<T>, project_id: u64) -> Result<Self, ClientError> {
        let run_id = client.add_run(project_id)?;
        info!(project_id, run_id, "test run started");
        Ok(Self { client, run_id })
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Post `status` for `case_id`.
    pub fn record(&self, case_id: u64, status: TestStatus, message: &str) -> Result<(), ClientError> {
        self.client
            .add_result_for_case(case_id, self.run_id, status.id(), message)
    }

    /// Run `test` as case `case_id` and record its outcome.
    ///
    /// `Err` marks the case failed and is reported through the returned
    /// status. A panic marks it failed and is resumed once the result is
    /// posted.
    pub fn run_case<F, E>(&self, case_id: u64, test: F) -> Result<TestStatus, ClientError>
    where
        F: FnOnce() -> Result<(), E>,
        E: fmt::Display,
    {
        debug!(case_id, "running test case");
        let (status, message, payload) = match panic::catch_unwind(AssertUnwindSafe(test)) {
            Ok(Ok(())) => (TestStatus::Passed, String::new(), None),
            Ok(Err(err)) => (TestStatus::Failed, err.to_string(), None),
            Err(payload) => (TestStatus::Failed, panic_message(payload.as_ref()), Some(payload)),
        };
        if status == TestStatus::Failed {
            warn!(case_id, %message, "test case failed");
        }

        let recorded = self.record(case_id, status, &message);
        if let Some(payload) = payload {
            if let Err(err) = &recorded {
                error!(case_id, %err, "could not record result for panicking test");
            }
            panic::resume_unwind(payload);
        }
        recorded?;
        Ok(status)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "test panicked".to_string()
    }
}
