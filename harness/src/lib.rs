//! Glue between REST API tests and TestRail.
//!
//! # Overview
//! - `RunReporter` opens a TestRail run for a suite and records each test
//!   case's outcome in it.
//! - `OmdbClient` queries the OMDb movie API the suites exercise.
//! - `Settings` gathers the TestRail and OMDb configuration from the
//!   environment or a YAML file.
//! - `shared_client` hands out one process-wide `TestRailClient` built
//!   from the environment, for suites that do not build their own.

pub mod error;
pub mod log;
pub mod omdb;
pub mod reporter;
pub mod settings;
pub mod status;

use std::sync::OnceLock;

use testrail_core::TestRailClient;

pub use error::{HarnessError, Result};
pub use log::init_tracing;
pub use omdb::OmdbClient;
pub use reporter::RunReporter;
pub use settings::{OmdbSettings, Settings};
pub use status::TestStatus;

static SHARED_CLIENT: OnceLock<TestRailClient> = OnceLock::new();

/// Process-wide client configured from the environment.
///
/// Settings are read on first use only.
pub fn shared_client() -> Result<&'static TestRailClient> {
    if let Some(client) = SHARED_CLIENT.get() {
        return Ok(client);
    }
    let settings = Settings::from_env()?;
    Ok(SHARED_CLIENT.get_or_init(|| TestRailClient::from_config(&settings.testrail)))
}
