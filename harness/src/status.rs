//! TestRail result statuses used by the harness.

/// Outcome of a test case, encoded as TestRail's `status_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TestStatus {
    Passed = 1,
    Failed = 5,
}

impl TestStatus {
    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(TestStatus::Passed),
            5 => Some(TestStatus::Failed),
            _ => None,
        }
    }
}
