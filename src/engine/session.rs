//! Profiling session handle.
//!
//! The session represents the connection to the profiled target. It is
//! owned by the external controller (the CLI, or an embedding
//! application); the engine only ever holds a weak reference so that
//! the aggregation pipeline never keeps a session alive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Aggregation mode, selected at session-configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfilingMode {
    /// Sampled CPU stacks, weight = sample count or duration
    CpuSampled,
    /// Allocation events, weight = bytes
    Allocations,
}

impl fmt::Display for ProfilingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfilingMode::CpuSampled => write!(f, "cpu-sampled"),
            ProfilingMode::Allocations => write!(f, "allocations"),
        }
    }
}

/// Session status as reported to listeners and command output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Configured,
    Running,
    Terminated,
}

/// Handle to a live profiling session.
///
/// Construction fixes name, pid and mode; only the status is mutable.
#[derive(Debug)]
pub struct ProfilingSession {
    name: String,
    pid: Option<u32>,
    mode: ProfilingMode,
    status: Mutex<SessionStatus>,
}

impl ProfilingSession {
    pub fn new(name: impl Into<String>, pid: Option<u32>, mode: ProfilingMode) -> Self {
        Self {
            name: name.into(),
            pid,
            mode,
            status: Mutex::new(SessionStatus::Configured),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn mode(&self) -> ProfilingMode {
        self.mode
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        let session = ProfilingSession::new("test", Some(42), ProfilingMode::CpuSampled);
        assert_eq!(session.status(), SessionStatus::Configured);

        session.set_status(SessionStatus::Running);
        assert_eq!(session.status(), SessionStatus::Running);
        assert_eq!(session.pid(), Some(42));
        assert_eq!(session.mode(), ProfilingMode::CpuSampled);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(ProfilingMode::CpuSampled.to_string(), "cpu-sampled");
        assert_eq!(ProfilingMode::Allocations.to_string(), "allocations");
    }
}
