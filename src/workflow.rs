use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchedulingError;

/// Lifecycle of a schedule record.
///
/// The allocator only ever creates `Pending` records and discards all of them at the
/// start of the next run. `Approved` pins a section to its room for every later run,
/// `Rejected` leaves the section eligible again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::Approved => "approved",
            ScheduleStatus::Rejected => "rejected",
        }
    }

    /// Applies a reviewer decision and returns the resulting status.
    pub fn decide(self, decision: Decision) -> ScheduleStatus {
        let next = decision.into();
        if self == next {
            log::debug!("decision {} repeats current status, nothing to do", decision);
        }
        next
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScheduleStatus::Pending),
            "approved" => Ok(ScheduleStatus::Approved),
            "rejected" => Ok(ScheduleStatus::Rejected),
            other => Err(SchedulingError::invalid(format!(
                "unknown schedule status '{}'",
                other
            ))),
        }
    }
}

/// The only two outcomes a reviewer may hand back for a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ScheduleStatus::from(*self).as_str())
    }
}

impl From<Decision> for ScheduleStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ScheduleStatus::Approved,
            Decision::Rejected => ScheduleStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Decision::Approved),
            "rejected" => Ok(Decision::Rejected),
            other => Err(SchedulingError::invalid(format!(
                "status must be 'approved' or 'rejected', got '{}'",
                other
            ))),
        }
    }
}
