//! Club member as exposed by the membership directory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

/// Attendance status of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Attending,
    Absent,
    Graduated,
}

impl Attendance {
    pub fn as_str(self) -> &'static str {
        match self {
            Attendance::Attending => "attending",
            Attendance::Absent => "absent",
            Attendance::Graduated => "graduated",
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attendance {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attending" => Ok(Attendance::Attending),
            "absent" => Ok(Attendance::Absent),
            "graduated" => Ok(Attendance::Graduated),
            other => Err(AppError::internal(
                "Unknown attendance status in store",
                json!({ "attendance": other }),
            )),
        }
    }
}

/// A club member.
///
/// `on_delete` and `on_graduate` are flags layered on top of approval, not
/// exclusive states.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub department: String,
    pub attendance: Attendance,
    pub approved: bool,
    pub on_delete: bool,
    pub on_graduate: bool,
}

impl Member {
    /// Creates an approved, attending member with no pending flags.
    pub fn new(id: impl Into<String>, name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
            attendance: Attendance::Attending,
            approved: true,
            on_delete: false,
            on_graduate: false,
        }
    }

    /// Whether the member is billed for club fees: approved and not graduated.
    pub fn is_billable(&self) -> bool {
        self.approved && self.attendance != Attendance::Graduated
    }
}
