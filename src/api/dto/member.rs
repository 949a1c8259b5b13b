//! Member representation in ledger reports.

use serde::Serialize;

use crate::domain::entities::{Attendance, Member};

#[derive(Debug, Serialize)]
pub struct MemberItem {
    pub id: String,
    pub name: String,
    pub department: String,
    pub attendance: Attendance,
}

impl From<Member> for MemberItem {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            name: member.name,
            department: member.department,
            attendance: member.attendance,
        }
    }
}
