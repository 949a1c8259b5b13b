//! In-process membership directory.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::entities::Member;
use crate::domain::repositories::MemberDirectory;
use crate::error::AppError;

/// Membership directory seeded by the caller, mainly for tests and demos.
#[derive(Default)]
pub struct MemoryMemberDirectory {
    members: RwLock<BTreeMap<String, Member>>,
}

impl MemoryMemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a member.
    pub async fn upsert(&self, member: Member) {
        self.members.write().await.insert(member.id.clone(), member);
    }
}

#[async_trait]
impl MemberDirectory for MemoryMemberDirectory {
    async fn find_by_ids(&self, ids: Vec<String>) -> Result<Vec<Member>, AppError> {
        let members = self.members.read().await;
        let mut found: Vec<Member> = ids
            .iter()
            .filter_map(|id| members.get(id).cloned())
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found.dedup_by(|a, b| a.id == b.id);
        Ok(found)
    }

    async fn find_billable(&self, excluding: Vec<String>) -> Result<Vec<Member>, AppError> {
        let members = self.members.read().await;
        Ok(members
            .values()
            .filter(|member| member.is_billable() && !excluding.contains(&member.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Attendance;

    #[tokio::test]
    async fn test_billable_excludes_graduates_and_applicants() {
        let directory = MemoryMemberDirectory::new();
        directory.upsert(Member::new("B", "Park", "CS")).await;
        directory.upsert(Member::new("A", "Kim", "CS")).await;

        let mut graduate = Member::new("G", "Han", "EE");
        graduate.attendance = Attendance::Graduated;
        directory.upsert(graduate).await;

        let mut applicant = Member::new("P", "Yoon", "EE");
        applicant.approved = false;
        directory.upsert(applicant).await;

        let billable = directory.find_billable(vec!["B".to_string()]).await.unwrap();
        let ids: Vec<&str> = billable.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["A"]);

        let found = directory
            .find_by_ids(vec!["G".to_string(), "A".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "A");
    }
}
