//! Authenticated caller identity.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

/// The member behind an authenticated request and their fee role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub member_id: String,
    pub fee_manager: bool,
}

impl Principal {
    /// Fails with [`AppError::Forbidden`] unless the caller manages club fees.
    pub fn require_fee_manager(&self) -> Result<(), AppError> {
        if self.fee_manager {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Permission denied",
                json!({ "required_role": "fee_management" }),
            ))
        }
    }

    /// Members may always read their own records; managers may read anyone's.
    pub fn require_self_or_fee_manager(&self, member_id: &str) -> Result<(), AppError> {
        if self.member_id == member_id {
            return Ok(());
        }
        self.require_fee_manager()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_limited_access() {
        let member = Principal {
            member_id: "20181681".to_string(),
            fee_manager: false,
        };
        assert!(member.require_fee_manager().is_err());
        assert!(member.require_self_or_fee_manager("20181681").is_ok());
        assert!(matches!(
            member.require_self_or_fee_manager("20190001"),
            Err(AppError::Forbidden { .. })
        ));

        let manager = Principal {
            member_id: "20170001".to_string(),
            fee_manager: true,
        };
        assert!(manager.require_fee_manager().is_ok());
        assert!(manager.require_self_or_fee_manager("20181681").is_ok());
    }
}
