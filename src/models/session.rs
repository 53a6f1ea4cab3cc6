use super::role::{Capability, Role};
use crate::errors::{AppError, AppResult};
use serde::Serialize;

/// Company and department association copied onto every clock event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tenancy {
    pub company_id: i64,
    pub department_ids: Vec<i64>,
}

/// The authenticated subject of one command invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: i64,
    pub name: String,
    pub role: Role,
    pub tenancy: Option<Tenancy>,
}

impl Session {
    pub fn require(&self, cap: Capability) -> AppResult<()> {
        if self.role.can(cap) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "{} '{}' cannot {}",
                self.role,
                self.name,
                cap.describe()
            )))
        }
    }

    pub fn tenancy(&self) -> AppResult<&Tenancy> {
        self.tenancy.as_ref().ok_or_else(|| {
            AppError::MissingTenancy(format!(
                "user '{}' is not assigned to any department",
                self.name
            ))
        })
    }
}
