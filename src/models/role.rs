use crate::errors::AppError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Superadmin,
    Owner,
    Admin,
    User,
}

/// Things a role may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    TrackTime,
    ManageCompanies,
    ManageDepartments,
    ManageUsers,
    ViewOwnReport,
}

impl Capability {
    pub fn describe(&self) -> &'static str {
        match self {
            Capability::TrackTime => "track time",
            Capability::ManageCompanies => "manage companies",
            Capability::ManageDepartments => "manage departments",
            Capability::ManageUsers => "manage users",
            Capability::ViewOwnReport => "view time reports",
        }
    }
}

impl Role {
    pub fn can(&self, cap: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Superadmin => matches!(cap, ManageCompanies | ManageDepartments | ManageUsers),
            Role::Owner => true,
            Role::Admin => matches!(cap, TrackTime | ManageUsers | ViewOwnReport),
            Role::User => matches!(cap, TrackTime | ViewOwnReport),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Role::Superadmin => 3,
            Role::Owner => 2,
            Role::Admin => 1,
            Role::User => 0,
        }
    }

    /// Strictly higher in the order Superadmin > Owner > Admin > User.
    pub fn outranks(&self, other: Role) -> bool {
        self.rank() > other.rank()
    }

    /// Whether a user with this role may create a user with role `other`.
    /// Superadmins create anyone, Owners create Admins and Users, Admins only Users.
    pub fn can_create(&self, other: Role) -> bool {
        match self {
            Role::Superadmin => true,
            Role::Owner => matches!(other, Role::Owner | Role::Admin | Role::User),
            Role::Admin => other == Role::User,
            Role::User => false,
        }
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "Superadmin",
            Role::Owner => "Owner",
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Superadmin" => Some(Role::Superadmin),
            "Owner" => Some(Role::Owner),
            "Admin" => Some(Role::Admin),
            "User" => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "superadmin" => Ok(Role::Superadmin),
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(AppError::InvalidRole(format!(
                "'{}' (expected superadmin, owner, admin or user)",
                s
            ))),
        }
    }
}
