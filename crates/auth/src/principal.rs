use serde::{Deserialize, Serialize};

use pharmastock_core::EmployeeId;

use crate::{Landing, Permission, Role};

/// An authenticated employee acting on the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub employee_id: EmployeeId,
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn new(employee_id: EmployeeId, name: impl Into<String>, role: Role) -> Self {
        Self {
            employee_id,
            name: name.into(),
            role,
        }
    }

    pub fn permissions(&self) -> Vec<Permission> {
        self.role.permissions()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub principal: Principal,
    pub landing: Landing,
}

impl Session {
    pub fn new(principal: Principal) -> Self {
        let landing = principal.role.landing();
        Self { principal, landing }
    }
}
