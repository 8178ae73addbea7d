//! Employee records and their validation rules.
//!
//! Employees are both staff records (CRUD, soft-delete) and the identities
//! that log in and act on the inventory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pharmastock_core::error::required;
use pharmastock_core::{DomainError, DomainResult, EmployeeId, Entity};

use crate::password::validate_new_password;
use crate::{Principal, Role};

/// Minimum number of digits in a CI (national ID).
pub const MIN_CI_DIGITS: usize = 4;

// ─────────────────────────────────────────────────────────────────────────────
// Employee
// ─────────────────────────────────────────────────────────────────────────────

/// A live employee record (the password hash never leaves the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub ci: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.full_name(), self.role)
    }
}

/// A soft-deleted employee, as kept in `deleted_employees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedEmployee {
    pub id: EmployeeId,
    pub ci: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub deleted_at: DateTime<Utc>,
}

/// Name and phone of an administrator (shown to users who need a password reset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminContact {
    pub name: String,
    pub phone: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

/// Input to register an employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub ci: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub role: Role,
    pub password: String,
    pub password_confirmation: String,
}

impl NewEmployee {
    /// Validate and normalize (trim) all fields.
    pub fn validated(self) -> DomainResult<Self> {
        validate_new_password(&self.password, &self.password_confirmation)?;
        Ok(Self {
            name: required("name", &self.name)?,
            surname: required("surname", &self.surname)?,
            phone: required("phone", &self.phone)?,
            ci: validate_ci(&self.ci)?,
            role: self.role,
            password: self.password.trim().to_string(),
            password_confirmation: self.password_confirmation.trim().to_string(),
        })
    }
}

/// Input to edit an employee. A `None` password keeps the current hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub ci: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub role: Role,
    pub new_password: Option<(String, String)>,
}

impl EmployeeUpdate {
    pub fn validated(self) -> DomainResult<Self> {
        // A blank password field means "unchanged".
        let new_password = match self.new_password {
            Some((password, _)) if password.trim().is_empty() => None,
            Some((password, confirmation)) => {
                validate_new_password(&password, &confirmation)?;
                Some((password.trim().to_string(), confirmation.trim().to_string()))
            }
            None => None,
        };

        Ok(Self {
            name: required("name", &self.name)?,
            surname: required("surname", &self.surname)?,
            phone: required("phone", &self.phone)?,
            ci: validate_ci(&self.ci)?,
            role: self.role,
            new_password,
        })
    }
}

/// A CI is numeric and has at least [`MIN_CI_DIGITS`] digits.
pub fn validate_ci(ci: &str) -> DomainResult<String> {
    let ci = ci.trim();
    if ci.len() < MIN_CI_DIGITS || !ci.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation(format!(
            "CI must be numeric with at least {MIN_CI_DIGITS} digits"
        )));
    }
    Ok(ci.to_string())
}
