use thiserror::Error;

use pharmastock_core::DomainError;

use crate::{Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {employee} lacks permission '{permission}'")]
    Forbidden { employee: String, permission: String },
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::unauthorized(value.to_string())
    }
}

/// Authorize a principal for one operation.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let granted = principal
        .permissions()
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        tracing::debug!(
            employee_id = %principal.employee_id,
            permission = %required,
            "authorization denied"
        );
        Err(AuthzError::Forbidden {
            employee: principal.name.clone(),
            permission: required.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use pharmastock_core::EmployeeId;

    fn principal(role: Role) -> Principal {
        Principal::new(EmployeeId::new(1), "Ana", role)
    }

    #[test]
    fn admin_wildcard_grants_everything() {
        let admin = principal(Role::Admin);
        assert!(authorize(&admin, &Permission::EMPLOYEES_WRITE).is_ok());
        assert!(authorize(&admin, &Permission::new("anything.at_all")).is_ok());
    }

    #[test]
    fn employee_may_sell_but_not_manage_staff() {
        let clerk = principal(Role::Employee);
        assert!(authorize(&clerk, &Permission::SALES_CREATE).is_ok());

        let err = authorize(&clerk, &Permission::EMPLOYEES_WRITE).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                employee: "Ana".to_string(),
                permission: "employees.write".to_string(),
            }
        );
    }

    #[test]
    fn authz_errors_become_unauthorized_domain_errors() {
        let clerk = principal(Role::Employee);
        let err: DomainError = authorize(&clerk, &Permission::AUDIT_READ).unwrap_err().into();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
