use core::str::FromStr;

use serde::{Deserialize, Serialize};

use pharmastock_core::DomainError;

use crate::Permission;

/// Role of an employee.
///
/// The database constrains the column to `admin` / `employee`; parsing also
/// accepts the Spanish labels older databases used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

/// Screen a role lands on after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Landing {
    /// Main administration menu.
    Menu,
    /// Point of sale.
    Sales,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    /// Permissions granted to the role.
    pub fn permissions(&self) -> Vec<Permission> {
        match self {
            Role::Admin => vec![Permission::ALL],
            Role::Employee => vec![
                Permission::PRODUCTS_READ,
                Permission::LOTS_READ,
                Permission::SUPPLIERS_READ,
                Permission::SALES_CREATE,
                Permission::MOVEMENTS_READ,
            ],
        }
    }

    pub fn landing(&self) -> Landing {
        match self {
            Role::Admin => Landing::Menu,
            Role::Employee => Landing::Sales,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrador" | "gerente" => Ok(Role::Admin),
            "employee" | "empleado" | "vendedor" => Ok(Role::Employee),
            other => Err(DomainError::validation(format!(
                "unknown role '{other}' (expected admin or employee)"
            ))),
        }
    }
}

impl core::fmt::Display for Landing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Landing::Menu => f.write_str("menu"),
            Landing::Sales => f.write_str("sales"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_legacy_labels() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Gerente ".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("EMPLEADO".parse::<Role>().unwrap(), Role::Employee);
        assert_eq!("employee".parse::<Role>().unwrap(), Role::Employee);
        assert!(matches!(
            "cajero".parse::<Role>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn admins_land_on_menu_and_employees_on_sales() {
        assert_eq!(Role::Admin.landing(), Landing::Menu);
        assert_eq!(Role::Employee.landing(), Landing::Sales);
    }

    #[test]
    fn employees_cannot_write_products() {
        let perms = Role::Employee.permissions();
        assert!(perms.contains(&Permission::SALES_CREATE));
        assert!(!perms.contains(&Permission::PRODUCTS_WRITE));
        assert!(!perms.iter().any(Permission::is_wildcard));
    }
}
