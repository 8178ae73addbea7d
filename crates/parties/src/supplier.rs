use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pharmastock_core::error::{optional, required};
use pharmastock_core::{DomainError, DomainResult, Entity, SupplierId};

/// Supplier status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierStatus {
    Active,
    Inactive,
}

impl SupplierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl core::fmt::Display for SupplierStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplierStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "activo" => Ok(Self::Active),
            "inactive" | "inactivo" => Ok(Self::Inactive),
            other => Err(DomainError::validation(format!("unknown supplier status '{other}'"))),
        }
    }
}

/// Contact information for a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub contact_name: Option<String>,
    pub phone: String,
    pub email: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub tax_id: Option<String>,
    pub contact: ContactInfo,
    pub status: SupplierStatus,
    pub registered_at: DateTime<Utc>,
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Supplier {
    /// Only active suppliers may be referenced by newly received lots.
    pub fn ensure_can_supply(&self) -> DomainResult<()> {
        match self.status {
            SupplierStatus::Active => Ok(()),
            SupplierStatus::Inactive => Err(DomainError::invariant(format!(
                "supplier '{}' is inactive",
                self.name
            ))),
        }
    }
}

/// Input to register a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub tax_id: Option<String>,
    pub contact_name: Option<String>,
    pub phone: String,
    pub email: String,
    pub address: Option<String>,
}

impl NewSupplier {
    pub fn validate(self) -> DomainResult<Self> {
        Ok(Self {
            name: required("name", &self.name)?,
            tax_id: optional(self.tax_id.as_deref()),
            contact_name: optional(self.contact_name.as_deref()),
            phone: required("phone", &self.phone)?,
            email: validate_email(&self.email)?,
            address: optional(self.address.as_deref()),
        })
    }
}

/// An email needs text on both sides of a single `@`.
fn validate_email(email: &str) -> DomainResult<String> {
    let email = required("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(DomainError::validation(format!("invalid email '{email}'"))),
    }
}
