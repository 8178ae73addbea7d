use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "products.write").
/// The wildcard permission `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const ALL: Permission = Permission(Cow::Borrowed("*"));

    pub const EMPLOYEES_READ: Permission = Permission(Cow::Borrowed("employees.read"));
    pub const EMPLOYEES_WRITE: Permission = Permission(Cow::Borrowed("employees.write"));
    pub const PRODUCTS_READ: Permission = Permission(Cow::Borrowed("products.read"));
    pub const PRODUCTS_WRITE: Permission = Permission(Cow::Borrowed("products.write"));
    pub const LOTS_READ: Permission = Permission(Cow::Borrowed("lots.read"));
    pub const LOTS_WRITE: Permission = Permission(Cow::Borrowed("lots.write"));
    pub const SUPPLIERS_READ: Permission = Permission(Cow::Borrowed("suppliers.read"));
    pub const SUPPLIERS_WRITE: Permission = Permission(Cow::Borrowed("suppliers.write"));
    pub const SALES_CREATE: Permission = Permission(Cow::Borrowed("sales.create"));
    pub const MOVEMENTS_READ: Permission = Permission(Cow::Borrowed("movements.read"));
    pub const STOCK_ADJUST: Permission = Permission(Cow::Borrowed("stock.adjust"));
    pub const REPORTS_READ: Permission = Permission(Cow::Borrowed("reports.read"));
    pub const AUDIT_READ: Permission = Permission(Cow::Borrowed("audit.read"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
