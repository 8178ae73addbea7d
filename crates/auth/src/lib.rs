//! `pharmastock-auth` — employees, roles, passwords and authorization.
//!
//! This crate is intentionally decoupled from storage: the store loads and
//! persists employees, this crate decides what is valid and who may do what.

pub mod authorize;
pub mod employee;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError};
pub use employee::{AdminContact, DeletedEmployee, Employee, EmployeeUpdate, NewEmployee};
pub use password::{hash_password, verify_password, PasswordError, PasswordHash};
pub use permissions::Permission;
pub use principal::{Principal, Session};
pub use roles::{Landing, Role};
