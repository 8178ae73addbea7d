//! Process exit codes for failed commands.

use std::process::ExitCode;

use pharmastock_core::DomainError;
use pharmastock_infra::StoreError;

pub const USAGE: u8 = 2;
pub const NOT_FOUND: u8 = 3;
pub const CONFLICT: u8 = 4;
pub const UNAUTHORIZED: u8 = 5;
pub const FAILURE: u8 = 1;

fn domain_code(err: &DomainError) -> u8 {
    match err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => USAGE,
        DomainError::NotFound(_) => NOT_FOUND,
        DomainError::Conflict(_)
        | DomainError::InsufficientStock { .. }
        | DomainError::InvariantViolation(_) => CONFLICT,
        DomainError::Unauthorized(_) => UNAUTHORIZED,
    }
}

/// Exit code for the first error in the chain we know how to classify.
pub fn code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(store) = cause.downcast_ref::<StoreError>() {
            return match store {
                StoreError::Domain(domain) => domain_code(domain),
                StoreError::InvalidCredentials => UNAUTHORIZED,
                StoreError::Config(_) => USAGE,
                _ => FAILURE,
            };
        }
        if let Some(domain) = cause.downcast_ref::<DomainError>() {
            return domain_code(domain);
        }
    }
    FAILURE
}

pub fn report(err: &anyhow::Error) -> ExitCode {
    eprintln!("error: {err:#}");
    ExitCode::from(code_for(err))
}
