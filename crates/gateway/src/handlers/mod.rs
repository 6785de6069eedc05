//! API handlers module

pub mod demo;
pub mod health;
pub mod papers;
pub mod search;

use paperscope_common::errors::{AppError, Result};
use validator::Validate;

/// Run `validator` rules and map failures to a validation error
pub(crate) fn validate_body(body: &impl Validate) -> Result<()> {
    body.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: e.field_errors().keys().next().map(|f| f.to_string()),
    })
}
