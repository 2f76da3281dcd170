/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, login, refresh, logout, profile and password reset
/// - `statuses`: Board columns (list, get, create, update, reorder, delete)
/// - `tasks`: Tasks (filtered list, get, create, update, delete)
///
/// Handlers that touch storage open one transaction per request, pass
/// `&mut *tx` into the model layer and commit before building the response.
/// Returning early with an error drops the transaction, which rolls it back.

use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use validator::{Validate, ValidationErrors};

pub mod auth;
pub mod health;
pub mod statuses;
pub mod tasks;

/// Runs `validator` rules and converts failures into a 422 response
pub(crate) fn validate_request<T: Validate>(req: &T) -> ApiResult<()> {
    req.validate().map_err(validation_error)
}

fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    // HashMap iteration order is arbitrary
    details.sort_by(|a, b| a.field.cmp(&b.field));
    ApiError::ValidationError(details)
}
