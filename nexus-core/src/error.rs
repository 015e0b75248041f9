//! Core error types for the campaign domain

use thiserror::Error;

/// Campaign definition validation errors
///
/// Validation failures are rejected synchronously before any persistent
/// state is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("campaign name must not be empty")]
    EmptyName,

    #[error("message template must not be empty")]
    EmptyTemplate,

    #[error("message template does not contain the customerName personalization placeholder")]
    MissingPlaceholder,
}
