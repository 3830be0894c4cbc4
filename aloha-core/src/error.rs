//! Recoverable error taxonomy shared by pricing, selection, and booking.
use thiserror::Error;

use crate::validation::FieldValidationResult;

/// Errors surfaced to the presenter. None of them are fatal; each one maps to
/// a state the page can render ("plan unavailable", a field message, ...).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("no plan registered for `{plan}`")]
    NotFound { plan: String },
    #[error("{field} is invalid: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
    #[error("{} field(s) failed validation", .failures.len())]
    ValidationFailed { failures: Vec<FieldValidationResult> },
}

impl BookingError {
    pub(crate) fn not_found(plan: impl Into<String>) -> Self {
        Self::NotFound { plan: plan.into() }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the presenter should show its "plan unavailable" state.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while loading a price table configuration.
#[derive(Debug, Error)]
pub enum PriceTableError {
    #[error("price table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("plan `{id}` is listed more than once")]
    DuplicatePlan { id: String },
    #[error("plan `{id}` has a company price {company_base} above its regular price {regular_base}")]
    CompanyAboveRegular {
        id: String,
        company_base: i64,
        regular_base: i64,
    },
    #[error("plan `{id}` has a negative {field} ({value})")]
    NegativeAmount {
        id: String,
        field: &'static str,
        value: i64,
    },
}
