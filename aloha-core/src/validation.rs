//! Booking form field rules.
//!
//! Validation is pure: it reports a [`FieldValidationResult`] per field and
//! leaves highlighting and message placement to the presenter.
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    FIELD_COMPANY_NAME, FIELD_EMAIL, FIELD_MESSAGE, FIELD_NAME, FIELD_PARTICIPANTS,
    FIELD_PHONE, FIELD_PLAN_TYPE, FIELD_TRAVEL_DATE, MSG_INVALID_DATE, MSG_INVALID_EMAIL,
    MSG_INVALID_PHONE, MSG_PAST_DATE, MSG_REQUIRED, REQUIRED_FIELDS,
};
use crate::error::BookingError;

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());
static PHONE_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[0-9\-\+\(\)\s]+$").ok());

const DATE_FORMAT: &str = "%Y-%m-%d";

fn pattern_matches(pattern: &Lazy<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

/// Input control type, which selects the format rule applied after the
/// required check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Date,
    Select,
    TextArea,
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldError {
    Required,
    InvalidEmail,
    InvalidPhone,
    PastDate,
    InvalidDate,
}

impl FieldError {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Required => MSG_REQUIRED,
            Self::InvalidEmail => MSG_INVALID_EMAIL,
            Self::InvalidPhone => MSG_INVALID_PHONE,
            Self::PastDate => MSG_PAST_DATE,
            Self::InvalidDate => MSG_INVALID_DATE,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of validating one field. Replaced on every re-validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidationResult {
    pub field_id: String,
    pub is_valid: bool,
    pub error: Option<FieldError>,
}

impl FieldValidationResult {
    #[must_use]
    pub fn passed(field_id: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            is_valid: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(field_id: impl Into<String>, error: FieldError) -> Self {
        Self {
            field_id: field_id.into(),
            is_valid: false,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.map(FieldError::message)
    }
}

/// Declared shape of one form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// The booking modal's controls.
pub const BOOKING_FIELDS: [FieldSpec; 8] = [
    FieldSpec { id: FIELD_PLAN_TYPE, kind: FieldKind::Select, required: true },
    FieldSpec { id: FIELD_COMPANY_NAME, kind: FieldKind::Text, required: true },
    FieldSpec { id: FIELD_NAME, kind: FieldKind::Text, required: true },
    FieldSpec { id: FIELD_EMAIL, kind: FieldKind::Email, required: true },
    FieldSpec { id: FIELD_PHONE, kind: FieldKind::Phone, required: true },
    FieldSpec { id: FIELD_TRAVEL_DATE, kind: FieldKind::Date, required: true },
    FieldSpec { id: FIELD_PARTICIPANTS, kind: FieldKind::Select, required: true },
    FieldSpec { id: FIELD_MESSAGE, kind: FieldKind::TextArea, required: false },
];

/// Raw values of the booking form keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingForm {
    values: BTreeMap<String, String>,
}

impl BookingForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field_id: &str, value: impl Into<String>) -> Self {
        self.set(field_id, value);
        self
    }

    pub fn set(&mut self, field_id: &str, value: impl Into<String>) {
        self.values.insert(field_id.to_string(), value.into());
    }

    /// Trimmed value, empty when the field was never filled.
    #[must_use]
    pub fn value(&self, field_id: &str) -> &str {
        self.values.get(field_id).map_or("", |v| v.trim())
    }

    /// Drop every value, as the modal does after closing.
    pub fn reset(&mut self) {
        self.values.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Every field result from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormReport {
    pub results: Vec<FieldValidationResult>,
}

impl FormReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|r| r.is_valid)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FieldValidationResult> {
        self.results.iter().filter(|r| !r.is_valid)
    }

    /// Convert into the error that blocks submission.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ValidationFailed`] listing each failed field.
    pub fn into_result(self) -> Result<(), BookingError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(BookingError::ValidationFailed {
            failures: self.results.into_iter().filter(|r| !r.is_valid).collect(),
        })
    }
}

/// Applies the field rules. Dates are compared against the local calendar
/// day at the time of each check unless a day was pinned with
/// [`FormValidator::with_today`].
#[derive(Debug, Clone)]
pub struct FormValidator {
    today: Option<NaiveDate>,
    fields: Vec<FieldSpec>,
}

impl Default for FormValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormValidator {
    /// Validator for the booking modal, dated to the local calendar day.
    #[must_use]
    pub fn new() -> Self {
        Self {
            today: None,
            fields: BOOKING_FIELDS.to_vec(),
        }
    }

    #[must_use]
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            today: Some(today),
            fields: BOOKING_FIELDS.to_vec(),
        }
    }

    /// The day travel dates are measured against for the next check.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    #[must_use]
    pub fn field(&self, field_id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    fn is_required(&self, field_id: &str) -> bool {
        self.field(field_id).is_some_and(|f| f.required)
    }

    /// Check one value. Rules run in order and the first failure wins:
    /// required, email shape, phone characters, date not in the past.
    #[must_use]
    pub fn validate_field(&self, field_id: &str, value: &str, kind: FieldKind) -> FieldValidationResult {
        match self.check(field_id, value.trim(), kind) {
            Some(error) => FieldValidationResult::failed(field_id, error),
            None => FieldValidationResult::passed(field_id),
        }
    }

    fn check(&self, field_id: &str, value: &str, kind: FieldKind) -> Option<FieldError> {
        if value.is_empty() {
            return self.is_required(field_id).then_some(FieldError::Required);
        }
        match kind {
            FieldKind::Email if !pattern_matches(&EMAIL_PATTERN, value) => Some(FieldError::InvalidEmail),
            FieldKind::Phone if !pattern_matches(&PHONE_PATTERN, value) => Some(FieldError::InvalidPhone),
            FieldKind::Date => match NaiveDate::parse_from_str(value, DATE_FORMAT) {
                Ok(date) if date < self.today() => Some(FieldError::PastDate),
                Ok(_) => None,
                Err(_) => Some(FieldError::InvalidDate),
            },
            _ => None,
        }
    }

    /// Validate every required field of the form.
    #[must_use]
    pub fn validate_form(&self, form: &BookingForm) -> FormReport {
        let results = REQUIRED_FIELDS
            .iter()
            .map(|id| {
                let kind = self.field(id).map_or(FieldKind::Text, |f| f.kind);
                self.validate_field(id, form.value(id), kind)
            })
            .collect();
        FormReport { results }
    }
}

/// Parse a `YYYY-MM-DD` travel date.
///
/// # Errors
///
/// Returns [`BookingError::InvalidArgument`] for anything else.
pub fn parse_travel_date(value: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| BookingError::invalid(FIELD_TRAVEL_DATE, e.to_string()))
}
