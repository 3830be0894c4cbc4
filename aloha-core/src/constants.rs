//! Centralized pricing, selection, and booking constants.
//!
//! Prices are tabulated for a fixed reference party; every other count is
//! scaled from it. Keeping the defaults together means the startup state and
//! the form contract can only change through reviewed code.

use std::time::Duration;

// Pricing -------------------------------------------------------------------
/// Party size the price table is tabulated for.
pub const REFERENCE_GROUP_SIZE: i32 = 2;
/// Participant count assumed for a plan before the visitor changes it.
pub const DEFAULT_PARTICIPANTS: i32 = 2;

// Booking form --------------------------------------------------------------
pub const FIELD_PLAN_TYPE: &str = "plan-type";
pub const FIELD_COMPANY_NAME: &str = "company-name";
pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_TRAVEL_DATE: &str = "travel-date";
pub const FIELD_PARTICIPANTS: &str = "participants";
pub const FIELD_MESSAGE: &str = "message";

/// Fields that must pass validation before an inquiry can be submitted.
pub const REQUIRED_FIELDS: [&str; 7] = [
    FIELD_PLAN_TYPE,
    FIELD_COMPANY_NAME,
    FIELD_NAME,
    FIELD_EMAIL,
    FIELD_PHONE,
    FIELD_TRAVEL_DATE,
    FIELD_PARTICIPANTS,
];

// Field error messages ------------------------------------------------------
pub const MSG_REQUIRED: &str = "required";
pub const MSG_INVALID_EMAIL: &str = "invalid email";
pub const MSG_INVALID_PHONE: &str = "invalid phone";
pub const MSG_PAST_DATE: &str = "must be a future date";
pub const MSG_INVALID_DATE: &str = "invalid date";

// Submission ----------------------------------------------------------------
/// Simulated round trip before an inquiry is acknowledged.
pub const SUBMIT_DELAY: Duration = Duration::from_millis(2_000);
/// How long the confirmation stays up before the modal closes itself.
pub const MODAL_CLOSE_DELAY: Duration = Duration::from_millis(2_000);
pub const SUBMISSION_CONFIRMATION: &str =
    "Your inquiry has been received. A representative will contact you within 2 business days.";
