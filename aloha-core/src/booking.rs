//! Typed booking inquiry built from a validated form.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{
    FIELD_COMPANY_NAME, FIELD_EMAIL, FIELD_MESSAGE, FIELD_NAME, FIELD_PARTICIPANTS,
    FIELD_PHONE, FIELD_PLAN_TYPE, FIELD_TRAVEL_DATE,
};
use crate::error::BookingError;
use crate::plan::MainPlan;
use crate::validation::{BookingForm, FormValidator, parse_travel_date};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInquiry {
    pub plan: MainPlan,
    pub company_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub travel_date: NaiveDate,
    pub participants: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BookingInquiry {
    /// Validate `form` and convert it into an inquiry.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ValidationFailed`] when any required field
    /// fails its rule, and [`BookingError::NotFound`] or
    /// [`BookingError::InvalidArgument`] when a select carries a value the
    /// page never offers.
    pub fn from_form(form: &BookingForm, validator: &FormValidator) -> Result<Self, BookingError> {
        validator.validate_form(form).into_result()?;

        let plan = form.value(FIELD_PLAN_TYPE).parse::<MainPlan>()?;
        let participants = form
            .value(FIELD_PARTICIPANTS)
            .parse::<i32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                BookingError::invalid(
                    "participants",
                    format!("`{}` is not a positive count", form.value(FIELD_PARTICIPANTS)),
                )
            })?;
        let message = Some(form.value(FIELD_MESSAGE))
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        Ok(Self {
            plan,
            company_name: form.value(FIELD_COMPANY_NAME).to_string(),
            name: form.value(FIELD_NAME).to_string(),
            email: form.value(FIELD_EMAIL).to_string(),
            phone: form.value(FIELD_PHONE).to_string(),
            travel_date: parse_travel_date(form.value(FIELD_TRAVEL_DATE))?,
            participants,
            message,
        })
    }

    /// Modal heading for the inquiry's plan.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.plan.booking_title()
    }
}
