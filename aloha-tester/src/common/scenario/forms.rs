use anyhow::{Result, ensure};
use chrono::Days;

use super::{ScenarioCtx, TestScenario};
use aloha_core::constants::{
    FIELD_COMPANY_NAME, FIELD_EMAIL, FIELD_MESSAGE, FIELD_NAME, FIELD_PARTICIPANTS, FIELD_PHONE,
    FIELD_PLAN_TYPE, FIELD_TRAVEL_DATE, REQUIRED_FIELDS,
};
use aloha_core::{BookingError, BookingForm, FieldError, FieldKind};

pub fn scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::immediate(
            "field-rules",
            "Field Rules",
            "Blur validation applies required, email, phone, and date rules",
            field_rules_check,
        ),
        TestScenario::immediate(
            "form-gate",
            "Form Submission Gate",
            "Incomplete forms are blocked and complete forms schedule a submission",
            form_gate_check,
        ),
    ]
}

pub(crate) fn complete_form(ctx: &ScenarioCtx) -> BookingForm {
    let travel = ctx
        .today
        .checked_add_days(Days::new(30))
        .unwrap_or(ctx.today);
    BookingForm::new()
        .with(FIELD_PLAN_TYPE, "honeymoon")
        .with(FIELD_COMPANY_NAME, "Kona Logistics")
        .with(FIELD_NAME, "Aiko Tanaka")
        .with(FIELD_EMAIL, "aiko@example.com")
        .with(FIELD_PHONE, "03-1234-5678")
        .with(FIELD_TRAVEL_DATE, travel.format("%Y-%m-%d").to_string())
        .with(FIELD_PARTICIPANTS, ctx.party_size().to_string())
}

fn expect_error(
    ctx: &ScenarioCtx,
    field: &str,
    value: &str,
    kind: FieldKind,
    expected: Option<FieldError>,
) -> Result<()> {
    let result = ctx.validator().validate_field(field, value, kind);
    ensure!(
        result.error == expected,
        "{field}={value:?}: expected {expected:?}, got {:?}",
        result.error
    );
    ensure!(result.is_valid == expected.is_none(), "{field}: is_valid disagrees with error");
    Ok(())
}

fn field_rules_check(ctx: &ScenarioCtx) -> Result<()> {
    let yesterday = ctx.today.pred_opt().unwrap_or(ctx.today);
    let today = ctx.today.format("%Y-%m-%d").to_string();
    let yesterday = yesterday.format("%Y-%m-%d").to_string();

    expect_error(ctx, FIELD_NAME, "   ", FieldKind::Text, Some(FieldError::Required))?;
    expect_error(ctx, FIELD_MESSAGE, "", FieldKind::TextArea, None)?;
    expect_error(ctx, FIELD_EMAIL, "user@", FieldKind::Email, Some(FieldError::InvalidEmail))?;
    expect_error(ctx, FIELD_EMAIL, "a@b.co", FieldKind::Email, None)?;
    expect_error(ctx, FIELD_PHONE, "03-1234-5678", FieldKind::Phone, None)?;
    expect_error(ctx, FIELD_PHONE, "call me", FieldKind::Phone, Some(FieldError::InvalidPhone))?;
    expect_error(ctx, FIELD_TRAVEL_DATE, &today, FieldKind::Date, None)?;
    expect_error(
        ctx,
        FIELD_TRAVEL_DATE,
        &yesterday,
        FieldKind::Date,
        Some(FieldError::PastDate),
    )?;
    expect_error(
        ctx,
        FIELD_TRAVEL_DATE,
        "next spring",
        FieldKind::Date,
        Some(FieldError::InvalidDate),
    )?;
    Ok(())
}

fn form_gate_check(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session();

    let empty = session.submit(&BookingForm::new(), |_| {});
    match empty {
        Err(BookingError::ValidationFailed { failures }) => ensure!(
            failures.len() == REQUIRED_FIELDS.len(),
            "expected every required field to fail, got {}",
            failures.len()
        ),
        Err(other) => anyhow::bail!("unexpected error for empty form: {other}"),
        Ok(_) => anyhow::bail!("empty form was accepted"),
    }

    let bad_email = complete_form(ctx).with(FIELD_EMAIL, "nobody");
    ensure!(!session.validate_form(&bad_email), "invalid email passed the form");

    let task = session.submit(&complete_form(ctx), |_| {})?;
    ensure!(task.is_pending(), "new submission should be pending");
    Ok(())
}
