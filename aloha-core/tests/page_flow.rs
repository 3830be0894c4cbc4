use std::cell::RefCell;
use std::rc::Rc;

use aloha_core::constants::{
    FIELD_COMPANY_NAME, FIELD_EMAIL, FIELD_MESSAGE, FIELD_NAME, FIELD_PARTICIPANTS, FIELD_PHONE,
    FIELD_PLAN_TYPE, FIELD_TRAVEL_DATE, MODAL_CLOSE_DELAY, SUBMIT_DELAY,
};
use aloha_core::{
    BookingEngine, BookingForm, FieldError, FieldKind, FormValidator, MainPlan, PlanKey,
    PricingMode, StandardPrices, SubPlan, SubmissionStatus,
};
use chrono::NaiveDate;

fn validator() -> FormValidator {
    FormValidator::with_today(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
}

fn filled_form() -> BookingForm {
    BookingForm::new()
        .with(FIELD_PLAN_TYPE, "second-honeymoon")
        .with(FIELD_COMPANY_NAME, "Pacific Freight KK")
        .with(FIELD_NAME, "Haruka Ito")
        .with(FIELD_EMAIL, "haruka.ito@example.jp")
        .with(FIELD_PHONE, "+81 (3) 5555-0100")
        .with(FIELD_TRAVEL_DATE, "2027-04-10")
        .with(FIELD_PARTICIPANTS, "2")
        .with(FIELD_MESSAGE, "Anniversary trip")
}

#[test]
fn visitor_browses_prices_and_books() {
    let engine = BookingEngine::new(StandardPrices);
    let mut session = engine.create_session(validator()).unwrap();

    let shown = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&shown);
    session.subscribers_mut().on_price_computed(move |update| {
        if let Ok(b) = &update.outcome {
            sink.borrow_mut().push((update.plan.to_string(), b.final_price));
        }
    });

    session.start().unwrap();
    session.select_main_plan(MainPlan::SecondHoneymoon).unwrap();
    session
        .select_sub_plan(MainPlan::SecondHoneymoon, SubPlan::Deluxe)
        .unwrap();
    let deluxe = PlanKey::new(MainPlan::SecondHoneymoon, SubPlan::Deluxe);
    session.set_participant_count(deluxe, 4).unwrap();
    session.select_pricing_mode(deluxe, PricingMode::Regular).unwrap();

    assert_eq!(
        *shown.borrow(),
        vec![
            ("honeymoon-standard".to_string(), 480_000),
            ("second-honeymoon-comfort".to_string(), 610_000),
            ("second-honeymoon-deluxe".to_string(), 780_000),
            ("second-honeymoon-deluxe".to_string(), 1_560_000),
            ("second-honeymoon-deluxe".to_string(), 2_400_000),
        ]
    );

    // Back on the first tab the earlier tier is still chosen.
    session.select_main_plan(MainPlan::Honeymoon).unwrap();
    assert_eq!(session.state().active_plan().to_string(), "honeymoon-standard");
    session.select_main_plan(MainPlan::SecondHoneymoon).unwrap();
    assert_eq!(
        session.state().active_plan().to_string(),
        "second-honeymoon-deluxe"
    );

    let receipts = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&receipts);
    let mut task = session
        .submit(&filled_form(), move |r| sink.borrow_mut().push(r))
        .unwrap();
    assert_eq!(task.advance(SUBMIT_DELAY / 2), SubmissionStatus::Pending);
    assert_eq!(task.advance(SUBMIT_DELAY / 2), SubmissionStatus::Completed);

    let receipts = receipts.borrow();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].inquiry.plan, MainPlan::SecondHoneymoon);
    assert_eq!(receipts[0].inquiry.message.as_deref(), Some("Anniversary trip"));
    assert_eq!(receipts[0].close_after, MODAL_CLOSE_DELAY);
}

#[test]
fn blur_validation_reports_each_rule() {
    let engine = BookingEngine::new(StandardPrices);
    let mut session = engine.create_session(validator()).unwrap();

    let email = session.validate_field(FIELD_EMAIL, "user@", FieldKind::Email);
    assert_eq!(email.error, Some(FieldError::InvalidEmail));
    let phone = session.validate_field(FIELD_PHONE, "03-1234-5678", FieldKind::Phone);
    assert!(phone.is_valid);
    let date = session.validate_field(FIELD_TRAVEL_DATE, "2026-10-18", FieldKind::Date);
    assert_eq!(date.error, Some(FieldError::PastDate));
    let today = session.validate_field(FIELD_TRAVEL_DATE, "2026-10-19", FieldKind::Date);
    assert!(today.is_valid);
    let message = session.validate_field(FIELD_MESSAGE, "", FieldKind::TextArea);
    assert!(message.is_valid);
}

#[test]
fn cancelled_submission_never_confirms() {
    let engine = BookingEngine::new(StandardPrices);
    let mut session = engine.create_session(validator()).unwrap();
    let fired = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&fired);
    let mut task = session
        .submit(&filled_form(), move |_| *flag.borrow_mut() = true)
        .unwrap();
    assert!(task.cancel());
    task.advance(SUBMIT_DELAY * 2);
    assert!(!*fired.borrow());
}
