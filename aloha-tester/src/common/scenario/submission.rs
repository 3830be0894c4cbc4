use anyhow::{Context, Result, ensure};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::forms::complete_form;
use super::{DeferredCheck, ScenarioCtx, TestScenario};
use aloha_core::constants::{MODAL_CLOSE_DELAY, SUBMIT_DELAY};
use aloha_core::{BookingInquiry, SubmissionStatus, submit_deferred};

pub fn scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::immediate(
            "submission-timer",
            "Submission Timer",
            "A scheduled submission confirms once after its delay, or never if cancelled",
            submission_timer_check,
        ),
        TestScenario::deferred(
            "deferred-submission",
            "Deferred Submission",
            "Tokio-timed submission resolves with a receipt and honours cancellation",
            deferred_submission_check,
        ),
    ]
}

fn submission_timer_check(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session();
    let fired = Rc::new(RefCell::new(0_u32));

    let sink = Rc::clone(&fired);
    let mut task = session.submit(&complete_form(ctx), move |receipt| {
        if receipt.close_after == MODAL_CLOSE_DELAY {
            *sink.borrow_mut() += 1;
        }
    })?;
    let half = SUBMIT_DELAY / 2;
    ensure!(task.advance(half) == SubmissionStatus::Pending, "completed early");
    ensure!(task.advance(half) == SubmissionStatus::Completed, "did not complete on time");
    task.advance(SUBMIT_DELAY);
    ensure!(*fired.borrow() == 1, "callback fired {} times", fired.borrow());

    let sink = Rc::clone(&fired);
    let mut cancelled = session.submit(&complete_form(ctx), move |_| *sink.borrow_mut() += 10)?;
    ensure!(cancelled.cancel(), "pending task refused to cancel");
    cancelled.advance(SUBMIT_DELAY * 2);
    ensure!(*fired.borrow() == 1, "cancelled task still confirmed");
    Ok(())
}

fn deferred_submission_check(ctx: ScenarioCtx) -> DeferredCheck {
    Box::pin(async move {
        let inquiry = BookingInquiry::from_form(&complete_form(&ctx), &ctx.validator())?;

        let (_keep, cancel) = tokio::sync::oneshot::channel::<()>();
        let receipt = submit_deferred(inquiry.clone(), Duration::from_millis(5), cancel)
            .await
            .context("uncancelled submission produced no receipt")?;
        ensure!(receipt.inquiry == inquiry, "receipt carries a different inquiry");

        let (tx, cancel) = tokio::sync::oneshot::channel::<()>();
        let pending = tokio::spawn(submit_deferred(inquiry, Duration::from_secs(60), cancel));
        let _ = tx.send(());
        let outcome = pending.await?;
        ensure!(outcome.is_none(), "cancelled submission still produced a receipt");
        Ok(())
    })
}
