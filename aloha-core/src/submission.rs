//! Deferred inquiry submission.
//!
//! There is no backend: a submission waits out its delay and then succeeds.
//! The page drives the wait by reporting elapsed time, and may cancel before
//! the callback fires. The callback fires at most once.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::booking::BookingInquiry;
use crate::constants::{MODAL_CLOSE_DELAY, SUBMISSION_CONFIRMATION, SUBMIT_DELAY};

/// Acknowledgement handed to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub inquiry: BookingInquiry,
    pub confirmation: String,
    /// How long the presenter keeps the modal open after confirming.
    pub close_after: Duration,
}

impl SubmissionReceipt {
    #[must_use]
    pub fn for_inquiry(inquiry: BookingInquiry) -> Self {
        Self {
            inquiry,
            confirmation: SUBMISSION_CONFIRMATION.to_string(),
            close_after: MODAL_CLOSE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Pending,
    Completed,
    Cancelled,
}

type CompletionCallback = Box<dyn FnOnce(SubmissionReceipt)>;

/// A scheduled submission with a single completion callback.
pub struct SubmissionTask {
    inquiry: Option<BookingInquiry>,
    delay: Duration,
    elapsed: Duration,
    status: SubmissionStatus,
    on_complete: Option<CompletionCallback>,
}

impl std::fmt::Debug for SubmissionTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionTask")
            .field("delay", &self.delay)
            .field("elapsed", &self.elapsed)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl SubmissionTask {
    /// Schedule `inquiry` with the standard delay.
    pub fn schedule(
        inquiry: BookingInquiry,
        on_complete: impl FnOnce(SubmissionReceipt) + 'static,
    ) -> Self {
        Self::with_delay(inquiry, SUBMIT_DELAY, on_complete)
    }

    pub fn with_delay(
        inquiry: BookingInquiry,
        delay: Duration,
        on_complete: impl FnOnce(SubmissionReceipt) + 'static,
    ) -> Self {
        Self {
            inquiry: Some(inquiry),
            delay,
            elapsed: Duration::ZERO,
            status: SubmissionStatus::Pending,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    #[must_use]
    pub const fn status(&self) -> SubmissionStatus {
        self.status
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, SubmissionStatus::Pending)
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.delay.saturating_sub(self.elapsed)
    }

    /// Report `dt` of elapsed time, completing the task once the delay has
    /// passed. Finished tasks ignore further time.
    pub fn advance(&mut self, dt: Duration) -> SubmissionStatus {
        if !self.is_pending() {
            return self.status;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.delay {
            self.complete();
        }
        self.status
    }

    fn complete(&mut self) {
        self.status = SubmissionStatus::Completed;
        if let (Some(inquiry), Some(callback)) = (self.inquiry.take(), self.on_complete.take()) {
            log::debug!("submission for {} completed", inquiry.plan);
            callback(SubmissionReceipt::for_inquiry(inquiry));
        }
    }

    /// Cancel a pending task. Returns `false` if it already finished.
    pub fn cancel(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = SubmissionStatus::Cancelled;
        self.on_complete = None;
        self.inquiry = None;
        log::debug!("submission cancelled after {:?}", self.elapsed);
        true
    }
}

/// Wait out `delay` on the tokio timer, then acknowledge `inquiry`.
///
/// Resolves to `None` if `cancel` fires (or its sender is dropped) first.
#[cfg(feature = "async")]
pub async fn submit_deferred(
    inquiry: BookingInquiry,
    delay: Duration,
    cancel: tokio::sync::oneshot::Receiver<()>,
) -> Option<SubmissionReceipt> {
    tokio::select! {
        () = tokio::time::sleep(delay) => Some(SubmissionReceipt::for_inquiry(inquiry)),
        _ = cancel => {
            log::debug!("deferred submission cancelled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::MainPlan;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn inquiry() -> BookingInquiry {
        BookingInquiry {
            plan: MainPlan::Honeymoon,
            company_name: "Kona Logistics".into(),
            name: "Aiko Tanaka".into(),
            email: "aiko@example.com".into(),
            phone: "03-1234-5678".into(),
            travel_date: NaiveDate::from_ymd_opt(2027, 2, 14).unwrap(),
            participants: 2,
            message: None,
        }
    }

    fn recording_task() -> (SubmissionTask, Rc<RefCell<Vec<SubmissionReceipt>>>) {
        let receipts = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&receipts);
        let task = SubmissionTask::schedule(inquiry(), move |r| sink.borrow_mut().push(r));
        (task, receipts)
    }

    #[test]
    fn completes_once_after_delay() {
        let (mut task, receipts) = recording_task();
        assert_eq!(task.advance(Duration::from_millis(1_500)), SubmissionStatus::Pending);
        assert_eq!(task.remaining(), Duration::from_millis(500));
        assert!(receipts.borrow().is_empty());

        assert_eq!(task.advance(Duration::from_millis(500)), SubmissionStatus::Completed);
        assert_eq!(task.advance(Duration::from_secs(10)), SubmissionStatus::Completed);
        assert_eq!(receipts.borrow().len(), 1);

        let receipt = &receipts.borrow()[0];
        assert_eq!(receipt.inquiry, inquiry());
        assert_eq!(receipt.close_after, MODAL_CLOSE_DELAY);
        assert_eq!(receipt.confirmation, SUBMISSION_CONFIRMATION);
    }

    #[test]
    fn cancel_drops_the_callback() {
        let (mut task, receipts) = recording_task();
        task.advance(Duration::from_millis(100));
        assert!(task.cancel());
        assert!(!task.cancel());
        assert_eq!(task.advance(SUBMIT_DELAY), SubmissionStatus::Cancelled);
        assert!(receipts.borrow().is_empty());
    }

    #[test]
    fn finished_task_cannot_be_cancelled() {
        let (mut task, receipts) = recording_task();
        task.advance(SUBMIT_DELAY);
        assert!(!task.cancel());
        assert_eq!(task.status(), SubmissionStatus::Completed);
        assert_eq!(receipts.borrow().len(), 1);
    }

    #[test]
    fn zero_delay_completes_on_first_tick() {
        let receipts = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&receipts);
        let mut task =
            SubmissionTask::with_delay(inquiry(), Duration::ZERO, move |_| *sink.borrow_mut() += 1);
        assert!(task.is_pending());
        task.advance(Duration::ZERO);
        assert_eq!(*receipts.borrow(), 1);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn deferred_submission_resolves_after_delay() {
        let (_keep, cancel) = tokio::sync::oneshot::channel::<()>();
        let receipt = submit_deferred(inquiry(), Duration::from_millis(5), cancel).await;
        assert_eq!(receipt.map(|r| r.inquiry), Some(inquiry()));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn deferred_submission_honours_cancel() {
        let (tx, cancel) = tokio::sync::oneshot::channel::<()>();
        tx.send(()).unwrap();
        let receipt = submit_deferred(inquiry(), Duration::from_secs(60), cancel).await;
        assert!(receipt.is_none());
    }
}
