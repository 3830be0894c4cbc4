//! Page session: selection, pricing, form checks, and presenter callbacks behind one handle.

use crate::booking::BookingInquiry;
use crate::error::BookingError;
use crate::observer::{PriceUpdate, Subscribers};
use crate::plan::{MainPlan, PlanKey, SubPlan};
use crate::pricing::{PriceBreakdown, PriceTable, PricingMode, compute};
use crate::selection::{SelectionState, Transition};
use crate::submission::{SubmissionReceipt, SubmissionTask};
use crate::validation::{BookingForm, FieldKind, FieldValidationResult, FormReport, FormValidator};

/// Page-lifetime session binding the price table, the selection state, and
/// the presenter callbacks.
///
/// Every applied transition notifies selection subscribers, recomputes the
/// affected plan, and hands the outcome to price subscribers. A missing
/// price arrives as `Err(NotFound)` rather than aborting the page.
#[derive(Debug)]
pub struct PlanSession {
    table: PriceTable,
    state: SelectionState,
    validator: FormValidator,
    subscribers: Subscribers,
}

impl PlanSession {
    /// Construct a session at the startup selection.
    #[must_use]
    pub fn new(table: PriceTable, validator: FormValidator) -> Self {
        Self::from_state(table, validator, SelectionState::new())
    }

    /// Build a session from an existing selection state.
    #[must_use]
    pub fn from_state(table: PriceTable, validator: FormValidator, state: SelectionState) -> Self {
        Self {
            table,
            state,
            validator,
            subscribers: Subscribers::new(),
        }
    }

    /// Presenter registration points.
    pub fn subscribers_mut(&mut self) -> &mut Subscribers {
        &mut self.subscribers
    }

    /// Publish the current selection and its price, as the page does once
    /// it has loaded.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when the active plan has no price.
    pub fn start(&mut self) -> Result<PriceBreakdown, BookingError> {
        let key = self.state.active_plan();
        self.publish(key)
    }

    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when the newly visible plan has no
    /// price.
    pub fn select_main_plan(&mut self, main: MainPlan) -> Result<PriceBreakdown, BookingError> {
        let transition = self.state.select_main_plan(main);
        self.apply(transition).unwrap_or_else(|| self.current_quote())
    }

    /// Returns `Ok(None)` when the selection was ignored because `main` is
    /// not the active tab.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when `main` does not offer `sub` or
    /// the plan has no price.
    pub fn select_sub_plan(
        &mut self,
        main: MainPlan,
        sub: SubPlan,
    ) -> Result<Option<PriceBreakdown>, BookingError> {
        let transition = self.state.select_sub_plan(main, sub)?;
        self.apply(transition).transpose()
    }

    /// Single-id selection kept for old links: a bare main plan id opens that
    /// plan at its first tier. Unknown ids are ignored.
    pub fn select_plan(&mut self, plan_id: &str) -> Option<Result<PriceBreakdown, BookingError>> {
        let Ok(main) = plan_id.parse::<MainPlan>() else {
            log::warn!("ignoring unknown plan id `{plan_id}`");
            return None;
        };
        self.state.select_main_plan(main);
        let transition = self
            .state
            .select_sub_plan(main, main.first_sub_plan())
            .unwrap_or(Transition::Ignored);
        self.apply(transition)
    }

    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when `key` is not in the catalog or
    /// has no price.
    pub fn select_pricing_mode(
        &mut self,
        key: PlanKey,
        mode: PricingMode,
    ) -> Result<PriceBreakdown, BookingError> {
        self.state.select_pricing_mode(key, mode)?;
        self.publish(key)
    }

    /// Change the party size for `key`. A rejected count leaves the state as
    /// it was and is also reported to the price subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] for a non-positive count and
    /// [`BookingError::NotFound`] when `key` is not in the catalog or has no
    /// price.
    pub fn set_participant_count(
        &mut self,
        key: PlanKey,
        count: i32,
    ) -> Result<PriceBreakdown, BookingError> {
        if let Err(err) = self.state.set_participant_count(key, count) {
            self.subscribers.price_computed(&PriceUpdate {
                plan: key,
                outcome: Err(err.clone()),
            });
            return Err(err);
        }
        self.publish(key)
    }

    fn apply(&mut self, transition: Transition) -> Option<Result<PriceBreakdown, BookingError>> {
        transition.recompute().map(|key| self.publish(key))
    }

    fn publish(&mut self, key: PlanKey) -> Result<PriceBreakdown, BookingError> {
        self.subscribers.selection_changed(&self.state);
        let outcome = self.quote(&key);
        if let Err(err) = &outcome {
            log::warn!("no price for {key}: {err}");
        }
        self.subscribers.price_computed(&PriceUpdate {
            plan: key,
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Price `key` with its remembered mode and party size.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when the table has no row for `key`.
    pub fn quote(&self, key: &PlanKey) -> Result<PriceBreakdown, BookingError> {
        let settings = self.state.settings(key);
        compute(&self.table, key, settings.participants, settings.mode)
    }

    /// Price the visible plan.
    ///
    /// # Errors
    ///
    /// Same as [`PlanSession::quote`].
    pub fn current_quote(&self) -> Result<PriceBreakdown, BookingError> {
        self.quote(&self.state.active_plan())
    }

    /// Validate a single field on blur and notify subscribers.
    pub fn validate_field(
        &mut self,
        field_id: &str,
        value: &str,
        kind: FieldKind,
    ) -> FieldValidationResult {
        let result = self.validator.validate_field(field_id, value, kind);
        self.subscribers.field_validated(&result);
        result
    }

    fn check_form(&mut self, form: &BookingForm) -> FormReport {
        let report = self.validator.validate_form(form);
        for result in &report.results {
            self.subscribers.field_validated(result);
        }
        report
    }

    /// Validate every required field, notifying subscribers per field.
    pub fn validate_form(&mut self, form: &BookingForm) -> bool {
        self.check_form(form).is_valid()
    }

    /// Validate `form` and schedule its submission.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ValidationFailed`] when a field fails, or the
    /// conversion error for a select value the page never offers.
    pub fn submit(
        &mut self,
        form: &BookingForm,
        on_complete: impl FnOnce(SubmissionReceipt) + 'static,
    ) -> Result<SubmissionTask, BookingError> {
        self.check_form(form).into_result()?;
        let inquiry = BookingInquiry::from_form(form, &self.validator)?;
        log::debug!("scheduling inquiry for {}", inquiry.plan);
        Ok(SubmissionTask::schedule(inquiry, on_complete))
    }

    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    #[must_use]
    pub const fn table(&self) -> &PriceTable {
        &self.table
    }

    #[must_use]
    pub const fn validator(&self) -> &FormValidator {
        &self.validator
    }

    /// Consume the session, returning the selection state.
    #[must_use]
    pub fn into_state(self) -> SelectionState {
        self.state
    }
}
