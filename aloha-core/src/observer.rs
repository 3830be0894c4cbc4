//! Presenter subscription points.
//!
//! The UI layer registers callbacks here instead of the core reaching into
//! any particular rendering binding.
use crate::error::BookingError;
use crate::plan::PlanKey;
use crate::pricing::PriceBreakdown;
use crate::selection::SelectionState;
use crate::validation::FieldValidationResult;

/// Price outcome delivered to the presenter for one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub plan: PlanKey,
    pub outcome: Result<PriceBreakdown, BookingError>,
}

type SelectionCallback = Box<dyn FnMut(&SelectionState)>;
type PriceCallback = Box<dyn FnMut(&PriceUpdate)>;
type FieldCallback = Box<dyn FnMut(&FieldValidationResult)>;

/// Registered presenter callbacks, invoked in registration order.
#[derive(Default)]
pub struct Subscribers {
    selection: Vec<SelectionCallback>,
    price: Vec<PriceCallback>,
    field: Vec<FieldCallback>,
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("selection", &self.selection.len())
            .field("price", &self.price.len())
            .field("field", &self.field.len())
            .finish()
    }
}

impl Subscribers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_selection_changed(&mut self, callback: impl FnMut(&SelectionState) + 'static) {
        self.selection.push(Box::new(callback));
    }

    pub fn on_price_computed(&mut self, callback: impl FnMut(&PriceUpdate) + 'static) {
        self.price.push(Box::new(callback));
    }

    pub fn on_field_validated(
        &mut self,
        callback: impl FnMut(&FieldValidationResult) + 'static,
    ) {
        self.field.push(Box::new(callback));
    }

    pub(crate) fn selection_changed(&mut self, state: &SelectionState) {
        for callback in &mut self.selection {
            callback(state);
        }
    }

    pub(crate) fn price_computed(&mut self, update: &PriceUpdate) {
        for callback in &mut self.price {
            callback(update);
        }
    }

    pub(crate) fn field_validated(&mut self, result: &FieldValidationResult) {
        for callback in &mut self.field {
            callback(result);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selection.is_empty() && self.price.is_empty() && self.field.is_empty()
    }
}
