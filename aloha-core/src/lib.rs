//! Aloha Tour Core
//!
//! Platform-agnostic pricing, plan selection, and booking validation for the
//! Hawaii honeymoon tour pages. The crate holds no UI code: presenters register
//! callbacks on a [`PlanSession`] and render whatever it publishes.

pub mod booking;
pub mod constants;
pub mod error;
pub mod money;
pub mod numbers;
pub mod observer;
pub mod plan;
pub mod pricing;
pub mod selection;
pub mod session;
pub mod submission;
pub mod validation;

// Re-export commonly used types
pub use booking::BookingInquiry;
pub use error::{BookingError, PriceTableError};
pub use money::format_yen;
pub use observer::{PriceUpdate, Subscribers};
pub use plan::{MainPlan, PlanKey, SubPlan};
pub use pricing::{
    PlanPrice, PriceBreakdown, PriceEntry, PriceTable, PricingMode, compute, compute_id,
};
pub use selection::{PlanSettings, SelectionState, Transition};
pub use session::PlanSession;
#[cfg(feature = "async")]
pub use submission::submit_deferred;
pub use submission::{SubmissionReceipt, SubmissionStatus, SubmissionTask};
pub use validation::{
    BookingForm, FieldError, FieldKind, FieldValidationResult, FormReport, FormValidator,
};

/// Trait for abstracting where price configuration comes from.
/// Hosts provide this (bundled table, fetched JSON, fixture).
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the price table for the current page.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or fails validation.
    fn load_price_table(&self) -> Result<PriceTable, Self::Error>;
}

/// Loader for the built-in catalog prices.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPrices;

impl ConfigLoader for StandardPrices {
    type Error = std::convert::Infallible;

    fn load_price_table(&self) -> Result<PriceTable, Self::Error> {
        Ok(PriceTable::standard())
    }
}

/// Loader over a JSON document already in memory.
#[derive(Debug, Clone)]
pub struct JsonPrices {
    json: String,
}

impl JsonPrices {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl ConfigLoader for JsonPrices {
    type Error = PriceTableError;

    fn load_price_table(&self) -> Result<PriceTable, Self::Error> {
        PriceTable::from_json(&self.json)
    }
}

/// Entry point that turns loaded configuration into page sessions
pub struct BookingEngine<L>
where
    L: ConfigLoader,
{
    loader: L,
}

impl<L> BookingEngine<L>
where
    L: ConfigLoader,
{
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load the configured price table.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader fails.
    pub fn price_table(&self) -> Result<PriceTable, L::Error> {
        self.loader.load_price_table()
    }

    /// Construct a session at the startup selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the price table cannot be loaded.
    pub fn create_session(&self, validator: FormValidator) -> Result<PlanSession, L::Error> {
        let table = self.loader.load_price_table()?;
        log::debug!("price table loaded with {} plans", table.len());
        Ok(PlanSession::new(table, validator))
    }

    /// Resume a session from a serialized selection state, pricing it with
    /// freshly loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be parsed, breaks a selection
    /// invariant (a tier its plan does not offer, a non-positive party size),
    /// or the table cannot be loaded.
    pub fn resume_session(
        &self,
        state_json: &str,
        validator: FormValidator,
    ) -> Result<PlanSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let state: SelectionState = serde_json::from_str(state_json)?;
        let table = self.loader.load_price_table().map_err(Into::into)?;
        Ok(PlanSession::from_state(table, validator, state))
    }
}
