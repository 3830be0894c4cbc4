//! Price table and the scaled breakdown shown on each plan panel.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::REFERENCE_GROUP_SIZE;
use crate::error::{BookingError, PriceTableError};
use crate::numbers::scale_amount;
use crate::plan::PlanKey;

/// Which figure the visitor is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingMode {
    /// Unsubsidized list price.
    Regular,
    /// Employer-discounted price with the company subsidy applied.
    #[default]
    Company,
}

impl PricingMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingMode {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" | "individual" => Ok(Self::Regular),
            "company" | "corporate" => Ok(Self::Company),
            other => Err(BookingError::invalid(
                "pricing mode",
                format!("unknown mode `{other}`"),
            )),
        }
    }
}

/// Base figures in yen for a party of [`REFERENCE_GROUP_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub regular_base: i64,
    pub company_base: i64,
    pub company_support: i64,
}

impl PriceEntry {
    #[must_use]
    pub const fn new(regular_base: i64, company_base: i64, company_support: i64) -> Self {
        Self {
            regular_base,
            company_base,
            company_support,
        }
    }

    fn check(&self, id: &str) -> Result<(), PriceTableError> {
        for (field, value) in [
            ("regular price", self.regular_base),
            ("company price", self.company_base),
            ("company support", self.company_support),
        ] {
            if value < 0 {
                return Err(PriceTableError::NegativeAmount {
                    id: id.to_string(),
                    field,
                    value,
                });
            }
        }
        if self.company_base > self.regular_base {
            return Err(PriceTableError::CompanyAboveRegular {
                id: id.to_string(),
                company_base: self.company_base,
                regular_base: self.regular_base,
            });
        }
        Ok(())
    }
}

/// One row of a price table configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPrice {
    pub id: String,
    #[serde(flatten)]
    pub entry: PriceEntry,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PriceTableFile {
    #[serde(default)]
    plans: Vec<PlanPrice>,
}

/// Read-only lookup from plan id to its base figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTable {
    entries: BTreeMap<String, PriceEntry>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PriceTable {
    /// The tour prices published on the site.
    #[must_use]
    pub fn standard() -> Self {
        let rows = [
            ("honeymoon-standard", PriceEntry::new(700_000, 630_000, 150_000)),
            ("honeymoon-premium", PriceEntry::new(1_000_000, 900_000, 200_000)),
            ("honeymoon-luxury", PriceEntry::new(1_400_000, 1_260_000, 250_000)),
            ("second-honeymoon-comfort", PriceEntry::new(900_000, 810_000, 200_000)),
            ("second-honeymoon-deluxe", PriceEntry::new(1_200_000, 1_080_000, 300_000)),
            ("second-honeymoon-wellness", PriceEntry::new(1_100_000, 990_000, 250_000)),
        ];
        Self {
            entries: rows
                .into_iter()
                .map(|(id, entry)| (id.to_string(), entry))
                .collect(),
        }
    }

    /// Build a table from explicit rows, enforcing the entry invariants.
    ///
    /// # Errors
    ///
    /// Returns an error when an id repeats, an amount is negative, or a
    /// company price exceeds its regular price.
    pub fn from_rows(rows: Vec<PlanPrice>) -> Result<Self, PriceTableError> {
        let mut entries = BTreeMap::new();
        for PlanPrice { id, entry } in rows {
            entry.check(&id)?;
            if entries.contains_key(&id) {
                return Err(PriceTableError::DuplicatePlan { id });
            }
            entries.insert(id, entry);
        }
        Ok(Self { entries })
    }

    /// Load a table from its JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or a row breaks an
    /// entry invariant.
    pub fn from_json(json: &str) -> Result<Self, PriceTableError> {
        let file: PriceTableFile = serde_json::from_str(json)?;
        Self::from_rows(file.plans)
    }

    /// Serialize the table back into its configuration format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let file = PriceTableFile {
            plans: self
                .entries
                .iter()
                .map(|(id, entry)| PlanPrice {
                    id: id.clone(),
                    entry: *entry,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&file)
    }

    /// Base figures for a plan.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when the table has no row for `key`.
    pub fn lookup(&self, key: &PlanKey) -> Result<PriceEntry, BookingError> {
        self.lookup_id(&key.id())
    }

    /// Base figures by raw plan id.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when the table has no row for `id`.
    pub fn lookup_id(&self, id: &str) -> Result<PriceEntry, BookingError> {
        self.entries
            .get(id)
            .copied()
            .ok_or_else(|| BookingError::not_found(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Figures derived for one plan, party size, and mode. Never stored.
///
/// Company-only figures are `None` in [`PricingMode::Regular`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub mode: PricingMode,
    pub participants: i32,
    pub regular: i64,
    pub company: Option<i64>,
    pub company_support: Option<i64>,
    #[serde(rename = "final")]
    pub final_price: i64,
    pub savings: Option<i64>,
}

/// Compute the breakdown for `participants` people on `key`.
///
/// Each figure is scaled from the reference party and rounded on its own;
/// the final price is derived from the rounded figures.
///
/// # Errors
///
/// Returns [`BookingError::InvalidArgument`] for a non-positive participant
/// count and [`BookingError::NotFound`] for a plan without a price.
pub fn compute(
    table: &PriceTable,
    key: &PlanKey,
    participants: i32,
    mode: PricingMode,
) -> Result<PriceBreakdown, BookingError> {
    compute_id(table, &key.id(), participants, mode)
}

/// [`compute`] keyed by a raw plan id.
///
/// # Errors
///
/// Same as [`compute`].
pub fn compute_id(
    table: &PriceTable,
    id: &str,
    participants: i32,
    mode: PricingMode,
) -> Result<PriceBreakdown, BookingError> {
    if participants <= 0 {
        return Err(BookingError::invalid(
            "participants",
            format!("must be positive (got {participants})"),
        ));
    }
    let entry = table.lookup_id(id)?;
    let scale = |amount| scale_amount(amount, participants, REFERENCE_GROUP_SIZE);
    let regular = scale(entry.regular_base);

    let breakdown = match mode {
        PricingMode::Regular => PriceBreakdown {
            mode,
            participants,
            regular,
            company: None,
            company_support: None,
            final_price: regular,
            savings: None,
        },
        PricingMode::Company => {
            let company = scale(entry.company_base);
            let support = scale(entry.company_support);
            let final_price = (company - support).max(0);
            PriceBreakdown {
                mode,
                participants,
                regular,
                company: Some(company),
                company_support: Some(support),
                final_price,
                savings: Some(regular - final_price),
            }
        }
    };
    Ok(breakdown)
}
