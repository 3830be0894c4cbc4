//! Plan catalog: main categories, their tiers, and the keys that join them.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BookingError;

/// Top-level tour category shown as a main tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MainPlan {
    Honeymoon,
    SecondHoneymoon,
}

impl MainPlan {
    /// Every main plan in tab order.
    pub const ALL: [Self; 2] = [Self::Honeymoon, Self::SecondHoneymoon];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Honeymoon => "honeymoon",
            Self::SecondHoneymoon => "second-honeymoon",
        }
    }

    /// Tiers offered under this category, in declaration order.
    #[must_use]
    pub const fn sub_plans(self) -> &'static [SubPlan] {
        match self {
            Self::Honeymoon => &[SubPlan::Standard, SubPlan::Premium, SubPlan::Luxury],
            Self::SecondHoneymoon => &[SubPlan::Comfort, SubPlan::Deluxe, SubPlan::Wellness],
        }
    }

    /// Tier that becomes active the first time this category is opened.
    #[must_use]
    pub const fn first_sub_plan(self) -> SubPlan {
        self.sub_plans()[0]
    }

    #[must_use]
    pub fn offers(self, sub: SubPlan) -> bool {
        self.sub_plans().contains(&sub)
    }

    /// Heading used by the booking modal for this category.
    #[must_use]
    pub const fn booking_title(self) -> &'static str {
        match self {
            Self::Honeymoon => "Dream Honeymoon in HAWAII",
            Self::SecondHoneymoon => "Life's Second Chapter: A Journey of Rediscovery",
        }
    }

    /// Every plan key in catalog order.
    pub fn all_keys() -> impl Iterator<Item = PlanKey> {
        Self::ALL.into_iter().flat_map(|main| {
            main.sub_plans()
                .iter()
                .map(move |sub| PlanKey { main, sub: *sub })
        })
    }
}

impl fmt::Display for MainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MainPlan {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|main| main.as_str() == s)
            .ok_or_else(|| BookingError::not_found(s))
    }
}

/// Tier within a main plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubPlan {
    Standard,
    Premium,
    Luxury,
    Comfort,
    Deluxe,
    Wellness,
}

impl SubPlan {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Luxury => "luxury",
            Self::Comfort => "comfort",
            Self::Deluxe => "deluxe",
            Self::Wellness => "wellness",
        }
    }
}

impl fmt::Display for SubPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubPlan {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            "luxury" => Ok(Self::Luxury),
            "comfort" => Ok(Self::Comfort),
            "deluxe" => Ok(Self::Deluxe),
            "wellness" => Ok(Self::Wellness),
            other => Err(BookingError::not_found(other)),
        }
    }
}

/// Identifier of one priced plan, rendered as `<main>-<sub>`.
///
/// A key can name a pairing the catalog does not offer (for example
/// honeymoon + deluxe); such keys simply have no price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanKey {
    pub main: MainPlan,
    pub sub: SubPlan,
}

impl PlanKey {
    #[must_use]
    pub const fn new(main: MainPlan, sub: SubPlan) -> Self {
        Self { main, sub }
    }

    /// Whether the catalog lists this pairing.
    #[must_use]
    pub fn is_offered(self) -> bool {
        self.main.offers(self.sub)
    }

    #[must_use]
    pub fn id(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.main, self.sub)
    }
}

impl FromStr for PlanKey {
    type Err = BookingError;

    /// Main plan ids contain hyphens, so the split point is found by matching
    /// each known main prefix rather than splitting on the first `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MainPlan::ALL
            .into_iter()
            .filter_map(|main| {
                let rest = s.strip_prefix(main.as_str())?.strip_prefix('-')?;
                let sub = rest.parse::<SubPlan>().ok()?;
                Some(Self { main, sub })
            })
            .find(|key| key.is_offered())
            .ok_or_else(|| BookingError::not_found(s))
    }
}

impl TryFrom<String> for PlanKey {
    type Error = BookingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlanKey> for String {
    fn from(key: PlanKey) -> Self {
        key.to_string()
    }
}
