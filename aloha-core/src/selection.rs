//! Tab and panel selection state for the plan pages.
//!
//! The state only records what is active. Transitions report which plan, if
//! any, needs its price recomputed; the session performs the recompute.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::DEFAULT_PARTICIPANTS;
use crate::error::BookingError;
use crate::plan::{MainPlan, PlanKey, SubPlan};
use crate::pricing::PricingMode;

/// Per-plan inputs remembered across tab switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSettings {
    pub mode: PricingMode,
    pub participants: i32,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            mode: PricingMode::Company,
            participants: DEFAULT_PARTICIPANTS,
        }
    }
}

/// Result of a selection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state changed (or was re-confirmed); `recompute` is the plan whose
    /// price must be refreshed.
    Applied { recompute: PlanKey },
    /// The event did not apply to the current state and was dropped.
    Ignored,
}

impl Transition {
    #[must_use]
    pub const fn recompute(self) -> Option<PlanKey> {
        match self {
            Self::Applied { recompute } => Some(recompute),
            Self::Ignored => None,
        }
    }
}

/// Which main tab, sub tab, and per-plan pricing inputs are active.
///
/// Exactly one main plan is active. Every main plan has exactly one active
/// sub-plan: the last one chosen, or its first declared tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SavedSelection")]
pub struct SelectionState {
    active_main: MainPlan,
    chosen_sub: BTreeMap<MainPlan, SubPlan>,
    #[serde(default)]
    settings: BTreeMap<PlanKey, PlanSettings>,
}

/// Unchecked wire form of [`SelectionState`].
#[derive(Deserialize)]
struct SavedSelection {
    active_main: MainPlan,
    chosen_sub: BTreeMap<MainPlan, SubPlan>,
    #[serde(default)]
    settings: BTreeMap<PlanKey, PlanSettings>,
}

impl TryFrom<SavedSelection> for SelectionState {
    type Error = BookingError;

    fn try_from(saved: SavedSelection) -> Result<Self, Self::Error> {
        let state = Self {
            active_main: saved.active_main,
            chosen_sub: saved.chosen_sub,
            settings: saved.settings,
        };
        state.validate()?;
        Ok(state)
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    /// Startup state: honeymoon / standard, company pricing for two.
    #[must_use]
    pub fn new() -> Self {
        let mut chosen_sub = BTreeMap::new();
        chosen_sub.insert(MainPlan::Honeymoon, SubPlan::Standard);
        Self {
            active_main: MainPlan::Honeymoon,
            chosen_sub,
            settings: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn active_main_plan(&self) -> MainPlan {
        self.active_main
    }

    /// Active tier of `main`, whether or not `main` is the active tab.
    #[must_use]
    pub fn active_sub_plan(&self, main: MainPlan) -> SubPlan {
        self.chosen_sub
            .get(&main)
            .copied()
            .unwrap_or_else(|| main.first_sub_plan())
    }

    /// Plan whose detail panel is visible.
    #[must_use]
    pub fn active_plan(&self) -> PlanKey {
        PlanKey::new(self.active_main, self.active_sub_plan(self.active_main))
    }

    #[must_use]
    pub fn is_main_active(&self, main: MainPlan) -> bool {
        self.active_main == main
    }

    #[must_use]
    pub fn is_sub_active(&self, main: MainPlan, sub: SubPlan) -> bool {
        self.active_sub_plan(main) == sub
    }

    /// Remembered inputs for `key`, defaulting to company pricing for two.
    #[must_use]
    pub fn settings(&self, key: &PlanKey) -> PlanSettings {
        self.settings.get(key).copied().unwrap_or_default()
    }

    /// Check the invariants a restored state must satisfy: every chosen tier
    /// is offered by its plan, and every remembered plan is in the catalog
    /// with a positive party size.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] for a tier or plan outside the
    /// catalog and [`BookingError::InvalidArgument`] for a non-positive
    /// party size.
    pub fn validate(&self) -> Result<(), BookingError> {
        for (main, sub) in &self.chosen_sub {
            offered(PlanKey::new(*main, *sub))?;
        }
        for (key, settings) in &self.settings {
            offered(*key)?;
            if settings.participants <= 0 {
                return Err(BookingError::invalid(
                    "participants",
                    format!("{key} has party size {}", settings.participants),
                ));
            }
        }
        Ok(())
    }

    pub fn select_main_plan(&mut self, main: MainPlan) -> Transition {
        self.active_main = main;
        let sub = *self
            .chosen_sub
            .entry(main)
            .or_insert_with(|| main.first_sub_plan());
        log::debug!("main plan {main} active with {sub}");
        Transition::Applied {
            recompute: PlanKey::new(main, sub),
        }
    }

    /// Activate `sub` under `main`. Ignored while `main` is not the active
    /// tab, matching the hidden sub-tab strip.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when `main` does not offer `sub`.
    pub fn select_sub_plan(
        &mut self,
        main: MainPlan,
        sub: SubPlan,
    ) -> Result<Transition, BookingError> {
        let key = offered(PlanKey::new(main, sub))?;
        if main != self.active_main {
            log::warn!("ignoring {key}: {main} is not the active main plan");
            return Ok(Transition::Ignored);
        }
        self.chosen_sub.insert(main, sub);
        log::debug!("sub plan {key} active");
        Ok(Transition::Applied { recompute: key })
    }

    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when `key` is not in the catalog.
    pub fn select_pricing_mode(
        &mut self,
        key: PlanKey,
        mode: PricingMode,
    ) -> Result<Transition, BookingError> {
        let key = offered(key)?;
        self.settings.entry(key).or_default().mode = mode;
        log::debug!("{key} priced in {mode} mode");
        Ok(Transition::Applied { recompute: key })
    }

    /// Change the party size for `key`. An invalid count leaves the state
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] when `count` is not positive
    /// and [`BookingError::NotFound`] when `key` is not in the catalog.
    pub fn set_participant_count(
        &mut self,
        key: PlanKey,
        count: i32,
    ) -> Result<Transition, BookingError> {
        let key = offered(key)?;
        if count <= 0 {
            log::warn!("rejecting participant count {count} for {key}");
            return Err(BookingError::invalid(
                "participants",
                format!("must be positive (got {count})"),
            ));
        }
        self.settings.entry(key).or_default().participants = count;
        log::debug!("{key} party size set to {count}");
        Ok(Transition::Applied { recompute: key })
    }
}

fn offered(key: PlanKey) -> Result<PlanKey, BookingError> {
    if key.is_offered() {
        Ok(key)
    } else {
        Err(BookingError::not_found(key.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_mains(state: &SelectionState) -> usize {
        MainPlan::ALL
            .into_iter()
            .filter(|m| state.is_main_active(*m))
            .count()
    }

    fn active_subs(state: &SelectionState, main: MainPlan) -> usize {
        main.sub_plans()
            .iter()
            .filter(|s| state.is_sub_active(main, **s))
            .count()
    }

    #[test]
    fn startup_defaults() {
        let state = SelectionState::new();
        assert_eq!(state.active_main_plan(), MainPlan::Honeymoon);
        assert_eq!(state.active_sub_plan(MainPlan::Honeymoon), SubPlan::Standard);
        let settings = state.settings(&state.active_plan());
        assert_eq!(settings.mode, PricingMode::Company);
        assert_eq!(settings.participants, 2);
    }

    #[test]
    fn main_plan_selection_keeps_one_of_each_active() {
        let mut state = SelectionState::new();
        for main in [MainPlan::SecondHoneymoon, MainPlan::Honeymoon, MainPlan::SecondHoneymoon] {
            let t = state.select_main_plan(main);
            assert_eq!(active_mains(&state), 1);
            for m in MainPlan::ALL {
                assert_eq!(active_subs(&state, m), 1);
            }
            assert_eq!(t.recompute(), Some(state.active_plan()));
        }
    }

    #[test]
    fn first_visit_picks_first_tier_and_revisit_remembers() {
        let mut state = SelectionState::new();
        state.select_main_plan(MainPlan::SecondHoneymoon);
        assert_eq!(state.active_plan().sub, SubPlan::Comfort);

        state
            .select_sub_plan(MainPlan::SecondHoneymoon, SubPlan::Wellness)
            .unwrap();
        state.select_main_plan(MainPlan::Honeymoon);
        state.select_main_plan(MainPlan::SecondHoneymoon);
        assert_eq!(state.active_plan().sub, SubPlan::Wellness);
    }

    #[test]
    fn sub_plan_for_inactive_main_is_ignored() {
        let mut state = SelectionState::new();
        let before = state.clone();
        let t = state
            .select_sub_plan(MainPlan::SecondHoneymoon, SubPlan::Deluxe)
            .unwrap();
        assert_eq!(t, Transition::Ignored);
        assert_eq!(state, before);
    }

    #[test]
    fn sub_plan_outside_catalog_is_not_found() {
        let mut state = SelectionState::new();
        let err = state
            .select_sub_plan(MainPlan::Honeymoon, SubPlan::Deluxe)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn repeated_sub_selection_is_idempotent() {
        let mut state = SelectionState::new();
        let first = state
            .select_sub_plan(MainPlan::Honeymoon, SubPlan::Premium)
            .unwrap();
        let snapshot = state.clone();
        let second = state
            .select_sub_plan(MainPlan::Honeymoon, SubPlan::Premium)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn invalid_participant_count_leaves_state_unchanged() {
        let mut state = SelectionState::new();
        let key = state.active_plan();
        state.set_participant_count(key, 4).unwrap();
        let before = state.clone();
        assert!(matches!(
            state.set_participant_count(key, 0),
            Err(BookingError::InvalidArgument { .. })
        ));
        assert!(state.set_participant_count(key, -3).is_err());
        assert_eq!(state, before);
        assert_eq!(state.settings(&key).participants, 4);
    }

    #[test]
    fn settings_are_remembered_per_plan() {
        let mut state = SelectionState::new();
        let standard = PlanKey::new(MainPlan::Honeymoon, SubPlan::Standard);
        let luxury = PlanKey::new(MainPlan::Honeymoon, SubPlan::Luxury);
        state.select_pricing_mode(standard, PricingMode::Regular).unwrap();
        state.set_participant_count(luxury, 6).unwrap();

        assert_eq!(state.settings(&standard).mode, PricingMode::Regular);
        assert_eq!(state.settings(&standard).participants, 2);
        assert_eq!(state.settings(&luxury).mode, PricingMode::Company);
        assert_eq!(state.settings(&luxury).participants, 6);
    }

    #[test]
    fn state_serializes_with_plan_ids() {
        let mut state = SelectionState::new();
        state
            .set_participant_count(PlanKey::new(MainPlan::Honeymoon, SubPlan::Luxury), 3)
            .unwrap();
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"honeymoon-luxury\""));
        let back: SelectionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn restored_state_must_keep_catalog_invariants() {
        let unoffered_tier = r#"{"active_main":"honeymoon","chosen_sub":{"honeymoon":"deluxe"}}"#;
        assert!(serde_json::from_str::<SelectionState>(unoffered_tier).is_err());

        let bad_party = r#"{"active_main":"honeymoon","chosen_sub":{"honeymoon":"standard"},
            "settings":{"honeymoon-standard":{"mode":"company","participants":-5}}}"#;
        assert!(serde_json::from_str::<SelectionState>(bad_party).is_err());

        let zero_party = r#"{"active_main":"honeymoon","chosen_sub":{},
            "settings":{"second-honeymoon-deluxe":{"mode":"regular","participants":0}}}"#;
        assert!(serde_json::from_str::<SelectionState>(zero_party).is_err());

        let unoffered_key = r#"{"active_main":"honeymoon","chosen_sub":{},
            "settings":{"honeymoon-wellness":{"mode":"company","participants":2}}}"#;
        assert!(serde_json::from_str::<SelectionState>(unoffered_key).is_err());

        let good = r#"{"active_main":"second-honeymoon","chosen_sub":{"second-honeymoon":"deluxe"},
            "settings":{"second-honeymoon-deluxe":{"mode":"company","participants":4}}}"#;
        let state: SelectionState = serde_json::from_str(good).unwrap();
        assert!(state.validate().is_ok());
        assert_eq!(state.active_plan().to_string(), "second-honeymoon-deluxe");
    }
}
