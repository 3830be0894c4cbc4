use anyhow::Result;
use chrono::NaiveDate;
use std::future::Future;
use std::pin::Pin;

use aloha_core::{FormValidator, PlanSession, PriceTable};

pub mod forms;
pub mod pricing;
pub mod selection;
pub mod submission;

/// Inputs shared by every check of one iteration.
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub table: PriceTable,
    pub today: NaiveDate,
    pub iteration: usize,
    pub verbose: bool,
}

impl ScenarioCtx {
    #[must_use]
    pub fn new(table: PriceTable, today: NaiveDate, verbose: bool) -> Self {
        Self {
            table,
            today,
            iteration: 0,
            verbose,
        }
    }

    #[must_use]
    pub fn for_iteration(&self, iteration: usize) -> Self {
        Self {
            iteration,
            ..self.clone()
        }
    }

    /// Party size exercised by this iteration, cycling through 1..=20.
    #[must_use]
    pub fn party_size(&self) -> i32 {
        i32::try_from(self.iteration % 20).unwrap_or(0) + 1
    }

    #[must_use]
    pub fn validator(&self) -> FormValidator {
        FormValidator::with_today(self.today)
    }

    #[must_use]
    pub fn session(&self) -> PlanSession {
        PlanSession::new(self.table.clone(), self.validator())
    }
}

pub type DeferredCheck = Pin<Box<dyn Future<Output = Result<()>>>>;

#[derive(Clone, Copy)]
pub enum Check {
    Immediate(fn(&ScenarioCtx) -> Result<()>),
    Deferred(fn(ScenarioCtx) -> DeferredCheck),
}

#[derive(Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub check: Check,
}

impl TestScenario {
    pub const fn immediate(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        check: fn(&ScenarioCtx) -> Result<()>,
    ) -> Self {
        Self {
            key,
            name,
            description,
            check: Check::Immediate(check),
        }
    }

    pub const fn deferred(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        check: fn(ScenarioCtx) -> DeferredCheck,
    ) -> Self {
        Self {
            key,
            name,
            description,
            check: Check::Deferred(check),
        }
    }

    pub async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        match self.check {
            Check::Immediate(check) => check(ctx),
            Check::Deferred(check) => check(ctx.clone()).await,
        }
    }
}

pub fn all_scenarios() -> Vec<TestScenario> {
    let mut scenarios = pricing::scenarios();
    scenarios.extend(selection::scenarios());
    scenarios.extend(forms::scenarios());
    scenarios.extend(submission::scenarios());
    scenarios
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    all_scenarios()
        .into_iter()
        .map(|s| (s.key, s.description))
        .collect()
}

pub fn get_scenario(key: &str) -> Option<TestScenario> {
    all_scenarios().into_iter().find(|s| s.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn ctx() -> ScenarioCtx {
        ScenarioCtx::new(
            PriceTable::standard(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            false,
        )
    }

    #[test]
    fn scenario_keys_are_unique() {
        let keys: BTreeSet<_> = all_scenarios().iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), all_scenarios().len());
        assert!(get_scenario("smoke").is_some());
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn party_size_cycles() {
        let base = ctx();
        assert_eq!(base.party_size(), 1);
        assert_eq!(base.for_iteration(19).party_size(), 20);
        assert_eq!(base.for_iteration(20).party_size(), 1);
    }

    #[tokio::test]
    async fn every_scenario_passes_against_standard_prices() {
        let base = ctx();
        for scenario in all_scenarios() {
            for iteration in 0..3 {
                let result = scenario.run(&base.for_iteration(iteration)).await;
                assert!(result.is_ok(), "{}: {:?}", scenario.key, result.err());
            }
        }
    }
}
