use anyhow::{Context, Result, ensure};
use std::cell::RefCell;
use std::rc::Rc;

use super::{ScenarioCtx, TestScenario};
use aloha_core::{MainPlan, PlanKey, PricingMode, SubPlan};

pub fn scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::immediate(
            "tab-navigation",
            "Tab Navigation",
            "Main and sub tab switches keep exactly one active tier per plan",
            tab_navigation_check,
        ),
        TestScenario::immediate(
            "participant-guard",
            "Participant Guard",
            "Non-positive party sizes are rejected without touching the state",
            participant_guard_check,
        ),
        TestScenario::immediate(
            "legacy-select",
            "Legacy Plan Select",
            "Bare main plan ids open that plan at its first tier",
            legacy_select_check,
        ),
        TestScenario::immediate(
            "presenter-updates",
            "Presenter Updates",
            "Each applied transition publishes one selection and one price update",
            presenter_updates_check,
        ),
    ]
}

fn tab_navigation_check(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session();
    session.start()?;

    let ignored = session.select_sub_plan(MainPlan::SecondHoneymoon, SubPlan::Wellness)?;
    ensure!(ignored.is_none(), "sub tab of a hidden plan should be ignored");

    session.select_sub_plan(MainPlan::Honeymoon, SubPlan::Luxury)?;
    let state = session.state().clone();
    session.select_sub_plan(MainPlan::Honeymoon, SubPlan::Luxury)?;
    ensure!(session.state() == &state, "repeated sub selection changed the state");

    session.select_main_plan(MainPlan::SecondHoneymoon)?;
    ensure!(
        session.state().active_plan() == PlanKey::new(MainPlan::SecondHoneymoon, SubPlan::Comfort),
        "second honeymoon should open on its first tier"
    );
    session.select_main_plan(MainPlan::Honeymoon)?;
    ensure!(
        session.state().is_sub_active(MainPlan::Honeymoon, SubPlan::Luxury),
        "returning to honeymoon lost the luxury tier"
    );

    for main in MainPlan::ALL {
        let active = main
            .sub_plans()
            .iter()
            .filter(|sub| session.state().is_sub_active(main, **sub))
            .count();
        ensure!(active == 1, "{main} has {active} active tiers");
    }

    let unoffered = session.select_sub_plan(MainPlan::Honeymoon, SubPlan::Wellness);
    ensure!(
        unoffered.is_err_and(|e| e.is_not_found()),
        "unoffered tier should be NotFound"
    );
    Ok(())
}

fn participant_guard_check(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session();
    let key = session.state().active_plan();
    session.set_participant_count(key, ctx.party_size())?;
    let before = session.state().clone();

    for bad in [0, -1, -ctx.party_size()] {
        ensure!(
            session.set_participant_count(key, bad).is_err(),
            "party size {bad} was accepted"
        );
        ensure!(session.state() == &before, "rejected party size {bad} changed state");
    }

    let quote = session.current_quote()?;
    ensure!(
        quote.participants == ctx.party_size(),
        "quote used {} people, expected {}",
        quote.participants,
        ctx.party_size()
    );
    Ok(())
}

fn legacy_select_check(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session();
    for main in MainPlan::ALL {
        session
            .select_plan(main.as_str())
            .context("legacy id was ignored")??;
        ensure!(
            session.state().active_plan() == PlanKey::new(main, main.first_sub_plan()),
            "{main} did not open on its first tier"
        );
    }
    ensure!(
        session.select_plan("cruise").is_none(),
        "unknown legacy id should be ignored"
    );
    Ok(())
}

fn presenter_updates_check(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session();
    let selections = Rc::new(RefCell::new(0_usize));
    let prices = Rc::new(RefCell::new(Vec::new()));
    {
        let selections = Rc::clone(&selections);
        let prices = Rc::clone(&prices);
        let subs = session.subscribers_mut();
        subs.on_selection_changed(move |_| *selections.borrow_mut() += 1);
        subs.on_price_computed(move |u| prices.borrow_mut().push(u.plan));
    }

    session.start()?;
    session.select_main_plan(MainPlan::SecondHoneymoon)?;
    let key = session.state().active_plan();
    session.select_pricing_mode(key, PricingMode::Regular)?;
    session.set_participant_count(key, ctx.party_size())?;
    session.select_sub_plan(MainPlan::Honeymoon, SubPlan::Premium)?;

    ensure!(*selections.borrow() == 4, "expected 4 selection updates, got {}", selections.borrow());
    ensure!(
        prices.borrow().iter().filter(|p| **p == key).count() == 3,
        "expected 3 price updates for {key}"
    );
    Ok(())
}
