use anyhow::{Context, Result, ensure};

use super::{ScenarioCtx, TestScenario};
use aloha_core::{MainPlan, PriceTable, PricingMode, compute, compute_id};

pub fn scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::immediate(
            "smoke",
            "Smoke",
            "Startup selection prices and every catalog plan resolves",
            smoke_check,
        ),
        TestScenario::immediate(
            "reference-quotes",
            "Reference Quotes",
            "Built-in table reproduces the published two-person quotes",
            reference_quotes_check,
        ),
        TestScenario::immediate(
            "company-pricing",
            "Company Pricing",
            "Company final price, support, and savings agree for the iteration's party",
            company_pricing_check,
        ),
        TestScenario::immediate(
            "regular-pricing",
            "Regular Pricing",
            "Regular mode charges the regular figure with no company fields",
            regular_pricing_check,
        ),
        TestScenario::immediate(
            "linear-scaling",
            "Linear Scaling",
            "Figures scale linearly from the two-person reference party",
            linear_scaling_check,
        ),
        TestScenario::immediate(
            "missing-plan",
            "Missing Plan",
            "Unknown or unpriced plans surface NotFound instead of failing the page",
            missing_plan_check,
        ),
    ]
}

fn smoke_check(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session();
    let quote = session.start().context("startup quote")?;
    ensure!(quote.participants == 2, "startup party should be 2, got {}", quote.participants);
    ensure!(quote.mode == PricingMode::Company, "startup mode should be company");
    for key in MainPlan::all_keys() {
        ctx.table
            .lookup(&key)
            .with_context(|| format!("{key} has no price"))?;
    }
    Ok(())
}

fn reference_quotes_check(_ctx: &ScenarioCtx) -> Result<()> {
    let table = PriceTable::standard();
    let quote = compute_id(&table, "honeymoon-standard", 2, PricingMode::Company)?;
    ensure!(quote.regular == 700_000, "regular {}", quote.regular);
    ensure!(quote.company == Some(630_000), "company {:?}", quote.company);
    ensure!(quote.final_price == 480_000, "final {}", quote.final_price);
    ensure!(quote.savings == Some(220_000), "savings {:?}", quote.savings);

    let quote = compute_id(&table, "second-honeymoon-deluxe", 4, PricingMode::Company)?;
    ensure!(quote.regular == 2_400_000, "regular {}", quote.regular);
    ensure!(quote.company_support == Some(600_000), "support {:?}", quote.company_support);
    ensure!(quote.final_price == 1_560_000, "final {}", quote.final_price);
    ensure!(quote.savings == Some(840_000), "savings {:?}", quote.savings);
    Ok(())
}

fn company_pricing_check(ctx: &ScenarioCtx) -> Result<()> {
    let count = ctx.party_size();
    for key in MainPlan::all_keys() {
        let quote = compute(&ctx.table, &key, count, PricingMode::Company)?;
        let company = quote.company.context("company figure missing")?;
        let support = quote.company_support.context("support figure missing")?;
        ensure!(quote.final_price >= 0, "{key} x{count}: negative final price");
        ensure!(
            quote.final_price == (company - support).max(0),
            "{key} x{count}: final {} != company {company} - support {support}",
            quote.final_price
        );
        ensure!(
            quote.savings == Some(quote.regular - quote.final_price),
            "{key} x{count}: savings {:?} inconsistent",
            quote.savings
        );
    }
    Ok(())
}

fn regular_pricing_check(ctx: &ScenarioCtx) -> Result<()> {
    let count = ctx.party_size();
    for key in MainPlan::all_keys() {
        let quote = compute(&ctx.table, &key, count, PricingMode::Regular)?;
        ensure!(quote.final_price == quote.regular, "{key} x{count}: final != regular");
        ensure!(
            quote.company.is_none() && quote.company_support.is_none() && quote.savings.is_none(),
            "{key} x{count}: company figures present in regular mode"
        );
    }
    Ok(())
}

fn linear_scaling_check(ctx: &ScenarioCtx) -> Result<()> {
    let count = ctx.party_size();
    for key in MainPlan::all_keys() {
        let entry = ctx.table.lookup(&key)?;
        let quote = compute(&ctx.table, &key, count, PricingMode::Company)?;
        let n = i64::from(count);
        ensure!(
            (quote.regular - entry.regular_base * n / 2).abs() <= 1,
            "{key} x{count}: regular {} off the linear scale",
            quote.regular
        );
        let company = quote.company.unwrap_or_default();
        ensure!(
            (company - entry.company_base * n / 2).abs() <= 1,
            "{key} x{count}: company {company} off the linear scale"
        );
    }
    Ok(())
}

fn missing_plan_check(ctx: &ScenarioCtx) -> Result<()> {
    let err = compute_id(&ctx.table, "honeymoon-basic", 2, PricingMode::Company)
        .err()
        .context("unknown plan should not price")?;
    ensure!(err.is_not_found(), "expected NotFound, got {err}");

    let empty = PriceTable::from_json(r#"{"plans": []}"#)?;
    let mut session = aloha_core::PlanSession::new(empty, ctx.validator());
    let err = session
        .start()
        .err()
        .context("empty table should not price the startup plan")?;
    ensure!(err.is_not_found(), "expected NotFound, got {err}");
    Ok(())
}
