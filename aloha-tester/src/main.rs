mod common;
mod logic;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use aloha_core::{
    BookingEngine, JsonPrices, PlanKey, PriceTable, PricingMode, StandardPrices, compute,
    format_yen,
};
use common::scenario::{ScenarioCtx, all_scenarios, get_scenario, list_scenarios};
use common::{OutputTarget, split_csv};
use logic::{LogicTester, ScenarioResult};

#[derive(Debug, Parser)]
#[command(name = "aloha-tester", version = "0.1.0")]
#[command(about = "Automated QA for the Aloha tour pricing, selection, and booking core")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Number of iterations per scenario; each iteration uses the next party size
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print a price breakdown for this plan (e.g. `honeymoon-standard`) and exit
    #[arg(long)]
    quote: Option<PlanKey>,

    /// Party size used with --quote
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    participants: i32,

    /// Pricing mode used with --quote (company or regular)
    #[arg(long, default_value_t = PricingMode::Company)]
    mode: PricingMode,

    /// JSON price table to load instead of the built-in one
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Date treated as today by the form checks (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let table = load_price_table(args.prices.as_deref())?;

    if maybe_print_quote(&args, &table)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let ctx = ScenarioCtx::new(table, today, args.verbose);

    let results = run_logic_scenarios(&args, &scenarios, ctx).await;

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn load_price_table(path: Option<&Path>) -> Result<PriceTable> {
    let Some(path) = path else {
        return Ok(BookingEngine::new(StandardPrices).price_table()?);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    BookingEngine::new(JsonPrices::new(json))
        .price_table()
        .with_context(|| format!("invalid price table in {}", path.display()))
}

fn maybe_print_quote(args: &Args, table: &PriceTable) -> Result<bool> {
    let Some(key) = args.quote else {
        return Ok(false);
    };
    let quote = compute(table, &key, args.participants, args.mode)
        .with_context(|| format!("cannot quote {key} for {} participants", args.participants))?;

    let mut out = OutputTarget::new(args.output.clone())?;
    writeln!(
        out,
        "Quote for {key} ({} participants, {} pricing)",
        quote.participants, quote.mode
    )?;
    writeln!(out, "  Regular price:   {}", format_yen(quote.regular))?;
    if let Some(company) = quote.company {
        writeln!(out, "  Company price:   {}", format_yen(company))?;
    }
    if let Some(support) = quote.company_support {
        writeln!(out, "  Company support: {}", format_yen(-support))?;
    }
    writeln!(out, "  Final price:     {}", format_yen(quote.final_price))?;
    if let Some(savings) = quote.savings {
        writeln!(out, "  Savings:         {}", format_yen(savings))?;
    }
    out.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🌺 Aloha Automated Tester".bright_cyan().bold());
    println!("{}", "=========================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for scenario in all_scenarios() {
            if !scenarios.iter().any(|s| s == scenario.key) {
                scenarios.push(scenario.key.to_string());
            }
        }
    }
    scenarios
}

async fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    ctx: ScenarioCtx,
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(ctx);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.push(logic_tester.run_scenario(&scenario, args.iterations).await);
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Aloha Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            iterations: 1,
            report: "json".to_string(),
            verbose: false,
            output: None,
            quote: None,
            participants: 2,
            mode: PricingMode::Company,
            prices: None,
            today: None,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "aloha-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Smoke".to_string(),
            passed,
            iterations_run: 1,
            successful_iterations: usize::from(passed),
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            average_duration: std::time::Duration::from_millis(1),
            performance_data: vec![std::time::Duration::from_millis(1)],
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("smoke,all");
        assert_eq!(expanded[0], "smoke");
        assert_eq!(expanded.len(), all_scenarios().len());
        assert!(expanded.contains(&"deferred-submission".to_string()));
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("form-gate,smoke");
        assert_eq!(expanded, vec!["form-gate".to_string(), "smoke".to_string()]);
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = temp_path("list");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("tab-navigation"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn quote_prints_company_breakdown() {
        let temp = temp_path("quote");
        let args = Args {
            quote: Some("second-honeymoon-deluxe".parse().unwrap()),
            participants: 4,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_print_quote(&args, &PriceTable::standard()).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Regular price:   ¥2,400,000"));
        assert!(content.contains("Company support: -¥600,000"));
        assert!(content.contains("Final price:     ¥1,560,000"));
        assert!(content.contains("Savings:         ¥840,000"));
    }

    #[test]
    fn quote_rejects_empty_party() {
        let args = Args {
            quote: Some("honeymoon-standard".parse().unwrap()),
            participants: 0,
            ..base_args()
        };
        assert!(maybe_print_quote(&args, &PriceTable::standard()).is_err());
    }

    #[test]
    fn load_price_table_reads_json_file() {
        let temp = temp_path("prices");
        std::fs::write(
            &temp,
            r#"{"plans": [{"id": "honeymoon-standard", "regular_base": 800000, "company_base": 700000, "company_support": 100000}]}"#,
        )
        .unwrap();
        let table = load_price_table(Some(temp.as_path())).unwrap();
        assert_eq!(table.len(), 1);
        assert!(load_price_table(Some(temp_path("missing").as_path())).is_err());
        assert_eq!(load_price_table(None).unwrap(), PriceTable::standard());
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let temp = temp_path("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("scenario_name"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = temp_path("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_console_includes_failures() {
        let temp = temp_path("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("failure"));
        assert!(content.contains("Total time"));
    }

    #[tokio::test]
    async fn run_logic_scenarios_skips_unknown_names() {
        let ctx = ScenarioCtx::new(
            PriceTable::standard(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            false,
        );
        let names = vec!["smoke".to_string(), "does-not-exist".to_string()];
        let results = run_logic_scenarios(&base_args(), &names, ctx).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
    }
}
