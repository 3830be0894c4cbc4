use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::{ScenarioCtx, TestScenario};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Runs scenarios against the core for a number of iterations, one party
/// size per iteration.
pub struct LogicTester {
    ctx: ScenarioCtx,
}

impl LogicTester {
    pub const fn new(ctx: ScenarioCtx) -> Self {
        Self { ctx }
    }

    pub async fn run_scenario(&self, scenario: &TestScenario, iterations: usize) -> ScenarioResult {
        if self.ctx.verbose {
            println!(
                "🧪 Testing scenario: {} ({} iterations)",
                scenario.name.bright_white(),
                iterations
            );
        }

        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let ctx = self.ctx.for_iteration(i);
            let start_time = Instant::now();
            match scenario.run(&ctx).await {
                Ok(()) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if ctx.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) party:{}",
                            i + 1,
                            iterations,
                            ctx.party_size()
                        );
                    }
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (party {}, today {}): {err:#}",
                        i + 1,
                        ctx.party_size(),
                        ctx.today
                    );
                    if ctx.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    log::warn!("{}: {message}", scenario.key);
                    failures.push(message);
                }
            }
        }

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration: average(&performance_data),
            performance_data,
        }
    }
}

fn average(samples: &[Duration]) -> Duration {
    if samples.is_empty() {
        Duration::ZERO
    } else {
        samples.iter().sum::<Duration>() / u32::try_from(samples.len()).unwrap_or(1)
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::scenario::get_scenario;
    use aloha_core::PriceTable;
    use chrono::NaiveDate;

    fn tester(table: PriceTable) -> LogicTester {
        LogicTester::new(ScenarioCtx::new(
            table,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            false,
        ))
    }

    #[tokio::test]
    async fn passing_scenario_counts_every_iteration() {
        let scenario = get_scenario("company-pricing").unwrap();
        let result = tester(PriceTable::standard()).run_scenario(&scenario, 5).await;
        assert!(result.passed);
        assert_eq!(result.successful_iterations, 5);
        assert_eq!(result.performance_data.len(), 5);
    }

    #[tokio::test]
    async fn failures_are_collected_per_iteration() {
        let empty = PriceTable::from_json(r#"{"plans": []}"#).unwrap();
        let scenario = get_scenario("smoke").unwrap();
        let result = tester(empty).run_scenario(&scenario, 2).await;
        assert!(!result.passed);
        assert_eq!(result.successful_iterations, 0);
        assert_eq!(result.failures.len(), 2);
        assert!(result.failures[0].starts_with("Iteration 1 (party 1"));
    }

    #[test]
    fn result_serializes_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Smoke".to_string(),
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["performance_data"][0], 12);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.average_duration, Duration::from_millis(12));
    }
}
