use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::logic::policy::GameplayStrategy;
use crate::logic::simulation::{SimulationPlan, SimulationSummary, run_plan};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    verbose: bool,
    strategy_override: Option<GameplayStrategy>,
}

impl LogicTester {
    pub const fn new(verbose: bool, strategy_override: Option<GameplayStrategy>) -> Self {
        Self {
            verbose,
            strategy_override,
        }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let plan = match self.strategy_override {
            Some(strategy) => scenario.plan.clone().with_strategy(strategy),
            None => scenario.plan.clone(),
        };
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (policy: {} seed: {})",
                    scenario.name.bright_white(),
                    plan.strategy,
                    seed
                );
            }

            results.push(self.run_single_scenario(&scenario.name, &plan, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        name: &str,
        plan: &SimulationPlan,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let (successes, failures, performance_data) =
            self.run_simulation_iterations(plan, seed, iterations);

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: name.to_string(),
            seed,
            strategy: plan.strategy,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration: avg_duration,
            performance_data,
        }
    }

    fn run_simulation_iterations(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        iterations: usize,
    ) -> (usize, Vec<String>, Vec<Duration>) {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let outcome = run_plan(plan, iteration_seed)
                .and_then(|summary| evaluate_expectations(plan, &summary).map(|()| summary));

            match outcome {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);

                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) spins:{} banked:{} continues:{} wraps:{}",
                            i + 1,
                            iterations,
                            summary.spins,
                            summary.total_banked,
                            summary.continues_bought,
                            summary.wraps
                        );
                    }
                }
                Err(err) => {
                    failures.push(format!(
                        "Iteration {} (policy {}, seed {}): {err:#}",
                        i + 1,
                        plan.strategy,
                        iteration_seed
                    ));

                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            format!("{err:#}").red()
                        );
                    }
                }
            }
        }

        (successes, failures, performance_data)
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> anyhow::Result<()> {
    if let Some(first) = summary.violations.first() {
        anyhow::bail!(
            "{} invariant violation(s), first: {first} | {}",
            summary.violations.len(),
            summarize_decision_path(summary)
        );
    }
    for expectation in &plan.expectations {
        expectation.evaluate(summary).map_err(|err| {
            err.context(format!(
                "after {} steps ({})",
                summary.steps,
                summarize_decision_path(summary)
            ))
        })?;
    }
    Ok(())
}

fn summarize_decision_path(summary: &SimulationSummary) -> String {
    if summary.decisions.is_empty() {
        return "no decisions recorded".to_string();
    }

    summary
        .decisions
        .iter()
        .rev()
        .take(3)
        .map(|entry| {
            format!(
                "step {} zone {}: {}",
                entry.step,
                entry.zone_index + 1,
                entry.action
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
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

    #[test]
    fn smoke_scenario_passes_for_fixed_seed() {
        let scenario = get_scenario("smoke").unwrap();
        let results = LogicTester::new(false, None).run_scenario(&scenario, &[1337], 2);
        assert_eq!(results.len(), 1);
        assert!(results[0].passed, "{:?}", results[0].failures);
        assert_eq!(results[0].successful_iterations, 2);
    }

    #[test]
    fn failing_expectation_is_reported() {
        let scenario = TestScenario::simulation(
            "Always Fails",
            SimulationPlan::new(GameplayStrategy::Greedy)
                .with_max_steps(1)
                .with_expectation(|_: &SimulationSummary| anyhow::bail!("nope")),
        );
        let results = LogicTester::new(false, None).run_scenario(&scenario, &[5], 1);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("nope"));
    }

    #[test]
    fn strategy_override_replaces_plan_policy() {
        let scenario = get_scenario("smoke").unwrap();
        let results = LogicTester::new(false, Some(GameplayStrategy::Cautious))
            .run_scenario(&scenario, &[3], 1);
        assert_eq!(results[0].strategy, GameplayStrategy::Cautious);
    }

    #[test]
    fn result_serializes_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Smoke".to_string(),
            seed: 1,
            strategy: GameplayStrategy::Greedy,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["strategy"], "greedy");
    }
}
