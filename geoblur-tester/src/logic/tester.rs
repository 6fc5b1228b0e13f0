use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::scenarios::{ScenarioCtx, TestScenario};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    /// Summary line from the last successful iteration.
    pub note: Option<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester<'a> {
    ctx: &'a ScenarioCtx,
    verbose: bool,
}

impl<'a> LogicTester<'a> {
    pub const fn new(ctx: &'a ScenarioCtx, verbose: bool) -> Self {
        Self { ctx, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed: {seed})",
                        scenario.key.bright_white()
                    );
                }
                self.run_single_scenario(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let iterations = iterations.max(1);
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut note = None;

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            match (scenario.run)(self.ctx, iteration_seed) {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{iterations} passed ({duration:?}) {summary}",
                            i + 1
                        );
                    }
                    note = Some(summary);
                }
                Err(err) => {
                    let message = format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1);
                    log::debug!("{} failed: {message}", scenario.key);
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{iterations} failed: {}",
                            i + 1,
                            format!("{err:#}").red()
                        );
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.key.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            note,
            average_duration,
            performance_data,
        }
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
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
