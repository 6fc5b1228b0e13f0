use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / results.len() as f64) * 100.0;
    rate
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenario runs: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{status} {} (seed {})",
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        if let Some(note) = &result.note {
            writeln!(out, "   Last run: {note}")?;
        }
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    writeln!(out, "# GeoBlur Logic Test Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenario runs**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {status} {} (seed {})\n", result.scenario_name, result.seed)?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;
        if let Some(note) = &result.note {
            writeln!(out, "- **Last run**: {note}")?;
        }
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, passed: bool, millis: u64) -> ScenarioResult {
        ScenarioResult {
            scenario_name: name.to_string(),
            seed: 1337,
            passed,
            iterations_run: 2,
            successful_iterations: if passed { 2 } else { 1 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["Iteration 2 (seed 1338): boom".to_string()]
            },
            note: Some("ok".to_string()),
            average_duration: Duration::from_millis(millis),
            performance_data: vec![Duration::from_millis(millis)],
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn console_report_lists_failures_and_extremes() {
        colored::control::set_override(false);
        let results = [sample("smoke", true, 1), sample("rollover", false, 9)];
        let text = render(|out| generate_console_report(out, &results, Duration::from_secs(1)));
        assert!(text.contains("Success rate: 50.0%"));
        assert!(text.contains("❌ FAIL rollover (seed 1337)"));
        assert!(text.contains("boom"));
        assert!(text.contains("Fastest: smoke"));
        assert!(text.contains("Slowest: rollover"));
    }

    #[test]
    fn markdown_report_has_sections() {
        let text = render(|out| generate_markdown_report(out, &[sample("filters", true, 3)]));
        assert!(text.starts_with("# GeoBlur Logic Test Results"));
        assert!(text.contains("### ✅ filters (seed 1337)"));
        assert!(text.contains("- **Last run**: ok"));
    }

    #[test]
    fn json_report_is_parseable() {
        let text = render(|out| generate_json_report(out, &[sample("solver", true, 5)]));
        let parsed: Vec<ScenarioResult> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0].scenario_name, "solver");
    }

    #[test]
    fn empty_console_report_does_not_divide_by_zero() {
        let text = render(|out| generate_console_report(out, &[], Duration::ZERO));
        assert!(text.contains("Success rate: 0.0%"));
        assert!(!text.contains("Fastest"));
    }
}
