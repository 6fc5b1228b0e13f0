mod data;
mod logic;
mod storage;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use geoblur_game::{DataLoader, ReferenceCalendar, ReferenceDate, SystemClock};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use data::FileDataLoader;
use logic::{
    LogicTester, ScenarioCtx, ScenarioResult, all_scenario_keys, get_scenario, list_scenarios,
    resolve_seed_inputs,
};
use util::{parse_reference_date, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "geoblur-tester", version = "0.1.0")]
#[command(about = "Automated QA harness for the GeoBlur daily puzzle engine")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated; decimal or 0x-prefixed hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Reference date the simulations start from (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<String>,

    /// Number of consecutive days covered by schedule and solver audits
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Country catalog JSON to use instead of the bundled one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Game config JSON (timezone, epoch, poll interval, ...)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let ctx = build_context(&args)?;
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    log::info!(
        "running {} scenario(s) over {} seed(s) from {} ({} days)",
        scenarios.len(),
        seeds.len(),
        ctx.start,
        ctx.days
    );

    let results = run_logic_scenarios(&args, &ctx, &scenarios, &seeds);
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
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🌍 GeoBlur Automated Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

fn build_context(args: &Args) -> Result<ScenarioCtx> {
    let loader = FileDataLoader::new(args.catalog.clone(), args.config.clone());
    let catalog = loader
        .load_countries()
        .context("failed to load the country catalog")?;
    let config = loader.load_config().context("failed to load the game config")?;
    let start = match &args.date {
        Some(raw) => parse_reference_date(raw)?,
        None => today(&config.reference_timezone),
    };
    Ok(ScenarioCtx::new(loader, catalog, config, start, args.days))
}

fn today(zone_name: &str) -> ReferenceDate {
    ReferenceCalendar::with_zone_name(SystemClock, zone_name).current_reference_date()
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s.eq_ignore_ascii_case("all")) {
        scenarios.retain(|s| !s.eq_ignore_ascii_case("all"));
        for key in all_scenario_keys() {
            if !scenarios.contains(&key) {
                scenarios.push(key);
            }
        }
    }
    scenarios
}

fn run_logic_scenarios(
    args: &Args,
    ctx: &ScenarioCtx,
    scenarios: &[String],
    seeds: &[u64],
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(ctx, args.verbose);
    let mut results = Vec::new();
    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(tester.run_scenario(scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            logic::reports::generate_json_report(&mut output_target, results)?;
        }
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# GeoBlur Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
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

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
