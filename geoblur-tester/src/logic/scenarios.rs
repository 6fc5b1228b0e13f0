//! Named logic scenarios. Each run receives the shared context plus an
//! iteration seed and either returns a one-line summary or fails.
use anyhow::{Context, Result, ensure};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use geoblur_game::{
    Clock, Country, CountryCatalog, DayIndex, FixedClock, GameConfig, GameEngine, GameFilter,
    GameMode, GameStorage, GuessFeedback, MemoryStorage, ReferenceDate, RoundState, RoundStatus,
    SubmitOutcome, daily_puzzle, decode_round, filtered_pool, format_share_text_with_url,
    random_puzzle,
};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use crate::data::FileDataLoader;
use crate::storage::FileStorage;
use crate::util::scratch_dir;

/// Upper bound on simulated days for the session-driving scenarios.
const MAX_SESSION_DAYS: u32 = 14;
const FILTER_DRAWS: usize = 16;

pub struct ScenarioCtx {
    pub loader: FileDataLoader,
    pub catalog: Arc<CountryCatalog>,
    pub config: GameConfig,
    pub start: ReferenceDate,
    pub days: u32,
}

impl ScenarioCtx {
    pub fn new(
        loader: FileDataLoader,
        catalog: CountryCatalog,
        config: GameConfig,
        start: ReferenceDate,
        days: u32,
    ) -> Self {
        Self {
            loader,
            catalog: Arc::new(catalog),
            config,
            start,
            days: days.max(1),
        }
    }

    fn zone(&self) -> Tz {
        self.config.zone()
    }

    fn index(&self) -> DayIndex {
        self.config.day_index()
    }

    /// Start date moved forward by `seed` days (mod one leap year), so
    /// different seeds exercise different stretches of the calendar.
    fn origin(&self, seed: u64) -> Result<ReferenceDate> {
        shift(&self.index(), self.start, i64::try_from(seed % 366).unwrap_or(0))
    }
}

pub type ScenarioFn = fn(&ScenarioCtx, u64) -> Result<String>;

pub struct TestScenario {
    pub key: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

const SCENARIOS: &[TestScenario] = &[
    TestScenario {
        key: "smoke",
        description: "Open a session, solve today's puzzle, render the share text",
        run: smoke,
    },
    TestScenario {
        key: "daily-schedule",
        description: "Day numbers, date inversion and daily picks over the --days horizon",
        run: daily_schedule,
    },
    TestScenario {
        key: "rollover",
        description: "Cross reference-zone midnights with the poller and stale submissions",
        run: rollover,
    },
    TestScenario {
        key: "filters",
        description: "Random picks honour every filter combination or fall back cleanly",
        run: filters,
    },
    TestScenario {
        key: "solver",
        description: "Feedback-driven solver clears every daily puzzle within six guesses",
        run: solver,
    },
    TestScenario {
        key: "persistence",
        description: "File-backed saves rehydrate and corrupted blobs start fresh",
        run: persistence,
    },
];

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.key, s.description)).collect()
}

pub fn all_scenario_keys() -> Vec<String> {
    SCENARIOS.iter().map(|s| s.key.to_string()).collect()
}

pub fn get_scenario(name: &str) -> Option<&'static TestScenario> {
    let wanted = name.trim().to_lowercase();
    SCENARIOS.iter().find(|s| s.key == wanted)
}

fn shift(index: &DayIndex, date: ReferenceDate, days: i64) -> Result<ReferenceDate> {
    index
        .date_for_day(index.day_number(date) + days)
        .with_context(|| format!("{date} + {days} days is out of range"))
}

fn local_instant(zone: Tz, date: ReferenceDate, h: u32, m: u32, s: u32) -> Result<DateTime<Utc>> {
    let naive = date
        .date()
        .and_hms_opt(h, m, s)
        .with_context(|| format!("invalid local time {h}:{m}:{s}"))?;
    let local = zone
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("{naive} does not exist in {zone}"))?;
    Ok(local.with_timezone(&Utc))
}

fn wrong_guess<'a>(
    catalog: &'a CountryCatalog,
    target: &Country,
    rng: &mut ChaCha20Rng,
) -> Result<&'a Country> {
    let others: Vec<&Country> = catalog.iter().filter(|c| c.code != target.code).collect();
    others.choose(rng).copied().context("catalog has a single country")
}

fn smoke(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let engine = GameEngine::new(ctx.loader.clone(), MemoryStorage::new());
    let clock = FixedClock::new(local_instant(ctx.zone(), ctx.start, 12, 0, 0)?);
    let mut session = engine.create_session_with(&clock, ChaCha20Rng::seed_from_u64(seed))?;

    let day = session.active().day_number.context("daily round has no day number")?;
    ensure!(day == ctx.index().day_number(ctx.start), "day number mismatch");
    let target = session.active().target.name.clone();
    let outcome = session.submit_guess(&target);
    ensure!(outcome == SubmitOutcome::Applied(RoundStatus::Won), "correct guess gave {outcome:?}");

    let text = session.share_text().context("finished round has no share text")?;
    ensure!(
        text.lines().next() == Some(format!("GeoBlur #{day}").as_str()),
        "bad title in {text:?}"
    );
    ensure!(text.contains("1/6"), "bad outcome line in {text:?}");
    ensure!(session.stats().played == 1, "win was not recorded");
    Ok(format!("day {day} solved ({target})"))
}

fn daily_schedule(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let index = ctx.index();
    let origin = ctx.origin(seed)?;
    let first = index.day_number(origin);
    let sovereign = ctx.catalog.sovereign().count();
    let mut seen = HashSet::new();
    let mut previous: Option<String> = None;

    for offset in 0..i64::from(ctx.days) {
        let date = shift(&index, origin, offset)?;
        let day = index.day_number(date);
        ensure!(day == first + offset, "{date}: expected day {}, got {day}", first + offset);
        ensure!(index.date_for_day(day) == Some(date), "{date}: date_for_day({day}) disagrees");

        let puzzle = daily_puzzle(&ctx.catalog, day);
        ensure!(puzzle.is_sovereign(), "day {day} picked territory {}", puzzle.code);
        ensure!(daily_puzzle(&ctx.catalog, day).code == puzzle.code, "day {day} pick is unstable");
        if sovereign > 1 {
            ensure!(
                previous.as_deref() != Some(puzzle.code.as_str()),
                "day {day} repeats the previous puzzle"
            );
        }
        seen.insert(puzzle.code.clone());
        previous = Some(puzzle.code.clone());
    }

    let expected = sovereign.min(usize::try_from(ctx.days).unwrap_or(usize::MAX));
    ensure!(seen.len() == expected, "expected {expected} distinct puzzles, saw {}", seen.len());
    Ok(format!("{} days from {origin}, {} distinct puzzles", ctx.days, seen.len()))
}

fn rollover(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let zone = ctx.zone();
    let index = ctx.index();
    let step = TimeDelta::from_std(ctx.config.rollover_poll_interval())?;
    let mut date = ctx.origin(seed)?;
    let clock = Rc::new(FixedClock::new(local_instant(zone, date, 23, 59, 30)?));
    let engine = GameEngine::new(ctx.loader.clone(), MemoryStorage::new());
    let mut session =
        engine.create_session_with(Rc::clone(&clock), ChaCha20Rng::seed_from_u64(seed))?;
    let mut rng = ChaCha20Rng::seed_from_u64(seed ^ 0x9E37_79B9);
    let days = ctx.days.min(MAX_SESSION_DAYS);

    for _ in 0..days {
        let before = index.day_number(date);
        let midnight = local_instant(zone, shift(&index, date, 1)?, 0, 0, 0)?;
        clock.set(local_instant(zone, date, 23, 59, 30)?);
        ensure!(!session.tick(), "{date}: rolled over before midnight");

        let captured = session.active().round.key;
        let guess = wrong_guess(&ctx.catalog, session.active().target, &mut rng)?.name.clone();
        let applied = session.submit_guess_for(captured, &guess);
        ensure!(
            matches!(applied, SubmitOutcome::Applied(_)),
            "{date}: guess not applied: {applied:?}"
        );

        let captured = session.active().round.key;
        let mut rolled = false;
        for _ in 0..(60 / step.num_seconds().max(1) + 3) {
            clock.advance(step);
            if session.tick() {
                rolled = true;
                break;
            }
        }
        ensure!(rolled, "{date}: no rollover within a minute of midnight");
        let lag = clock.now_utc() - midnight;
        ensure!(lag >= TimeDelta::zero() && lag <= step, "{date}: rollover lagged by {lag}");

        ensure!(
            session.submit_guess_for(captured, &guess) == SubmitOutcome::Stale,
            "{date}: stale guess was applied"
        );
        let active = session.active();
        ensure!(active.day_number == Some(before + 1), "{date}: day did not advance by one");
        ensure!(active.round.guesses.is_empty(), "{date}: new round inherited guesses");

        let blob = engine
            .storage()
            .get(&ctx.config.daily_storage_key())
            .context("daily round not persisted")?;
        ensure!(decode_round(&blob)?.key == active.round.key, "{date}: persisted key lags");

        ensure!(!session.poll_rollover(), "{date}: second poll rolled again");
        date = shift(&index, date, 1)?;
    }
    Ok(format!("{days} midnights crossed in {zone}"))
}

fn filters(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let exclude = daily_puzzle(&ctx.catalog, ctx.index().day_number(ctx.start)).code.clone();
    let mut empty = 0usize;

    for filter in GameFilter::all_combinations() {
        let pool = filtered_pool(&ctx.catalog, &filter, Some(exclude.as_str()));
        if pool.is_err() {
            empty += 1;
        }
        for _ in 0..FILTER_DRAWS {
            let picked = random_puzzle(&ctx.catalog, &filter, Some(exclude.as_str()), &mut rng);
            ensure!(
                ctx.catalog.get_by_code(&picked.code).is_some(),
                "{filter}: picked unknown {}",
                picked.code
            );
            if pool.is_ok() {
                ensure!(
                    filter.accepts(picked),
                    "{filter}: picked {} outside the filter",
                    picked.code
                );
                ensure!(picked.code != exclude, "{filter}: picked the excluded daily country");
            }
        }
    }
    Ok(format!(
        "{} combinations, {empty} empty (fell back to full catalog)",
        GameFilter::all_combinations().len()
    ))
}

/// Guess, then keep only candidates that would have produced the same hint.
fn solve(catalog: &CountryCatalog, target: &Country, rng: &mut ChaCha20Rng) -> RoundState {
    let mut candidates: Vec<&Country> = catalog.sovereign().collect();
    let mut round = RoundState::ad_hoc();
    while !round.finished {
        let Some(guess) = candidates.choose(rng).copied() else {
            break;
        };
        round = round.submit_guess(&guess.name, &target.name);
        let hint = GuessFeedback::evaluate(&guess.name, target, catalog);
        candidates.retain(|c| GuessFeedback::evaluate(&guess.name, c, catalog) == hint);
    }
    round
}

fn solver(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let index = ctx.index();
    let origin = ctx.origin(seed)?;
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut total_guesses = 0usize;

    for offset in 0..i64::from(ctx.days) {
        let day = index.day_number(origin) + offset;
        let target = daily_puzzle(&ctx.catalog, day);
        let round = solve(&ctx.catalog, target, &mut rng);
        ensure!(round.won, "day {day}: solver lost on {} after {:?}", target.name, round.guesses);
        total_guesses += round.guesses.len();

        let text = format_share_text_with_url(
            &round.guesses,
            &target.name,
            round.won,
            GameMode::Daily,
            day,
            &ctx.config.share_url,
        );
        ensure!(
            text.lines().count() == round.guesses.len() + 3,
            "day {day}: share text has the wrong shape"
        );
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = total_guesses as f64 / f64::from(ctx.days);
    Ok(format!("solved {} days, mean {mean:.2} guesses", ctx.days))
}

fn persistence(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let dir = scratch_dir("persistence", seed);
    let result = persistence_in(ctx, seed, FileStorage::new(&dir));
    if let Err(err) = std::fs::remove_dir_all(&dir) {
        log::debug!("could not remove {}: {err}", dir.display());
    }
    result
}

fn persistence_in(ctx: &ScenarioCtx, seed: u64, storage: FileStorage) -> Result<String> {
    let key = ctx.config.daily_storage_key();
    let engine = GameEngine::new(ctx.loader.clone(), storage);
    let clock = FixedClock::new(local_instant(ctx.zone(), ctx.origin(seed)?, 9, 0, 0)?);
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    let guesses = {
        let mut session = engine.create_session_with(&clock, ChaCha20Rng::seed_from_u64(seed))?;
        for _ in 0..2 {
            let guess = wrong_guess(&ctx.catalog, session.active().target, &mut rng)?.name.clone();
            session.submit_guess(&guess);
        }
        session.active().round.guesses.clone()
    };
    ensure!(engine.storage().path_for(&key).exists(), "no file written for {key}");

    let session = engine.create_session_with(&clock, ChaCha20Rng::seed_from_u64(seed))?;
    ensure!(session.active().round.guesses == guesses, "rehydrated guesses differ");
    drop(session);

    engine.storage().save(&key, "{\"key\": 17")?;
    let mut session = engine.create_session_with(&clock, ChaCha20Rng::seed_from_u64(seed))?;
    ensure!(session.active().round.guesses.is_empty(), "corrupted blob was not discarded");
    let target = session.active().target.name.clone();
    session.submit_guess(&target);
    ensure!(session.current_streak() == 1, "win did not start a streak");
    drop(session);

    clock.advance(TimeDelta::days(2));
    let session = engine.create_session_with(&clock, ChaCha20Rng::seed_from_u64(seed))?;
    ensure!(session.stats().played == 1, "stats were not persisted");
    ensure!(session.current_streak() == 0, "streak survived a missed day");
    Ok(format!("{} guesses rehydrated from {}", guesses.len(), engine.storage().root().display()))
}
