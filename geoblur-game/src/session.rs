//! Game session: the daily and ad-hoc slots, the active-mode selector,
//! rollover polling and persistence hooks.
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use std::sync::Arc;

use crate::clock::{Clock, ReferenceCalendar, ReferenceDate};
use crate::config::GameConfig;
use crate::countries::{Country, CountryCatalog};
use crate::day_index::DayIndex;
use crate::error::GameError;
use crate::filter::GameFilter;
use crate::round::{GuessFeedback, RoundKey, RoundState, RoundStatus};
use crate::selector::{daily_puzzle, random_puzzle};
use crate::share::{GameMode, format_share_text_with_url};
use crate::stats::PlayerStats;
use crate::storage::{GameStorage, load_value, save_value};

/// Puzzle plus the round being played against it.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleSlot {
    pub round: RoundState,
    pub target_code: String,
    /// Day number for daily slots, `None` for ad-hoc ones.
    pub day_number: Option<i64>,
}

/// Borrowed view of whichever slot the mode selector points at.
#[derive(Debug, Clone, Copy)]
pub struct ActiveRound<'a> {
    pub mode: GameMode,
    pub round: &'a RoundState,
    pub target: &'a Country,
    pub day_number: Option<i64>,
}

/// What happened to a submitted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Applied(RoundStatus),
    /// Round already finished, or the guess was blank.
    Ignored,
    /// The round the guess was aimed at is no longer active.
    Stale,
}

/// Decides when the periodic rollover check is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverPoller {
    interval: TimeDelta,
    last_poll: Option<DateTime<Utc>>,
}

impl RolloverPoller {
    #[must_use]
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            interval: TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX),
            last_poll: None,
        }
    }

    #[must_use]
    pub fn due(&self, now: DateTime<Utc>) -> bool {
        self.last_poll.is_none_or(|last| now - last >= self.interval)
    }

    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last_poll = Some(now);
    }
}

pub struct GameSession<S, C, R> {
    catalog: Arc<CountryCatalog>,
    config: GameConfig,
    calendar: ReferenceCalendar<C>,
    day_index: DayIndex,
    storage: S,
    rng: R,
    mode: GameMode,
    filter: GameFilter,
    daily: PuzzleSlot,
    ad_hoc: Option<PuzzleSlot>,
    stats: PlayerStats,
    poller: RolloverPoller,
}

impl<S, C, R> GameSession<S, C, R>
where
    S: GameStorage,
    C: Clock,
    R: Rng,
{
    /// Build a session, rehydrating today's daily round when storage holds one.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(
        catalog: Arc<CountryCatalog>,
        config: GameConfig,
        storage: S,
        clock: C,
        rng: R,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let calendar = ReferenceCalendar::new(clock, config.zone());
        let day_index = config.day_index();
        let today = calendar.current_reference_date();

        let saved_round: Option<RoundState> =
            load_value(&storage, &config.daily_storage_key(), "round state");
        let stats: PlayerStats =
            load_value(&storage, &config.stats_storage_key(), "player stats").unwrap_or_default();
        let poller = RolloverPoller::new(config.rollover_poll_interval());

        let daily = Self::daily_slot(&catalog, &day_index, today, saved_round);
        let session = Self {
            catalog,
            config,
            calendar,
            day_index,
            storage,
            rng,
            mode: GameMode::Daily,
            filter: GameFilter::default(),
            daily,
            ad_hoc: None,
            stats,
            poller,
        };
        session.persist_daily();
        Ok(session)
    }

    fn daily_slot(
        catalog: &CountryCatalog,
        day_index: &DayIndex,
        today: ReferenceDate,
        saved: Option<RoundState>,
    ) -> PuzzleSlot {
        let day_number = day_index.day_number(today);
        let target = daily_puzzle(catalog, day_number);
        let round = match saved {
            Some(round) if round.key != RoundKey::Daily(today) => {
                log::debug!("stored round {} is stale; starting {today}", round.key);
                RoundState::daily(today)
            }
            Some(round) if round.is_consistent() && round.replays_against(&target.name) => {
                log::debug!("rehydrated daily round {today} with {} guesses", round.guesses.len());
                round
            }
            Some(round) => {
                log::warn!("stored round {} does not match its guesses; starting fresh", round.key);
                RoundState::daily(today)
            }
            None => RoundState::daily(today),
        };
        PuzzleSlot {
            round,
            target_code: target.code.clone(),
            day_number: Some(day_number),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &CountryCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub const fn filter(&self) -> GameFilter {
        self.filter
    }

    #[must_use]
    pub const fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    /// Streak as the player sees it today; zero once a day has been missed.
    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.stats.streak_on(self.today(), &self.day_index)
    }

    #[must_use]
    pub const fn daily(&self) -> &PuzzleSlot {
        &self.daily
    }

    #[must_use]
    pub const fn ad_hoc(&self) -> Option<&PuzzleSlot> {
        self.ad_hoc.as_ref()
    }

    #[must_use]
    pub fn today(&self) -> ReferenceDate {
        self.calendar.current_reference_date()
    }

    /// The single accessor every mode-dependent read goes through.
    #[must_use]
    pub fn active(&self) -> ActiveRound<'_> {
        let (mode, slot) = self.active_slot();
        ActiveRound {
            mode,
            round: &slot.round,
            target: self.country(&slot.target_code),
            day_number: slot.day_number,
        }
    }

    fn active_slot(&self) -> (GameMode, &PuzzleSlot) {
        match (self.mode, self.ad_hoc.as_ref()) {
            (GameMode::AdHoc, Some(slot)) => (GameMode::AdHoc, slot),
            _ => (GameMode::Daily, &self.daily),
        }
    }

    fn country(&self, code: &str) -> &Country {
        self.catalog
            .get_by_code(code)
            .unwrap_or_else(|| &self.catalog.countries()[0])
    }

    /// Switch modes. Entering ad-hoc mode without a round starts one.
    pub fn set_mode(&mut self, mode: GameMode) {
        if mode.is_ad_hoc() && self.ad_hoc.is_none() {
            self.start_ad_hoc_round();
        }
        self.mode = mode;
    }

    /// Remember the ad-hoc filter; it applies from the next ad-hoc round.
    pub fn set_filter(&mut self, filter: GameFilter) {
        self.filter = filter;
    }

    /// Fresh ad-hoc round using the current filter, never repeating today's
    /// daily country when an alternative exists. Switches to ad-hoc mode.
    pub fn start_ad_hoc_round(&mut self) -> &Country {
        let code = random_puzzle(
            &self.catalog,
            &self.filter,
            Some(self.daily.target_code.as_str()),
            &mut self.rng,
        )
        .code
        .clone();
        log::debug!("starting ad-hoc round ({}) -> {code}", self.filter);
        self.ad_hoc = Some(PuzzleSlot {
            round: RoundState::ad_hoc(),
            target_code: code,
            day_number: None,
        });
        self.mode = GameMode::AdHoc;
        let (_, slot) = self.active_slot();
        self.country(&slot.target_code)
    }

    /// Apply a guess to whichever round is active right now.
    pub fn submit_guess(&mut self, guess: &str) -> SubmitOutcome {
        let key = self.active().round.key;
        self.submit_guess_for(key, guess)
    }

    /// Apply a guess only if `expected` is still the active round. A UI
    /// captures the key when the player starts typing so a rollover in
    /// between rejects the guess instead of scoring it against a new puzzle.
    pub fn submit_guess_for(&mut self, expected: RoundKey, guess: &str) -> SubmitOutcome {
        let (mode, slot) = self.active_slot();
        if slot.round.key != expected {
            log::debug!("rejecting guess for {expected}; active round is {}", slot.round.key);
            return SubmitOutcome::Stale;
        }
        let target_name = self.country(&slot.target_code).name.clone();
        let next = slot.round.submit_guess(guess, &target_name);
        if next == slot.round {
            return SubmitOutcome::Ignored;
        }
        let status = next.status();

        match mode {
            GameMode::Daily => {
                self.daily.round = next;
                self.persist_daily();
                if status.is_terminal() {
                    log::info!(
                        "daily round {} finished: {status:?} in {} guesses",
                        self.daily.round.key,
                        self.daily.round.guesses.len()
                    );
                    if self.stats.record(&self.daily.round, &self.day_index) {
                        save_value(&self.storage, &self.config.stats_storage_key(), &self.stats);
                    }
                }
            }
            GameMode::AdHoc => {
                if let Some(slot) = self.ad_hoc.as_mut() {
                    slot.round = next;
                }
                if status.is_terminal() {
                    log::info!("ad-hoc round finished: {status:?}");
                }
            }
        }
        SubmitOutcome::Applied(status)
    }

    /// Replace the daily slot if the reference date has moved on. Returns
    /// `true` when a rollover happened. Safe to call at any frequency.
    pub fn poll_rollover(&mut self) -> bool {
        let now = self.calendar.now_utc();
        self.poller.mark(now);
        let today = self.calendar.reference_date_at(now);
        let day_number = self.day_index.day_number(today);
        if self.daily.day_number == Some(day_number) {
            return false;
        }
        log::info!(
            "daily rollover: {} -> {today} (day {day_number})",
            self.daily.round.key
        );
        self.daily = Self::daily_slot(&self.catalog, &self.day_index, today, None);
        self.persist_daily();
        true
    }

    /// Periodic timer hook; only polls once the interval has elapsed.
    pub fn tick(&mut self) -> bool {
        if self.poller.due(self.calendar.now_utc()) {
            self.poll_rollover()
        } else {
            false
        }
    }

    /// Foreground/visibility-restore hook; always polls.
    pub fn on_visibility_restored(&mut self) -> bool {
        self.poll_rollover()
    }

    /// Hints for every guess in the active round.
    #[must_use]
    pub fn feedback(&self) -> Vec<GuessFeedback> {
        let active = self.active();
        active.round.feedback(active.target, &self.catalog)
    }

    /// Share text for the active round once it is over.
    #[must_use]
    pub fn share_text(&self) -> Option<String> {
        let active = self.active();
        if !active.round.finished {
            return None;
        }
        Some(format_share_text_with_url(
            &active.round.guesses,
            &active.target.name,
            active.round.won,
            active.mode,
            active.day_number.unwrap_or_default(),
            &self.config.share_url,
        ))
    }

    /// Autocomplete helper for the guess input.
    #[must_use]
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<&str> {
        self.catalog.suggest(prefix, limit)
    }

    fn persist_daily(&self) {
        save_value(&self.storage, &self.config.daily_storage_key(), &self.daily.round);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::countries::{Continent, CountryKind, Difficulty, bundled_catalog};
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::rc::Rc;

    type TestSession = GameSession<MemoryStorage, Rc<FixedClock>, ChaCha20Rng>;

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        // 17:00 UTC is midday in New York all year round.
        Utc.with_ymd_and_hms(y, m, d, 17, 0, 0).unwrap()
    }

    fn session_at(now: DateTime<Utc>, storage: MemoryStorage) -> (TestSession, Rc<FixedClock>) {
        let clock = Rc::new(FixedClock::new(now));
        let session = GameSession::new(
            Arc::new(bundled_catalog().unwrap().clone()),
            GameConfig::default(),
            storage,
            Rc::clone(&clock),
            ChaCha20Rng::seed_from_u64(5),
        )
        .unwrap();
        (session, clock)
    }

    fn wrong_guess(session: &TestSession) -> String {
        let target = session.active().target.code.clone();
        session
            .catalog()
            .iter()
            .find(|c| c.code != target)
            .unwrap()
            .name
            .clone()
    }

    #[test]
    fn starts_in_daily_mode_with_todays_puzzle() {
        let (session, _) = session_at(noon(2024, 2, 12), MemoryStorage::new());
        let active = session.active();
        assert_eq!(active.mode, GameMode::Daily);
        assert_eq!(active.day_number, Some(42));
        let expected = ReferenceDate::from_ymd(2024, 2, 12).unwrap();
        assert_eq!(active.round.key, RoundKey::Daily(expected));
        assert_eq!(active.target.code, daily_puzzle(session.catalog(), 42).code);
        assert!(active.target.is_sovereign());
    }

    #[test]
    fn daily_progress_is_persisted_and_rehydrated() {
        let storage = MemoryStorage::new();
        let (mut session, _) = session_at(noon(2024, 2, 12), storage.clone());
        let guess = wrong_guess(&session);
        assert_eq!(session.submit_guess(&guess), SubmitOutcome::Applied(RoundStatus::InProgress));

        let (reloaded, _) = session_at(noon(2024, 2, 12), storage);
        assert_eq!(reloaded.active().round.guesses, [guess]);
    }

    #[test]
    fn current_streak_lapses_after_a_missed_day() {
        let (mut session, clock) = session_at(noon(2024, 2, 12), MemoryStorage::new());
        assert_eq!(session.current_streak(), 0);
        let target = session.active().target.name.clone();
        session.submit_guess(&target);
        assert_eq!(session.current_streak(), 1);

        clock.set(noon(2024, 2, 13));
        assert_eq!(session.current_streak(), 1);
        clock.set(noon(2024, 2, 14));
        assert_eq!(session.current_streak(), 0);
        assert_eq!(session.stats().current_streak, 1);
    }

    #[test]
    fn stale_saved_round_is_replaced() {
        let storage = MemoryStorage::new();
        let (mut session, _) = session_at(noon(2024, 2, 12), storage.clone());
        let guess = wrong_guess(&session);
        session.submit_guess(&guess);

        let (next_day, _) = session_at(noon(2024, 2, 13), storage);
        assert!(next_day.active().round.guesses.is_empty());
        assert_eq!(next_day.active().day_number, Some(43));
    }

    #[test]
    fn corrupted_storage_starts_fresh() {
        let storage = MemoryStorage::new();
        storage.insert("geoblur.daily", "{\"key\": 12");
        storage.insert("geoblur.stats", "oops");
        let (session, _) = session_at(noon(2024, 2, 12), storage.clone());
        assert!(session.active().round.guesses.is_empty());
        assert_eq!(session.stats(), &PlayerStats::default());
        // Fresh state overwrites the corrupted blob.
        assert!(storage.get("geoblur.daily").unwrap().contains("2024-02-12"));
    }

    #[test]
    fn winning_records_stats_and_share_text() {
        let (mut session, _) = session_at(noon(2024, 2, 12), MemoryStorage::new());
        assert!(session.share_text().is_none());
        let wrong = wrong_guess(&session);
        let target = session.active().target.name.clone();
        session.submit_guess(&wrong);
        assert_eq!(
            session.submit_guess(&target.to_uppercase()),
            SubmitOutcome::Applied(RoundStatus::Won)
        );
        assert_eq!(session.submit_guess(&wrong), SubmitOutcome::Ignored);

        assert_eq!(session.stats().won, 1);
        assert_eq!(session.stats().distribution[1], 1);
        let text = session.share_text().unwrap();
        assert!(text.starts_with("GeoBlur #42"));
        assert!(text.contains("2/6"));
    }

    #[test]
    fn rollover_replaces_daily_round_at_reference_midnight() {
        let (mut session, clock) = session_at(noon(2024, 2, 12), MemoryStorage::new());
        let guess = wrong_guess(&session);
        session.submit_guess(&guess);
        let old_key = session.active().round.key;

        // 04:59 UTC on the 13th is still the 12th in New York.
        clock.set(Utc.with_ymd_and_hms(2024, 2, 13, 4, 59, 0).unwrap());
        assert!(!session.poll_rollover());
        clock.advance(TimeDelta::minutes(1));
        assert!(session.poll_rollover());
        assert!(!session.poll_rollover());

        let active = session.active();
        assert_ne!(active.round.key, old_key);
        assert!(active.round.guesses.is_empty());
        assert_eq!(active.day_number, Some(43));
    }

    #[test]
    fn guess_aimed_at_previous_day_is_rejected() {
        let (mut session, clock) = session_at(noon(2024, 2, 12), MemoryStorage::new());
        let captured = session.active().round.key;
        clock.advance(TimeDelta::days(1));
        assert!(session.on_visibility_restored());
        let guess = wrong_guess(&session);
        assert_eq!(session.submit_guess_for(captured, &guess), SubmitOutcome::Stale);
        assert!(session.active().round.guesses.is_empty());
    }

    #[test]
    fn tick_respects_poll_interval() {
        let (mut session, clock) = session_at(noon(2024, 2, 12), MemoryStorage::new());
        assert!(!session.tick());
        // Cross midnight but stay inside the polling window.
        clock.set(Utc.with_ymd_and_hms(2024, 2, 13, 5, 0, 0).unwrap());
        session.poller.mark(clock.now_utc());
        clock.advance(TimeDelta::seconds(10));
        assert!(!session.tick());
        clock.advance(TimeDelta::seconds(5));
        assert!(session.tick());
    }

    #[test]
    fn ad_hoc_round_is_independent_and_not_persisted() {
        let storage = MemoryStorage::new();
        let (mut session, _) = session_at(noon(2024, 2, 12), storage.clone());
        let daily_code = session.daily().target_code.clone();
        let daily_blob = storage.get("geoblur.daily");

        session.set_mode(GameMode::AdHoc);
        let active = session.active();
        assert_eq!(active.mode, GameMode::AdHoc);
        assert_eq!(active.round.key, RoundKey::AdHoc);
        assert_ne!(active.target.code, daily_code);

        let guess = wrong_guess(&session);
        session.submit_guess(&guess);
        assert_eq!(storage.get("geoblur.daily"), daily_blob);
        assert!(session.daily().round.guesses.is_empty());

        session.set_mode(GameMode::Daily);
        assert_eq!(session.active().mode, GameMode::Daily);
        // Switching back keeps the in-flight ad-hoc round.
        assert_eq!(session.ad_hoc().unwrap().round.guesses.len(), 1);
    }

    #[test]
    fn ad_hoc_rounds_follow_the_filter_and_skip_stats() {
        let (mut session, _) = session_at(noon(2024, 2, 12), MemoryStorage::new());
        session.set_filter(
            GameFilter::default()
                .with_continent(Continent::Europe)
                .with_kind(CountryKind::Sovereign),
        );
        for _ in 0..10 {
            let target = session.start_ad_hoc_round().clone();
            assert_eq!(target.continent, Continent::Europe);
            session.submit_guess(&target.name);
            assert_eq!(session.active().round.status(), RoundStatus::Won);
            assert!(session.share_text().unwrap().starts_with("GeoBlur ∞"));
        }
        assert_eq!(session.stats().played, 0);
    }

    #[test]
    fn impossible_filter_still_yields_a_round() {
        let (mut session, _) = session_at(noon(2024, 2, 12), MemoryStorage::new());
        session.set_filter(
            GameFilter::default()
                .with_continent(Continent::Oceania)
                .with_difficulty(Difficulty::Easy)
                .with_kind(CountryKind::Territory),
        );
        let target = session.start_ad_hoc_round().code.clone();
        assert!(session.catalog().get_by_code(&target).is_some());
    }

    #[test]
    fn rollover_leaves_ad_hoc_round_alone() {
        let (mut session, clock) = session_at(noon(2024, 2, 12), MemoryStorage::new());
        session.set_mode(GameMode::AdHoc);
        let guess = wrong_guess(&session);
        session.submit_guess(&guess);
        let before = session.ad_hoc().cloned();
        clock.advance(TimeDelta::days(1));
        assert!(session.poll_rollover());
        assert_eq!(session.ad_hoc().cloned(), before);
        assert_eq!(session.mode(), GameMode::AdHoc);
    }

    #[test]
    fn poller_due_after_interval() {
        let start = noon(2024, 1, 1);
        let mut poller = RolloverPoller::new(std::time::Duration::from_secs(15));
        assert!(poller.due(start));
        poller.mark(start);
        assert!(!poller.due(start + TimeDelta::seconds(14)));
        assert!(poller.due(start + TimeDelta::seconds(15)));
    }
}
