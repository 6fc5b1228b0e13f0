//! Daily-mode statistics: played/won counts, streaks, win distribution.
use serde::{Deserialize, Serialize};

use crate::clock::ReferenceDate;
use crate::constants::MAX_ATTEMPTS;
use crate::day_index::DayIndex;
use crate::round::RoundState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlayerStats {
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub won: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    /// `distribution[n - 1]` counts wins on attempt `n`.
    #[serde(default)]
    pub distribution: [u32; MAX_ATTEMPTS],
    #[serde(default)]
    pub last_recorded: Option<ReferenceDate>,
}

impl PlayerStats {
    /// Fold a finished daily round into the totals.
    ///
    /// Returns `false` (and changes nothing) for unfinished rounds, ad-hoc
    /// rounds, and dates that were already recorded.
    pub fn record(&mut self, round: &RoundState, index: &DayIndex) -> bool {
        let Some(date) = round.key.date() else {
            return false;
        };
        if !round.finished {
            return false;
        }
        if let Some(last) = self.last_recorded
            && last >= date
        {
            return false;
        }

        let consecutive = self
            .last_recorded
            .is_some_and(|last| index.day_number(date) - index.day_number(last) == 1);

        self.played += 1;
        if round.won {
            self.won += 1;
            self.current_streak = if consecutive { self.current_streak + 1 } else { 1 };
            self.best_streak = self.best_streak.max(self.current_streak);
            if let Some(slot) = round
                .guesses
                .len()
                .checked_sub(1)
                .and_then(|i| self.distribution.get_mut(i))
            {
                *slot += 1;
            }
        } else {
            self.current_streak = 0;
        }
        self.last_recorded = Some(date);
        true
    }

    /// Whole-number win percentage; zero before the first game.
    #[must_use]
    pub fn win_percentage(&self) -> u32 {
        if self.played == 0 {
            return 0;
        }
        (self.won * 100 + self.played / 2) / self.played
    }

    /// Streak as it stands on `today`: a streak whose last win is older than
    /// yesterday has already lapsed.
    #[must_use]
    pub fn streak_on(&self, today: ReferenceDate, index: &DayIndex) -> u32 {
        match self.last_recorded {
            Some(last) if index.day_number(today) - index.day_number(last) <= 1 => {
                self.current_streak
            }
            _ => 0,
        }
    }
}
