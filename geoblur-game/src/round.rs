//! Round state machine: guesses, attempt budget, win/loss.
//!
//! Transitions are pure: `submit_guess` returns a new `RoundState` and never
//! mutates its input, so callers replace state in a single assignment.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::clock::ReferenceDate;
use crate::constants::{AD_HOC_ROUND_KEY, MAX_ATTEMPTS};
use crate::countries::{Country, CountryCatalog, names_match};
use crate::geo::{CompassArrow, bearing_arrow, distance_km};

/// Which puzzle a round belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundKey {
    Daily(ReferenceDate),
    AdHoc,
}

impl RoundKey {
    #[must_use]
    pub const fn is_daily(self) -> bool {
        matches!(self, Self::Daily(_))
    }

    #[must_use]
    pub const fn date(self) -> Option<ReferenceDate> {
        match self {
            Self::Daily(date) => Some(date),
            Self::AdHoc => None,
        }
    }
}

impl fmt::Display for RoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily(date) => date.fmt(f),
            Self::AdHoc => f.write_str(AD_HOC_ROUND_KEY),
        }
    }
}

impl std::str::FromStr for RoundKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == AD_HOC_ROUND_KEY {
            return Ok(Self::AdHoc);
        }
        s.parse().map(Self::Daily)
    }
}

impl Serialize for RoundKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoundKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    InProgress,
    Won,
    Lost,
}

impl RoundStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// One round of guessing. The serialized form is the persisted blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub key: RoundKey,
    #[serde(default)]
    pub guesses: Vec<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub won: bool,
}

impl RoundState {
    #[must_use]
    pub const fn new(key: RoundKey) -> Self {
        Self {
            key,
            guesses: Vec::new(),
            finished: false,
            won: false,
        }
    }

    #[must_use]
    pub const fn daily(date: ReferenceDate) -> Self {
        Self::new(RoundKey::Daily(date))
    }

    #[must_use]
    pub const fn ad_hoc() -> Self {
        Self::new(RoundKey::AdHoc)
    }

    #[must_use]
    pub const fn status(&self) -> RoundStatus {
        match (self.finished, self.won) {
            (false, _) => RoundStatus::InProgress,
            (true, true) => RoundStatus::Won,
            (true, false) => RoundStatus::Lost,
        }
    }

    #[must_use]
    pub fn attempts_used(&self) -> usize {
        self.guesses.len()
    }

    #[must_use]
    pub fn attempts_remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            MAX_ATTEMPTS.saturating_sub(self.guesses.len())
        }
    }

    /// Blur step for the silhouette: one step per wrong guess, fully revealed
    /// once the round is over.
    #[must_use]
    pub fn reveal_stage(&self) -> usize {
        if self.finished {
            MAX_ATTEMPTS
        } else {
            self.guesses.len().min(MAX_ATTEMPTS)
        }
    }

    /// Apply a guess against `target_name`.
    ///
    /// Finished rounds and blank guesses come back unchanged.
    #[must_use]
    pub fn submit_guess(&self, guess: &str, target_name: &str) -> Self {
        if self.finished || guess.trim().is_empty() || self.guesses.len() >= MAX_ATTEMPTS {
            return self.clone();
        }

        let matched = names_match(target_name, guess);
        let mut next = self.clone();
        next.guesses.push(guess.trim().to_string());
        if matched {
            next.finished = true;
            next.won = true;
        } else if next.guesses.len() >= MAX_ATTEMPTS {
            next.finished = true;
            next.won = false;
        }
        next
    }

    /// Whether the persisted shape still honours the round invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.guesses.len() > MAX_ATTEMPTS {
            return false;
        }
        if self.won && !self.finished {
            return false;
        }
        if self.finished && !self.won && self.guesses.len() < MAX_ATTEMPTS {
            return false;
        }
        if !self.finished && self.guesses.len() >= MAX_ATTEMPTS {
            return false;
        }
        !(self.finished && self.guesses.is_empty())
    }

    /// Whether replaying the stored guesses from a fresh round against
    /// `target_name` reproduces exactly this state.
    #[must_use]
    pub fn replays_against(&self, target_name: &str) -> bool {
        let replayed = self
            .guesses
            .iter()
            .fold(Self::new(self.key), |round, guess| round.submit_guess(guess, target_name));
        replayed == *self
    }

    /// Distance/direction hints for every guess so far.
    #[must_use]
    pub fn feedback(&self, target: &Country, catalog: &CountryCatalog) -> Vec<GuessFeedback> {
        self.guesses
            .iter()
            .map(|guess| GuessFeedback::evaluate(guess, target, catalog))
            .collect()
    }
}

/// Per-guess hint shown next to the guess list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessFeedback {
    pub guess: String,
    pub correct: bool,
    /// `None` when the guess is not a catalog country.
    pub distance_km: Option<i64>,
    /// `None` for a correct guess, an unknown name, or zero distance.
    pub direction: Option<CompassArrow>,
}

impl GuessFeedback {
    #[must_use]
    pub fn evaluate(guess: &str, target: &Country, catalog: &CountryCatalog) -> Self {
        let correct = target.matches_name(guess);
        let guessed = catalog.find_by_name(guess);
        let distance = if correct {
            Some(0)
        } else {
            guessed.map(|g| distance_km(g.lat, g.lon, target.lat, target.lon))
        };
        let direction = match (correct, guessed, distance) {
            (false, Some(g), Some(km)) if km > 0 => {
                Some(bearing_arrow(g.lat, g.lon, target.lat, target.lon))
            }
            _ => None,
        };
        Self {
            guess: guess.to_string(),
            correct,
            distance_km: distance,
            direction,
        }
    }
}
