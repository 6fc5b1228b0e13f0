//! Ad-hoc round preferences.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::countries::{Continent, Country, CountryKind, Difficulty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContinentFilter {
    #[default]
    All,
    Only(Continent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyFilter {
    #[default]
    Mixed,
    Only(Difficulty),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Only(CountryKind),
}

impl ContinentFilter {
    #[must_use]
    pub fn accepts(self, country: &Country) -> bool {
        match self {
            Self::All => true,
            Self::Only(continent) => country.continent == continent,
        }
    }
}

impl DifficultyFilter {
    #[must_use]
    pub fn accepts(self, country: &Country) -> bool {
        match self {
            Self::Mixed => true,
            Self::Only(difficulty) => country.difficulty == difficulty,
        }
    }
}

impl KindFilter {
    #[must_use]
    pub fn accepts(self, country: &Country) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => country.kind == kind,
        }
    }
}

impl fmt::Display for ContinentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(continent) => continent.fmt(f),
        }
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixed => f.write_str("mixed"),
            Self::Only(difficulty) => difficulty.fmt(f),
        }
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(kind) => kind.fmt(f),
        }
    }
}

impl FromStr for ContinentFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl FromStr for DifficultyFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("mixed") {
            return Ok(Self::Mixed);
        }
        s.parse().map(Self::Only)
    }
}

impl FromStr for KindFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Continent, difficulty and type selectors combined with AND semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GameFilter {
    #[serde(default)]
    pub continent: ContinentFilter,
    #[serde(default)]
    pub difficulty: DifficultyFilter,
    #[serde(default)]
    pub kind: KindFilter,
}

impl GameFilter {
    #[must_use]
    pub const fn new(
        continent: ContinentFilter,
        difficulty: DifficultyFilter,
        kind: KindFilter,
    ) -> Self {
        Self {
            continent,
            difficulty,
            kind,
        }
    }

    #[must_use]
    pub const fn with_continent(mut self, continent: Continent) -> Self {
        self.continent = ContinentFilter::Only(continent);
        self
    }

    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = DifficultyFilter::Only(difficulty);
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: CountryKind) -> Self {
        self.kind = KindFilter::Only(kind);
        self
    }

    #[must_use]
    pub fn accepts(&self, country: &Country) -> bool {
        self.continent.accepts(country)
            && self.difficulty.accepts(country)
            && self.kind.accepts(country)
    }

    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        matches!(self.continent, ContinentFilter::All)
            && matches!(self.difficulty, DifficultyFilter::Mixed)
            && matches!(self.kind, KindFilter::All)
    }

    /// Every filter combination, unrestricted first.
    #[must_use]
    pub fn all_combinations() -> Vec<Self> {
        let continents = std::iter::once(ContinentFilter::All)
            .chain(Continent::ALL.into_iter().map(ContinentFilter::Only));
        let mut combos = Vec::new();
        for continent in continents {
            let difficulties = std::iter::once(DifficultyFilter::Mixed)
                .chain(Difficulty::ALL.into_iter().map(DifficultyFilter::Only));
            for difficulty in difficulties {
                let kinds = std::iter::once(KindFilter::All)
                    .chain(CountryKind::ALL.into_iter().map(KindFilter::Only));
                for kind in kinds {
                    combos.push(Self::new(continent, difficulty, kind));
                }
            }
        }
        combos
    }
}

impl fmt::Display for GameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.continent, self.difficulty, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(continent: Continent, difficulty: Difficulty, kind: CountryKind) -> Country {
        Country {
            name: "Sample".to_string(),
            code: "SM".to_string(),
            capital: String::new(),
            lat: 0.0,
            lon: 0.0,
            continent,
            difficulty,
            kind,
        }
    }

    #[test]
    fn default_filter_accepts_everything() {
        let filter = GameFilter::default();
        assert!(filter.is_unrestricted());
        assert!(filter.accepts(&sample(Continent::Asia, Difficulty::Hard, CountryKind::Territory)));
    }

    #[test]
    fn filters_combine_conjunctively() {
        let filter = GameFilter::default()
            .with_continent(Continent::Europe)
            .with_difficulty(Difficulty::Easy);
        let sovereign =
            |continent, difficulty| sample(continent, difficulty, CountryKind::Sovereign);
        assert!(filter.accepts(&sovereign(Continent::Europe, Difficulty::Easy)));
        assert!(!filter.accepts(&sovereign(Continent::Europe, Difficulty::Hard)));
        assert!(!filter.accepts(&sovereign(Continent::Africa, Difficulty::Easy)));

        let territories = filter.with_kind(CountryKind::Territory);
        assert!(!territories.accepts(&sovereign(Continent::Europe, Difficulty::Easy)));
    }

    #[test]
    fn enumerates_every_combination() {
        let combos = GameFilter::all_combinations();
        assert_eq!(combos.len(), 6 * 4 * 3);
        assert!(combos[0].is_unrestricted());
    }

    #[test]
    fn parses_selector_labels() {
        assert_eq!("ALL".parse::<ContinentFilter>(), Ok(ContinentFilter::All));
        assert_eq!(
            "oceania".parse::<ContinentFilter>(),
            Ok(ContinentFilter::Only(Continent::Oceania))
        );
        assert_eq!("mixed".parse::<DifficultyFilter>(), Ok(DifficultyFilter::Mixed));
        assert_eq!(
            "territory".parse::<KindFilter>(),
            Ok(KindFilter::Only(CountryKind::Territory))
        );
        assert!("everything".parse::<KindFilter>().is_err());
    }

    #[test]
    fn serializes_with_lowercase_tags() {
        let filter = GameFilter::default().with_continent(Continent::Asia);
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(
            json,
            r#"{"continent":{"only":"asia"},"difficulty":"mixed","kind":"all"}"#
        );
        let back: GameFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, filter);
        assert_eq!(filter.to_string(), "asia/mixed/all");
    }
}
