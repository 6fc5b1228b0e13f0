//! Country reference data.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Continent {
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
}

impl Continent {
    pub const ALL: [Self; 5] = [
        Self::Africa,
        Self::Americas,
        Self::Asia,
        Self::Europe,
        Self::Oceania,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Africa => "africa",
            Self::Americas => "americas",
            Self::Asia => "asia",
            Self::Europe => "europe",
            Self::Oceania => "oceania",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Continent {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "africa" => Ok(Self::Africa),
            "americas" => Ok(Self::Americas),
            "asia" => Ok(Self::Asia),
            "europe" => Ok(Self::Europe),
            "oceania" => Ok(Self::Oceania),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// Political status of an entry. Only sovereign states appear as daily puzzles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CountryKind {
    #[default]
    Sovereign,
    Territory,
}

impl CountryKind {
    pub const ALL: [Self; 2] = [Self::Sovereign, Self::Territory];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sovereign => "sovereign",
            Self::Territory => "territory",
        }
    }
}

impl fmt::Display for CountryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountryKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sovereign" => Ok(Self::Sovereign),
            "territory" => Ok(Self::Territory),
            _ => Err(()),
        }
    }
}

/// A single puzzle entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub capital: String,
    pub lat: f64,
    pub lon: f64,
    pub continent: Continent,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub kind: CountryKind,
}

impl Country {
    #[must_use]
    pub const fn is_sovereign(&self) -> bool {
        matches!(self.kind, CountryKind::Sovereign)
    }

    /// Case-insensitive exact name match; surrounding whitespace is ignored.
    #[must_use]
    pub fn matches_name(&self, guess: &str) -> bool {
        names_match(&self.name, guess)
    }
}

/// Shared comparison rule for guesses: trimmed, case-insensitive equality.
#[must_use]
pub fn names_match(name: &str, guess: &str) -> bool {
    name.trim().to_lowercase() == guess.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    countries: Vec<Country>,
}

/// Validated, ordered country list. Load order is the canonical ordering the
/// daily pool is built from, so it must never be re-sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCatalog {
    countries: Vec<Country>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl CountryCatalog {
    /// Parse `{"countries": [...]}` and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the data fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_countries(file.countries)
    }

    /// Validate pre-parsed countries, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, has no sovereign entries, or
    /// contains invalid/duplicate codes, names or coordinates.
    pub fn from_countries(countries: Vec<Country>) -> Result<Self, CatalogError> {
        if countries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut normalized = Vec::with_capacity(countries.len());
        let mut by_code = HashMap::with_capacity(countries.len());
        let mut by_name = HashMap::with_capacity(countries.len());

        for mut country in countries {
            let code = country.code.trim().to_ascii_uppercase();
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(CatalogError::InvalidCode {
                    name: country.name,
                    code: country.code,
                });
            }
            country.code = code;
            country.name = country.name.trim().to_string();
            if country.name.is_empty() {
                return Err(CatalogError::EmptyName { code: country.code });
            }
            if !coordinates_valid(country.lat, country.lon) {
                return Err(CatalogError::CoordinatesOutOfRange {
                    code: country.code,
                    lat: country.lat,
                    lon: country.lon,
                });
            }

            let index = normalized.len();
            if by_code.insert(country.code.clone(), index).is_some() {
                return Err(CatalogError::DuplicateCode { code: country.code });
            }
            if by_name.insert(country.name.to_lowercase(), index).is_some() {
                return Err(CatalogError::DuplicateName { name: country.name });
            }
            normalized.push(country);
        }

        if !normalized.iter().any(Country::is_sovereign) {
            return Err(CatalogError::NoSovereign);
        }

        Ok(Self {
            countries: normalized,
            by_code,
            by_name,
        })
    }

    /// The catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset fails validation.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_COUNTRIES_JSON)
    }

    #[must_use]
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Country> {
        self.countries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Always false for a constructed catalog; kept for slice-like ergonomics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    #[must_use]
    pub fn get_by_code(&self, code: &str) -> Option<&Country> {
        let key = code.trim().to_ascii_uppercase();
        self.by_code.get(&key).map(|&i| &self.countries[i])
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Country> {
        let key = name.trim().to_lowercase();
        self.by_name.get(&key).map(|&i| &self.countries[i])
    }

    /// Sovereign entries in canonical order.
    pub fn sovereign(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter().filter(|c| c.is_sovereign())
    }

    /// Names starting with `prefix` (case-insensitive), in catalog order.
    #[must_use]
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<&str> {
        let needle = prefix.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.countries
            .iter()
            .filter(|c| c.name.to_lowercase().starts_with(&needle))
            .map(|c| c.name.as_str())
            .take(limit)
            .collect()
    }
}

impl<'a> IntoIterator for &'a CountryCatalog {
    type Item = &'a Country;
    type IntoIter = std::slice::Iter<'a, Country>;

    fn into_iter(self) -> Self::IntoIter {
        self.countries.iter()
    }
}

fn coordinates_valid(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

const BUNDLED_COUNTRIES_JSON: &str = include_str!("../assets/countries.json");

/// Process-wide copy of the bundled catalog, parsed on first use.
///
/// # Errors
///
/// Returns the validation error if the embedded asset is broken.
pub fn bundled_catalog() -> Result<&'static CountryCatalog, &'static CatalogError> {
    static CATALOG: OnceLock<Result<CountryCatalog, CatalogError>> = OnceLock::new();
    CATALOG.get_or_init(CountryCatalog::bundled).as_ref()
}
