//! Puzzle selection: the deterministic daily pick and the filtered random pick.
use rand::Rng;
use rand::seq::SliceRandom;

use crate::countries::{Country, CountryCatalog};
use crate::error::EmptyFilterResult;
use crate::filter::GameFilter;

/// Country for `day_number`: `sovereign[day mod len]` in canonical order.
///
/// Same day number and same catalog give the same country on every machine.
#[must_use]
pub fn daily_puzzle(catalog: &CountryCatalog, day_number: i64) -> &Country {
    let pool: Vec<&Country> = catalog.sovereign().collect();
    // Catalog validation guarantees at least one sovereign entry.
    let len = i64::try_from(pool.len()).unwrap_or(i64::MAX).max(1);
    let index = usize::try_from(day_number.rem_euclid(len)).unwrap_or(0);
    let country = pool
        .get(index)
        .copied()
        .unwrap_or_else(|| &catalog.countries()[0]);
    log::debug!("daily puzzle for day {day_number}: {}", country.code);
    country
}

/// Entries passing `filter`, minus `exclude_code` when given.
///
/// # Errors
///
/// Returns [`EmptyFilterResult`] when nothing survives.
pub fn filtered_pool<'a>(
    catalog: &'a CountryCatalog,
    filter: &GameFilter,
    exclude_code: Option<&str>,
) -> Result<Vec<&'a Country>, EmptyFilterResult> {
    let pool: Vec<&Country> = catalog
        .iter()
        .filter(|country| filter.accepts(country))
        .filter(|country| {
            exclude_code.is_none_or(|code| !country.code.eq_ignore_ascii_case(code.trim()))
        })
        .collect();
    if pool.is_empty() {
        Err(EmptyFilterResult)
    } else {
        Ok(pool)
    }
}

/// Uniform pick from the filtered pool, widening to the whole catalog when
/// the filter leaves nothing to choose from.
pub fn random_puzzle<'a, R: Rng + ?Sized>(
    catalog: &'a CountryCatalog,
    filter: &GameFilter,
    exclude_code: Option<&str>,
    rng: &mut R,
) -> &'a Country {
    let pool = filtered_pool(catalog, filter, exclude_code).unwrap_or_else(|EmptyFilterResult| {
        log::debug!("no countries match filter {filter}; choosing from the full catalog");
        catalog.iter().collect()
    });
    let picked = pool
        .choose(rng)
        .copied()
        .unwrap_or_else(|| &catalog.countries()[0]);
    log::debug!("ad-hoc puzzle picked {} from {} candidates", picked.code, pool.len());
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::{Continent, CountryKind, Difficulty};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    fn catalog() -> CountryCatalog {
        crate::countries::bundled_catalog().unwrap().clone()
    }

    #[test]
    fn daily_puzzle_is_deterministic() {
        let catalog = catalog();
        for day in 0..200 {
            let first = daily_puzzle(&catalog, day);
            let second = daily_puzzle(&catalog, day);
            assert_eq!(first.code, second.code);
        }
    }

    #[test]
    fn daily_puzzle_only_returns_sovereign_entries() {
        let catalog = catalog();
        for day in -50..500 {
            assert!(daily_puzzle(&catalog, day).is_sovereign());
        }
    }

    #[test]
    fn daily_puzzle_walks_the_pool_in_order() {
        let catalog = catalog();
        let pool: Vec<&Country> = catalog.sovereign().collect();
        let len = i64::try_from(pool.len()).unwrap();
        assert_eq!(daily_puzzle(&catalog, 0).code, pool[0].code);
        assert_eq!(daily_puzzle(&catalog, 1).code, pool[1].code);
        assert_eq!(daily_puzzle(&catalog, len).code, pool[0].code);
        assert_eq!(daily_puzzle(&catalog, -1).code, pool[pool.len() - 1].code);
        let cycle: HashSet<_> = (0..len).map(|d| daily_puzzle(&catalog, d).code.clone()).collect();
        assert_eq!(cycle.len(), pool.len());
    }

    #[test]
    fn filtered_pool_applies_filters_and_exclusion() {
        let catalog = catalog();
        let filter = GameFilter::default()
            .with_continent(Continent::Europe)
            .with_difficulty(Difficulty::Easy);
        let pool = filtered_pool(&catalog, &filter, Some("fr")).unwrap();
        assert!(!pool.is_empty());
        assert!(pool.iter().all(|c| c.continent == Continent::Europe));
        assert!(pool.iter().all(|c| c.difficulty == Difficulty::Easy));
        assert!(pool.iter().all(|c| c.code != "FR"));
    }

    #[test]
    fn filtered_pool_reports_empty_result() {
        let catalog = catalog();
        let filter = GameFilter::default()
            .with_continent(Continent::Oceania)
            .with_difficulty(Difficulty::Easy)
            .with_kind(CountryKind::Territory);
        assert_eq!(filtered_pool(&catalog, &filter, None), Err(EmptyFilterResult));
    }

    #[test]
    fn random_puzzle_respects_filter() {
        let catalog = catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let filter = GameFilter::default().with_kind(CountryKind::Territory);
        for _ in 0..50 {
            let pick = random_puzzle(&catalog, &filter, None, &mut rng);
            assert_eq!(pick.kind, CountryKind::Territory);
        }
    }

    #[test]
    fn random_puzzle_never_returns_excluded_code_when_alternatives_exist() {
        let catalog = catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..200 {
            let pick = random_puzzle(&catalog, &GameFilter::default(), Some("JP"), &mut rng);
            assert_ne!(pick.code, "JP");
        }
    }

    #[test]
    fn random_puzzle_falls_back_to_full_catalog() {
        let catalog = catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let filter = GameFilter::default()
            .with_continent(Continent::Oceania)
            .with_difficulty(Difficulty::Easy)
            .with_kind(CountryKind::Territory);
        let mut seen = HashSet::new();
        for _ in 0..300 {
            let pick = random_puzzle(&catalog, &filter, None, &mut rng);
            assert!(catalog.get_by_code(&pick.code).is_some());
            seen.insert(pick.continent);
        }
        assert!(seen.len() > 1, "fallback should draw from every region");
    }

    #[test]
    fn random_puzzle_draws_uniformly_from_the_pool() {
        let catalog = CountryCatalog::from_json(
            r#"{"countries": [
                {"name": "Chile", "code": "CL", "lat": -35.7, "lon": -71.5, "continent": "americas"},
                {"name": "Ghana", "code": "GH", "lat": 7.9, "lon": -1.0, "continent": "africa"},
                {"name": "Nepal", "code": "NP", "lat": 28.4, "lon": 84.1, "continent": "asia"},
                {"name": "Malta", "code": "MT", "lat": 35.9, "lon": 14.4, "continent": "europe"}
            ]}"#,
        )
        .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(2024);
        let draws_per_entry = 1_000;
        let mut counts = std::collections::HashMap::new();
        for _ in 0..draws_per_entry * catalog.len() {
            let pick = random_puzzle(&catalog, &GameFilter::default(), None, &mut rng);
            *counts.entry(pick.code.clone()).or_insert(0usize) += 1;
        }
        assert_eq!(counts.len(), catalog.len());
        for (code, count) in counts {
            assert!((850..=1150).contains(&count), "{code} drawn {count} times");
        }
    }

    #[test]
    fn random_puzzle_is_reproducible_with_same_seed() {
        let catalog = catalog();
        let mut a = ChaCha20Rng::seed_from_u64(99);
        let mut b = ChaCha20Rng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(
                random_puzzle(&catalog, &GameFilter::default(), None, &mut a).code,
                random_puzzle(&catalog, &GameFilter::default(), None, &mut b).code
            );
        }
    }

    #[test]
    fn single_entry_pool_with_exclusion_falls_back() {
        let catalog = CountryCatalog::from_json(
            r#"{"countries": [{"name": "Fiji", "code": "FJ", "lat": -17.7, "lon": 178.0, "continent": "oceania"}]}"#,
        )
        .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let pick = random_puzzle(&catalog, &GameFilter::default(), Some("FJ"), &mut rng);
        assert_eq!(pick.code, "FJ");
    }
}
