use std::collections::HashSet;
use std::fmt::Write as _;
use std::hash::Hasher;

use geoblur_game::{
    Continent, CountryKind, DayIndex, GameFilter, GameMode, ReferenceDate, bundled_catalog,
    daily_puzzle, filtered_pool, format_share_text,
};
use twox_hash::XxHash64;

/// Digest of the first year of daily picks. Changing the bundled catalog
/// order reshuffles every future puzzle, so it has to be deliberate.
const SCHEDULE_HASH: u64 = 0x78db_215e_f350_7f82;

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

#[test]
fn daily_schedule_snapshot_stable() {
    let catalog = bundled_catalog().unwrap();
    let mut schedule = String::new();
    for day in 0..366 {
        writeln!(schedule, "{day}:{}", daily_puzzle(catalog, day).code).unwrap();
    }
    assert_eq!(
        snapshot_hash(schedule.as_bytes()),
        SCHEDULE_HASH,
        "daily schedule changed\n{schedule}"
    );
}

#[test]
fn bundled_catalog_shape() {
    let catalog = bundled_catalog().unwrap();
    assert_eq!(catalog.len(), 83);
    assert_eq!(catalog.sovereign().count(), 72);
    assert_eq!(catalog.countries()[0].code, "FR");

    let mut continents = HashSet::new();
    for country in catalog {
        assert_eq!(country.code.len(), 2, "{}", country.name);
        assert!(!country.capital.is_empty(), "{} has no capital", country.name);
        assert!(catalog.find_by_name(&country.name.to_uppercase()).is_some());
        continents.insert(country.continent);
    }
    assert_eq!(continents.len(), Continent::ALL.len());
}

#[test]
fn every_continent_offers_sovereign_puzzles() {
    let catalog = bundled_catalog().unwrap();
    for continent in Continent::ALL {
        let filter = GameFilter::default()
            .with_continent(continent)
            .with_kind(CountryKind::Sovereign);
        let pool = filtered_pool(catalog, &filter, None).unwrap();
        assert!(pool.len() >= 2, "{continent} has too few sovereign entries");
    }
}

#[test]
fn filter_grid_reports_empty_combinations_without_panicking() {
    let catalog = bundled_catalog().unwrap();
    let combos = GameFilter::all_combinations();
    let empty: Vec<String> = combos
        .iter()
        .filter(|filter| filtered_pool(catalog, filter, None).is_err())
        .map(ToString::to_string)
        .collect();
    assert!(empty.len() < combos.len());
    assert!(empty.contains(&"oceania/easy/territory".to_string()));
}

#[test]
fn share_text_for_scheduled_day_matches_template() {
    let catalog = bundled_catalog().unwrap();
    let index = DayIndex::default();
    let date = ReferenceDate::from_ymd(2024, 1, 2).unwrap();
    let day = index.day_number(date);
    let target = daily_puzzle(catalog, day);
    assert_eq!(target.name, "Spain");

    let text = format_share_text(&["France", "spain "], &target.name, true, GameMode::Daily, day);
    assert_eq!(text, "GeoBlur #1\n🎯 2/6\n🟥\n🟩\nhttps://geoblur.app");
}
