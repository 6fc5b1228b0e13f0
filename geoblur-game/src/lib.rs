//! GeoBlur Game Engine
//!
//! Platform-agnostic core for the GeoBlur daily geography guessing game:
//! reference-timezone day boundaries, deterministic daily puzzles, the
//! six-guess round machine and the share text. Rendering, input and storage
//! backends live with the host.

pub mod clock;
pub mod config;
pub mod constants;
pub mod countries;
pub mod day_index;
pub mod error;
pub mod filter;
pub mod geo;
pub mod round;
pub mod selector;
pub mod session;
pub mod share;
pub mod stats;
pub mod storage;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;

// Re-export commonly used types
pub use clock::{
    Clock, FixedClock, ReferenceCalendar, ReferenceDate, SystemClock, default_reference_zone,
    reference_date_in, resolve_zone,
};
pub use config::GameConfig;
pub use countries::{
    Continent, Country, CountryCatalog, CountryKind, Difficulty, bundled_catalog, names_match,
};
pub use day_index::{DayIndex, default_epoch};
pub use error::{CatalogError, ConfigError, EmptyFilterResult, GameError, PersistenceCorruption};
pub use filter::{ContinentFilter, DifficultyFilter, GameFilter, KindFilter};
pub use geo::{CompassArrow, bearing_arrow, bearing_degrees, distance_km};
pub use round::{GuessFeedback, RoundKey, RoundState, RoundStatus};
pub use selector::{daily_puzzle, filtered_pool, random_puzzle};
pub use session::{ActiveRound, GameSession, PuzzleSlot, RolloverPoller, SubmitOutcome};
pub use share::{GameMode, format_share_text, format_share_text_with_url};
pub use stats::PlayerStats;
pub use storage::{GameStorage, MemoryStorage, decode_round, decode_stats};

/// Source of the reference data a session is built from.
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the country catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or fails validation.
    fn load_countries(&self) -> Result<CountryCatalog, Self::Error>;

    /// Load presentation/platform settings. Defaults unless overridden.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        Ok(GameConfig::default())
    }
}

/// Loader backed by the catalog compiled into the crate.
#[derive(Debug, Clone, Default)]
pub struct StaticDataLoader {
    config: GameConfig,
}

impl StaticDataLoader {
    #[must_use]
    pub const fn with_config(config: GameConfig) -> Self {
        Self { config }
    }
}

impl DataLoader for StaticDataLoader {
    type Error = CatalogError;

    fn load_countries(&self) -> Result<CountryCatalog, Self::Error> {
        CountryCatalog::bundled()
    }

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        Ok(self.config.clone())
    }
}

/// Main entry point for hosts: pairs a data loader with a storage backend
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Session on the wall clock with an entropy-seeded ad-hoc RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or config cannot be loaded, or the
    /// config is invalid.
    pub fn create_session(&self) -> Result<GameSession<&S, SystemClock, ChaCha20Rng>, GameError> {
        self.create_session_with(SystemClock, ChaCha20Rng::from_entropy())
    }

    /// Session with an explicit clock and ad-hoc RNG, for tests and replays.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or config cannot be loaded, or the
    /// config is invalid.
    pub fn create_session_with<C, R>(
        &self,
        clock: C,
        rng: R,
    ) -> Result<GameSession<&S, C, R>, GameError>
    where
        C: Clock,
        R: rand::Rng,
    {
        let catalog = self
            .data_loader
            .load_countries()
            .map_err(|err| GameError::Load(Box::new(err)))?;
        let config = self
            .data_loader
            .load_config()
            .map_err(|err| GameError::Load(Box::new(err)))?;
        log::debug!(
            "creating session: {} countries, zone {}",
            catalog.len(),
            config.reference_timezone
        );
        GameSession::new(Arc::new(catalog), config, &self.storage, clock, rng)
    }
}
