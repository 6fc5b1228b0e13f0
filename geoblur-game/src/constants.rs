//! Centralized rules and defaults for GeoBlur game logic.
//!
//! Gameplay rules live here as code so every player computes the same daily
//! puzzle; only presentation-level knobs are exposed through `GameConfig`.

// Round rules ---------------------------------------------------------------
/// Attempt budget for every round, daily or ad-hoc.
pub const MAX_ATTEMPTS: usize = 6;

// Calendar ------------------------------------------------------------------
pub const DEFAULT_REFERENCE_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_EPOCH_YEAR: i32 = 2024;
pub const DEFAULT_EPOCH_MONTH: u32 = 1;
pub const DEFAULT_EPOCH_DAY: u32 = 1;
pub const REFERENCE_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_ROLLOVER_POLL_SECS: u64 = 15;

// Persistence ---------------------------------------------------------------
pub const DEFAULT_STORAGE_PREFIX: &str = "geoblur";
pub(crate) const STORAGE_DAILY_SUFFIX: &str = "daily";
pub(crate) const STORAGE_STATS_SUFFIX: &str = "stats";
/// Round key used for ad-hoc rounds; never a valid `YYYY-MM-DD` date.
pub const AD_HOC_ROUND_KEY: &str = "infinite";

// Share text ----------------------------------------------------------------
pub const DEFAULT_SHARE_URL: &str = "https://geoblur.app";
pub(crate) const SHARE_TITLE: &str = "GeoBlur";
pub(crate) const SHARE_AD_HOC_LABEL: &str = "∞ Infinite";
pub(crate) const SHARE_WIN_MARKER: &str = "🎯";
pub(crate) const SHARE_LOSS_MARKER: &str = "❌";
pub(crate) const SHARE_HIT: &str = "🟩";
pub(crate) const SHARE_MISS: &str = "🟥";

// Geo -----------------------------------------------------------------------
pub(crate) const EARTH_RADIUS_KM: f64 = 6371.0;
pub(crate) const COMPASS_OCTANT_DEGREES: f64 = 45.0;
