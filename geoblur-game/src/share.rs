//! Shareable result text.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    DEFAULT_SHARE_URL, MAX_ATTEMPTS, SHARE_AD_HOC_LABEL, SHARE_HIT, SHARE_LOSS_MARKER, SHARE_MISS,
    SHARE_TITLE, SHARE_WIN_MARKER,
};
use crate::countries::names_match;

/// Which of the two independent round slots is in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Daily,
    AdHoc,
}

impl GameMode {
    #[must_use]
    pub const fn is_ad_hoc(self) -> bool {
        matches!(self, Self::AdHoc)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::AdHoc => "ad_hoc",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the share message with the default footer link.
#[must_use]
pub fn format_share_text<S: AsRef<str>>(
    guesses: &[S],
    target_name: &str,
    won: bool,
    mode: GameMode,
    day_number: i64,
) -> String {
    format_share_text_with_url(guesses, target_name, won, mode, day_number, DEFAULT_SHARE_URL)
}

/// Title, outcome, one marker line per guess, footer link.
#[must_use]
pub fn format_share_text_with_url<S: AsRef<str>>(
    guesses: &[S],
    target_name: &str,
    won: bool,
    mode: GameMode,
    day_number: i64,
    share_url: &str,
) -> String {
    let mut lines = Vec::with_capacity(guesses.len() + 3);

    lines.push(match mode {
        GameMode::Daily => format!("{SHARE_TITLE} #{day_number}"),
        GameMode::AdHoc => format!("{SHARE_TITLE} {SHARE_AD_HOC_LABEL}"),
    });

    lines.push(if won {
        format!("{SHARE_WIN_MARKER} {}/{MAX_ATTEMPTS}", guesses.len())
    } else {
        format!("{SHARE_LOSS_MARKER} X/{MAX_ATTEMPTS}")
    });

    for guess in guesses {
        let marker = if names_match(target_name, guess.as_ref()) {
            SHARE_HIT
        } else {
            SHARE_MISS
        };
        lines.push(marker.to_string());
    }

    lines.push(share_url.to_string());
    lines.join("\n")
}
