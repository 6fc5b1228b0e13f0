use anyhow::{Context, Result};
use geoblur_game::ReferenceDate;
use std::path::PathBuf;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a `--date` argument (`YYYY-MM-DD`).
pub fn parse_reference_date(raw: &str) -> Result<ReferenceDate> {
    raw.trim()
        .parse::<ReferenceDate>()
        .with_context(|| format!("invalid reference date '{raw}' (expected YYYY-MM-DD)"))
}

/// Fresh scratch directory path under the system temp dir; not created.
pub fn scratch_dir(label: &str, seed: u64) -> PathBuf {
    std::env::temp_dir().join(format!(
        "geoblur-{label}-{seed}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}
