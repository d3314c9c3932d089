//! Progress extraction from yt-dlp output lines
//!
//! yt-dlp reports progress as free text, e.g.
//!
//! ```text
//! [download]  42.3% of   10.00MiB at    1.20MiB/s ETA 00:05
//! [download]   1.50MiB of 3.00MiB
//! ```
//!
//! Two strategies extract a completion fraction from such a line: a ratio of
//! two byte quantities and a literal percentage. Neither fails on input it
//! does not understand; it just yields `None`.

use regex::Regex;
use std::sync::LazyLock;

/// Marker yt-dlp puts in front of every download progress report
pub const DOWNLOAD_MARKER: &str = "[download]";

#[allow(clippy::expect_used)]
static RATIO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([0-9]+(?:\.[0-9]+)?\s*[a-z]*|\S+)\s+of\s+~?\s*([0-9]+(?:\.[0-9]+)?\s*[a-z]*|\S+)",
    )
    .expect("ratio pattern is valid")
});

#[allow(clippy::expect_used)]
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)%").expect("percent pattern is valid")
});

#[allow(clippy::expect_used)]
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)\s*([A-Za-z]*)\s*$").expect("quantity pattern is valid")
});

/// Turns one line of tool output into a completion fraction
///
/// Implementations must be tolerant: a line they cannot read yields `None`,
/// never a panic or an error.
pub trait ProgressParser: Send + Sync {
    /// Extract a progress fraction (nominally 0.0 to 1.0) from `line`
    fn parse_progress(&self, line: &str) -> Option<f64>;
}

/// Default parser for yt-dlp's `[download]` lines
///
/// Only lines carrying the `[download]` marker are considered. A ratio of two
/// recognized byte quantities wins; otherwise the first percentage is used;
/// otherwise a ratio with an unrecognized side (counted as zero) is reported.
/// Values are not clamped.
#[derive(Debug, Clone, Copy, Default)]
pub struct YtDlpProgressParser;

impl ProgressParser for YtDlpProgressParser {
    fn parse_progress(&self, line: &str) -> Option<f64> {
        if !has_download_marker(line) {
            return None;
        }

        if let Some((downloaded, total)) = ratio_sides(line)
            && let (Some(downloaded), Some(total)) =
                (parse_byte_quantity(downloaded), parse_byte_quantity(total))
            && total > 0.0
        {
            return Some(downloaded / total);
        }

        parse_percentage(line).or_else(|| parse_ratio(line))
    }
}

/// Whether `line` carries the `[download]` marker (case-insensitive)
pub fn has_download_marker(line: &str) -> bool {
    line.to_ascii_lowercase().contains(DOWNLOAD_MARKER)
}

/// Convert a human-readable size such as `2.5MiB` to bytes
///
/// Recognized suffixes are `B`, `KiB`, `MiB` and `GiB` (binary multipliers,
/// case-insensitive, optional space before the unit). Anything else yields
/// `None`.
pub fn parse_byte_quantity(s: &str) -> Option<f64> {
    let caps = QUANTITY_RE.captures(s)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2).map_or("", |m| m.as_str());

    let multiplier = if unit.eq_ignore_ascii_case("b") {
        1.0
    } else if unit.eq_ignore_ascii_case("kib") {
        1024.0
    } else if unit.eq_ignore_ascii_case("mib") {
        1024.0 * 1024.0
    } else if unit.eq_ignore_ascii_case("gib") {
        1024.0 * 1024.0 * 1024.0
    } else {
        return None;
    };

    Some(value * multiplier)
}

/// Ratio strategy: `<downloaded> of <total>`
///
/// A side with an unrecognized unit counts as zero bytes. Returns `None` when
/// there is no `of` pattern or the total is not positive.
pub fn parse_ratio(line: &str) -> Option<f64> {
    let (downloaded, total) = ratio_sides(line)?;
    let downloaded = parse_byte_quantity(downloaded).unwrap_or(0.0);
    let total = parse_byte_quantity(total).unwrap_or(0.0);

    if total > 0.0 {
        Some(downloaded / total)
    } else {
        None
    }
}

/// Percentage strategy: first decimal number directly followed by `%`, over 100
pub fn parse_percentage(line: &str) -> Option<f64> {
    let caps = PERCENT_RE.captures(line)?;
    let percent: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(percent / 100.0)
}

fn ratio_sides(line: &str) -> Option<(&str, &str)> {
    let caps = RATIO_RE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}
