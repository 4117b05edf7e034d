//! Minute/second durations as entered on the project and quick-start forms.
//!
//! Total seconds is the canonical form for arithmetic; `{minutes, seconds}`
//! is only the edit/display projection and always keeps `seconds < 60`.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Duration {
    pub minutes: u32,
    pub seconds: u32,
}

impl Duration {
    /// Carries whole minutes out of `seconds` so the result has `seconds` in `0..=59`.
    pub fn normalize(minutes: u32, seconds: u32) -> Self {
        Self {
            minutes: minutes.saturating_add(seconds / 60),
            seconds: seconds % 60,
        }
    }

    /// Builds a duration from raw form text. Blank, non-numeric and negative
    /// fields count as zero.
    pub fn from_input(minutes: &str, seconds: &str) -> Self {
        Self::normalize(parse_field(minutes), parse_field(seconds))
    }

    pub fn from_total_seconds(total: u32) -> Self {
        Self::normalize(0, total)
    }

    pub fn total_seconds(&self) -> u32 {
        self.minutes.saturating_mul(60).saturating_add(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Reads a numeric form field the way a numeric text input is read: leading
/// whitespace is skipped and the leading run of digits is used, so `"12abc"`
/// is 12. Anything without leading digits, or with a minus sign, is 0.
pub fn parse_field(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

/// Sign-aware `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(total_seconds: i64) -> String {
    let negative = total_seconds < 0;
    let abs = total_seconds.unsigned_abs();
    let formatted = format!("{:02}:{:02}", abs / 60, abs % 60);
    if negative {
        format!("-{formatted}")
    } else {
        formatted
    }
}
