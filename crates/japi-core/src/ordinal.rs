//! # English Ordinals
//!
//! Renders 1-based positions as `1st`, `2nd`, `3rd`, `4th`, ... for
//! user-facing error text. The 11–13 exception repeats every hundred, so
//! `111th` and `112th` sit next to `121st` and `122nd`.

/// The ordinal suffix for `n` (`"st"`, `"nd"`, `"rd"` or `"th"`).
pub fn ordinal_suffix(n: usize) -> &'static str {
    match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// Render `n` with its English ordinal suffix.
pub fn ordinal(n: usize) -> String {
    format!("{n}{}", ordinal_suffix(n))
}
