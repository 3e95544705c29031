//! Stance text parsing
//!
//! A kingdom's stance is free text from the dump. An active war reads
//! `"war <loc>"`, optionally with trailing tokens. The at-war predicate is
//! deliberately looser than the opponent tokenizer: any stance containing
//! "war" counts as at war, but only a leading "war" token yields an
//! opponent. Stances that pass the first check and fail the second are
//! flagged at war and then skipped for lack of an opponent. Keep the
//! asymmetry: both halves are matched against live dump data.

/// Opponent loc from a stance string, if it parses as `"war <loc> ..."`.
///
/// The second token is returned verbatim; whether it names a real kingdom
/// is the caller's problem.
pub fn parse_opponent(stance: &str) -> Option<&str> {
    let mut tokens = stance.split_whitespace();
    let first = tokens.next()?;
    if !first.eq_ignore_ascii_case("war") {
        return None;
    }
    tokens.next()
}

/// True if the stance text mentions "war" anywhere, case-insensitively.
pub fn is_at_war(stance: &str) -> bool {
    stance.to_ascii_lowercase().contains("war")
}
