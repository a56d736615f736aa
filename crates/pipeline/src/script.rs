//! Parsing model output into dialogue turns.
//!
//! The model is asked to emit `male-1: ...` / `female-1: ...` lines but
//! regularly drifts: different tags, dash separators, or untagged
//! continuation lines. The parser recovers what it can instead of
//! discarding content.

use std::sync::LazyLock;

use {regex::Regex, tracing::debug};

use crate::dialogue::{DialogueTurn, Speaker};

/// Leading speaker tag plus `:` or `-` separator. Tag matching is
/// case-insensitive; longer tags come first so `male-1` is not consumed
/// as `male`.
#[allow(clippy::expect_used)]
static SPEAKER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(male-1|female-1|male|female|host|guest)\s*[:-]\s*(.+)$")
        .expect("speaker pattern compiles")
});

/// Parse a raw script into ordered turns.
///
/// Untagged lines after at least one parsed turn are treated as a
/// continuation by the *opposite* speaker of the previous turn; untagged
/// lines before any turn are discarded. May return an empty vec — the
/// caller treats that as a hard failure.
#[must_use]
pub fn parse_script(raw: &str) -> Vec<DialogueTurn> {
    let mut turns: Vec<DialogueTurn> = Vec::new();
    let mut discarded = 0usize;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = SPEAKER_LINE_RE.captures(line) {
            let tag = caps.get(1).map_or("", |m| m.as_str());
            let text = caps.get(2).map_or("", |m| m.as_str());
            let speaker = Speaker::from_tag_or_primary(tag);
            if let Some(turn) = DialogueTurn::new(speaker, text) {
                turns.push(turn);
            }
            continue;
        }

        // Alternation fallback: an untagged line continues the
        // conversation as the opposite speaker of the previous turn.
        match turns.last() {
            Some(previous) => {
                let speaker = previous.speaker().opposite();
                if let Some(turn) = DialogueTurn::new(speaker, line) {
                    turns.push(turn);
                }
            },
            None => discarded += 1,
        }
    }

    debug!(
        parsed = turns.len(),
        discarded, "parsed dialogue script"
    );
    turns
}
