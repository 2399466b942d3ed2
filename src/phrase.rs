//! Phrase detection over user-entered text.
//!
//! Text is normalized (`0` → `o`, `1` → `i`) and then tested against a fixed,
//! ordered table of phrases. Each phrase compiles to an elongation-tolerant
//! pattern: every letter may repeat one or more times and letter case is
//! ignored. The first matching entry decides the verdict.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::color::Color;

pub const FLAGGED_MESSAGE: &str = "Hey! Found some issues!";
pub const CLEAR_MESSAGE: &str = "All clear!";

/// Light red.
pub const FLAGGED_COLOR: Color = Color::rgb(0xff, 0xcc, 0xcc);
/// Light green.
pub const CLEAR_COLOR: Color = Color::rgb(0xcc, 0xff, 0xcc);

/// Disallowed phrases, in evaluation order.
const PHRASES: &[&str] = &["ayo", "homie", "skillets"];

struct PhrasePattern {
    phrase: &'static str,
    regex: Regex,
}

static PATTERNS: LazyLock<Vec<PhrasePattern>> = LazyLock::new(|| {
    PHRASES
        .iter()
        .map(|&phrase| {
            let pattern = elongation_pattern(phrase);
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .unicode(false)
                .build()
                .unwrap_or_else(|e| panic!("invalid phrase pattern '{pattern}': {e}"));
            PhrasePattern { phrase, regex }
        })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchVerdict {
    pub flagged: bool,
    /// The first phrase that matched, if any.
    pub matched: Option<&'static str>,
    pub message: &'static str,
    pub color: Color,
}

impl MatchVerdict {
    fn flagged(phrase: &'static str) -> Self {
        Self {
            flagged: true,
            matched: Some(phrase),
            message: FLAGGED_MESSAGE,
            color: FLAGGED_COLOR,
        }
    }

    fn clear() -> Self {
        Self {
            flagged: false,
            matched: None,
            message: CLEAR_MESSAGE,
            color: CLEAR_COLOR,
        }
    }
}

/// Replace digit look-alikes before matching. Other characters are untouched.
pub fn normalize(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['0', '1']) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.chars()
            .map(|c| match c {
                '0' => 'o',
                '1' => 'i',
                c => c,
            })
            .collect(),
    )
}

pub fn evaluate(raw: &str) -> MatchVerdict {
    let input = normalize(raw);
    let matched = PATTERNS
        .iter()
        .find(|p| p.regex.is_match(&input))
        .map(|p| p.phrase);

    tracing::debug!(normalized = %input, ?matched, "evaluated phrase patterns");

    match matched {
        Some(phrase) => MatchVerdict::flagged(phrase),
        None => MatchVerdict::clear(),
    }
}

/// Phrases in evaluation order, paired with the pattern each compiles to.
pub fn phrase_patterns() -> impl Iterator<Item = (&'static str, &'static str)> {
    PATTERNS.iter().map(|p| (p.phrase, p.regex.as_str()))
}

fn elongation_pattern(phrase: &str) -> String {
    let mut pattern = String::with_capacity(phrase.len() * 2);
    for c in phrase.chars() {
        pattern.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4])));
        pattern.push('+');
    }
    pattern
}
