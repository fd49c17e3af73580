//! Release matching for database identifiers.
//!
//! Database names end in a generation number, optionally followed by one or
//! two more numbers: `panthera_pardus_core_93_1`, `..._core_40_93_1`. A name
//! belongs to release `R` when its first trailing number is `R`, or when its
//! second number is `R` and sits exactly `offset` (53 by default) above the
//! first. The offset encodes a fixed cross-generation numbering window.

use std::sync::OnceLock;

use regex::Regex;

/// Distance between the two numbering schemes that share a release.
pub const DEFAULT_RELEASE_OFFSET: u64 = 53;

/// Trailing `_<first>(_<second>)?(_<third>)?`. The third number is captured
/// but plays no part in the decision.
const GENERATION_PATTERN: &str = r"^.*?_(?P<first>[0-9]+)(_(?P<second>[0-9]+))?(_(?P<third>[0-9]+))?$";

/// The numeric suffix of an identifier, as captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation<'a> {
    pub first: &'a str,
    pub second: Option<&'a str>,
    pub third: Option<&'a str>,
}

/// The compiled generation pattern, shared by every matcher.
fn generation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(GENERATION_PATTERN).expect("generation pattern is a valid regex")
    })
}

/// Decides whether an identifier belongs to a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseMatcher {
    offset: u64,
}

impl ReleaseMatcher {
    /// Build a matcher with the given secondary-number offset.
    pub const fn new(offset: u64) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Split the trailing numbers off `identifier`, if it has any.
    pub fn generation<'a>(&self, identifier: &'a str) -> Option<Generation<'a>> {
        let caps = generation_pattern().captures(identifier)?;
        Some(Generation {
            first: caps.name("first")?.as_str(),
            second: caps.name("second").map(|m| m.as_str()),
            third: caps.name("third").map(|m| m.as_str()),
        })
    }

    /// True if `identifier` belongs to `release`.
    ///
    /// An identifier without a numeric suffix never matches; that is a normal
    /// outcome, not an error.
    pub fn matches(&self, identifier: &str, release: &str) -> bool {
        let Some(generation) = self.generation(identifier) else {
            return false;
        };

        if generation.first == release {
            return true;
        }

        match generation.second {
            Some(second) if second == release => {
                match (generation.first.parse::<u64>(), second.parse::<u64>()) {
                    (Ok(first), Ok(second)) => second.checked_sub(first) == Some(self.offset),
                    // Numbers too large for u64 cannot satisfy a u64 offset.
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl Default for ReleaseMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_RELEASE_OFFSET)
    }
}
