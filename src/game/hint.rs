//! Letter Hints
//!
//! Per-position outcome of scoring a guess.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hint for a single letter of a guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum LetterHint {
    /// Not scored.
    #[default]
    Blank = 0,
    /// Correct letter, correct position.
    Green = 1,
    /// Correct letter, wrong position.
    Yellow = 2,
    /// Letter absent, or all its occurrences already claimed.
    Grey = 3,
    /// Reserved for renderers that mark invalid words. Never produced by scoring.
    Red = 4,
}

/// Name table shared by `Display` and `FromStr`.
const HINT_NAMES: [(LetterHint, &str); 5] = [
    (LetterHint::Blank, "Blank"),
    (LetterHint::Green, "Green"),
    (LetterHint::Yellow, "Yellow"),
    (LetterHint::Grey, "Grey"),
    (LetterHint::Red, "Red"),
];

impl LetterHint {
    /// Wire name of this hint.
    pub fn as_str(self) -> &'static str {
        HINT_NAMES[self as usize].1
    }

    /// Does this hint count against the letter's budget in the secret.
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, LetterHint::Green | LetterHint::Yellow)
    }
}

impl fmt::Display for LetterHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown hint name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown letter hint: {0}")]
pub struct UnknownHint(pub String);

impl FromStr for LetterHint {
    type Err = UnknownHint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HINT_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(hint, _)| *hint)
            .ok_or_else(|| UnknownHint(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_table_order() {
        for (hint, name) in HINT_NAMES {
            assert_eq!(hint.as_str(), name);
            assert_eq!(name.parse::<LetterHint>().unwrap(), hint);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!("Purple".parse::<LetterHint>().is_err());
        assert!("".parse::<LetterHint>().is_err());
    }

    #[test]
    fn test_json_uses_names() {
        let json = serde_json::to_string(&vec![LetterHint::Green, LetterHint::Grey]).unwrap();
        assert_eq!(json, r#"["Green","Grey"]"#);

        let parsed: LetterHint = serde_json::from_str(r#""Yellow""#).unwrap();
        assert_eq!(parsed, LetterHint::Yellow);
    }

    #[test]
    fn test_default_is_blank() {
        assert_eq!(LetterHint::default(), LetterHint::Blank);
        assert!(!LetterHint::Blank.is_match());
        assert!(LetterHint::Yellow.is_match());
    }
}
