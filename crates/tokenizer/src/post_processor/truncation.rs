//! Truncation parameters.

use serde::{Deserialize, Serialize};

/// Which end of a sequence loses tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationDirection {
    /// Drop head-most tokens
    Left,
    /// Drop tail-most tokens
    #[default]
    Right,
}

impl std::str::FromStr for TruncationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown truncation direction: {}", other)),
        }
    }
}

/// Truncation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationParams {
    /// Maximum length of the final encoding, boundary tokens included
    pub max_length: usize,
    #[serde(default)]
    pub direction: TruncationDirection,
}

impl TruncationParams {
    pub fn new(max_length: usize, direction: TruncationDirection) -> Self {
        Self {
            max_length,
            direction,
        }
    }
}

/// Split a content budget over a pair, longest first.
///
/// Tokens are removed one at a time from the longer sequence, the first
/// one on ties. Returns the kept lengths.
pub(crate) fn longest_first(first: usize, second: usize, budget: usize) -> (usize, usize) {
    if first + second <= budget {
        return (first, second);
    }

    let short = first.min(second);
    if short * 2 <= budget {
        // Only the longer sequence is cut.
        if first >= second {
            (budget - short, short)
        } else {
            (short, budget - short)
        }
    } else {
        // Both are cut down to half; ties cut the first, so an odd budget
        // leaves the extra token to the second.
        (budget / 2, budget - budget / 2)
    }
}
