/// Letter keys of the library
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SidelineError;

/// One of the ten fixed top-level buckets
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[allow(missing_docs)]
pub enum Letter {
    #[default]
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
}

impl Letter {
    /// All letters in scan order
    pub const ALL: [Letter; 10] = [
        Letter::A,
        Letter::B,
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::H,
        Letter::I,
        Letter::J,
    ];

    /// Letter as a single-character string
    pub fn as_str(self) -> &'static str {
        match self {
            Letter::A => "A",
            Letter::B => "B",
            Letter::C => "C",
            Letter::D => "D",
            Letter::E => "E",
            Letter::F => "F",
            Letter::G => "G",
            Letter::H => "H",
            Letter::I => "I",
            Letter::J => "J",
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Letter {
    type Err = SidelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Letter::ALL
            .into_iter()
            .find(|letter| letter.as_str() == upper)
            .ok_or_else(|| SidelineError::invalid_input(format!("unknown letter '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("c".parse::<Letter>().unwrap(), Letter::C);
        assert_eq!(" J ".parse::<Letter>().unwrap(), Letter::J);
        assert!("K".parse::<Letter>().is_err());
    }

    #[test]
    fn all_is_sorted() {
        let mut sorted = Letter::ALL;
        sorted.sort();
        assert_eq!(sorted, Letter::ALL);
    }
}
