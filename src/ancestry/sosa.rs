use std::fmt;

use serde::{Deserialize, Serialize};

/// Position in an ancestor tree: the subject is 1, the father of `n` is `2n`
/// and the mother of `n` is `2n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct AncestorNumber(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidAncestorNumber(pub i64);

impl fmt::Display for InvalidAncestorNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ancestor number must be positive, got {}", self.0)
    }
}

impl std::error::Error for InvalidAncestorNumber {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl AncestorNumber {
    pub const SUBJECT: Self = Self(1);

    pub const fn new(value: u64) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Depth in the tree: 0 for the subject, 1 for parents, 2 for grandparents.
    pub const fn generation(self) -> u32 {
        self.0.ilog2()
    }

    /// The child through whom this ancestor descends to the subject.
    pub const fn descendant(self) -> Option<Self> {
        if self.0 == 1 { None } else { Some(Self(self.0 / 2)) }
    }

    pub fn father(self) -> Option<Self> {
        self.0.checked_mul(2).map(Self)
    }

    pub fn mother(self) -> Option<Self> {
        self.0.checked_mul(2).and_then(|n| n.checked_add(1)).map(Self)
    }

    pub const fn sex(self) -> Sex {
        if self.0 == 1 {
            Sex::Unknown
        } else if self.0 % 2 == 0 {
            Sex::Male
        } else {
            Sex::Female
        }
    }

    /// Whether the first step from the subject goes through the father.
    /// `None` for the subject.
    pub const fn is_paternal_side(self) -> Option<bool> {
        let depth = self.generation();
        if depth == 0 {
            return None;
        }
        Some((self.0 >> (depth - 1)) & 1 == 0)
    }

    /// English label for this ancestor relative to the subject.
    pub fn relationship(self) -> String {
        let depth = self.generation();
        let male = matches!(self.sex(), Sex::Male);
        let parent = if male { "father" } else { "mother" };
        let side = match self.is_paternal_side() {
            Some(true) => "paternal",
            Some(false) => "maternal",
            None => return "self".to_string(),
        };

        match depth {
            1 => parent.to_string(),
            2 => format!("{side} grand{parent}"),
            3 => format!("{side} great-grand{parent}"),
            4 => format!("{side} great-great-grand{parent}"),
            _ => format!("{side} {} great-grand{parent}", ordinal(depth - 2)),
        }
    }
}

fn ordinal(value: u32) -> String {
    let suffix = match (value % 10, value % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{value}{suffix}")
}

impl fmt::Display for AncestorNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for AncestorNumber {
    type Error = InvalidAncestorNumber;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(InvalidAncestorNumber(value))
    }
}

impl From<AncestorNumber> for u64 {
    fn from(value: AncestorNumber) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::{AncestorNumber, InvalidAncestorNumber, Sex};

    fn n(value: u64) -> AncestorNumber {
        AncestorNumber::new(value).expect("positive")
    }

    #[test]
    fn generation_is_floor_log2() {
        assert_eq!(n(1).generation(), 0);
        assert_eq!(n(2).generation(), 1);
        assert_eq!(n(3).generation(), 1);
        assert_eq!(n(4).generation(), 2);
        assert_eq!(n(7).generation(), 2);
        assert_eq!(n(8).generation(), 3);
        assert_eq!(n(1023).generation(), 9);
        assert_eq!(n(1024).generation(), 10);
    }

    #[test]
    fn descendant_halves_and_subject_has_none() {
        assert_eq!(AncestorNumber::SUBJECT.descendant(), None);
        assert_eq!(n(2).descendant(), Some(n(1)));
        assert_eq!(n(3).descendant(), Some(n(1)));
        assert_eq!(n(13).descendant(), Some(n(6)));
    }

    #[test]
    fn parents_follow_doubling_scheme() {
        assert_eq!(n(5).father(), Some(n(10)));
        assert_eq!(n(5).mother(), Some(n(11)));
        assert_eq!(n(u64::MAX).father(), None);
        assert_eq!(n(5).father().and_then(AncestorNumber::descendant), Some(n(5)));
    }

    #[test]
    fn rejects_non_positive_numbers() {
        assert_eq!(AncestorNumber::new(0), None);
        assert_eq!(AncestorNumber::try_from(0), Err(InvalidAncestorNumber(0)));
        assert_eq!(AncestorNumber::try_from(-4), Err(InvalidAncestorNumber(-4)));
        assert_eq!(AncestorNumber::try_from(6), Ok(n(6)));
    }

    #[test]
    fn deserializes_from_integers_and_rejects_zero() {
        let parsed: AncestorNumber = serde_json::from_str("12").expect("parse");
        assert_eq!(parsed, n(12));
        assert!(serde_json::from_str::<AncestorNumber>("0").is_err());
        assert!(serde_json::from_str::<AncestorNumber>("-3").is_err());
        assert_eq!(serde_json::to_string(&n(12)).expect("serialize"), "12");
    }

    #[test]
    fn sex_and_side_come_from_bits() {
        assert_eq!(n(1).sex(), Sex::Unknown);
        assert_eq!(n(6).sex(), Sex::Male);
        assert_eq!(n(7).sex(), Sex::Female);
        assert_eq!(n(1).is_paternal_side(), None);
        assert_eq!(n(2).is_paternal_side(), Some(true));
        assert_eq!(n(5).is_paternal_side(), Some(true));
        assert_eq!(n(6).is_paternal_side(), Some(false));
        assert_eq!(n(15).is_paternal_side(), Some(false));
    }

    #[test]
    fn relationship_labels() {
        assert_eq!(n(1).relationship(), "self");
        assert_eq!(n(2).relationship(), "father");
        assert_eq!(n(3).relationship(), "mother");
        assert_eq!(n(5).relationship(), "paternal grandmother");
        assert_eq!(n(6).relationship(), "maternal grandfather");
        assert_eq!(n(8).relationship(), "paternal great-grandfather");
        assert_eq!(n(31).relationship(), "maternal great-great-grandmother");
        assert_eq!(n(32).relationship(), "paternal 3rd great-grandfather");
        assert_eq!(n(8192).relationship(), "paternal 11th great-grandfather");
        assert_eq!(n(16384).relationship(), "paternal 12th great-grandfather");
    }
}
