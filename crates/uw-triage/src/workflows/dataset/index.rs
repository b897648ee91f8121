use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical position of a property in the six-entry triage set.
///
/// Every other identifier form (letter label, 1-based property number, submission code) converts
/// to and from this index, so tables are joined on it rather than on list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PropertyIndex(u8);

impl PropertyIndex {
    pub const COUNT: usize = 6;

    const LETTERS: [char; Self::COUNT] = ['A', 'B', 'C', 'D', 'E', 'F'];

    const STATIC_CODES: [&'static str; Self::COUNT] = [
        "SUB-24001",
        "SUB-24002",
        "SUB-24003",
        "SUB-24004",
        "SUB-24005",
        "SUB-24006",
    ];

    pub fn new(position: usize) -> Option<Self> {
        (position < Self::COUNT).then_some(Self(position as u8))
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(|position| Self(position as u8))
    }

    pub const fn position(self) -> usize {
        self.0 as usize
    }

    pub const fn letter(self) -> char {
        Self::LETTERS[self.0 as usize]
    }

    pub fn from_letter(raw: &str) -> Option<Self> {
        let mut chars = raw.trim().chars();
        let letter = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() {
            return None;
        }
        Self::LETTERS
            .iter()
            .position(|candidate| *candidate == letter)
            .and_then(Self::new)
    }

    /// 1-based number stored in `process_results.property_id`.
    pub const fn property_id(self) -> i64 {
        self.0 as i64 + 1
    }

    pub fn from_property_id(property_id: i64) -> Option<Self> {
        property_id
            .checked_sub(1)
            .and_then(|position| usize::try_from(position).ok())
            .and_then(Self::new)
    }

    /// Submission code carried by the static catalog at this position.
    pub const fn static_code(self) -> &'static str {
        Self::STATIC_CODES[self.0 as usize]
    }

    pub fn from_static_code(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::STATIC_CODES
            .iter()
            .position(|code| code.eq_ignore_ascii_case(raw))
            .and_then(Self::new)
    }
}

impl fmt::Display for PropertyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl TryFrom<usize> for PropertyIndex {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("property index {value} out of range 0..6"))
    }
}

impl From<PropertyIndex> for usize {
    fn from(value: PropertyIndex) -> Self {
        value.position()
    }
}
