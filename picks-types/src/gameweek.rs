use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use ts_rs::TS;

/// Highest numbered round in a competition run.
pub const MAX_GAMEWEEK: u8 = 10;

/// A competition round: a numbered week or the tiebreak round that follows
/// them all. Serializes as its storage form ("gw3", "gwtiebreak").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameweekKey {
    Week(u8),
    Tiebreak,
}

impl GameweekKey {
    pub fn week(n: u8) -> Result<Self, InvalidGameweek> {
        if (1..=MAX_GAMEWEEK).contains(&n) {
            Ok(GameweekKey::Week(n))
        } else {
            Err(InvalidGameweek(n.to_string()))
        }
    }

    /// All rounds in play order, numbered weeks then the tiebreak.
    pub fn all() -> impl Iterator<Item = GameweekKey> {
        (1..=MAX_GAMEWEEK)
            .map(GameweekKey::Week)
            .chain(std::iter::once(GameweekKey::Tiebreak))
    }

    /// Short form used in URLs and queries ("3", "tiebreak").
    pub fn short(&self) -> String {
        match self {
            GameweekKey::Week(n) => n.to_string(),
            GameweekKey::Tiebreak => "tiebreak".to_string(),
        }
    }

    /// Display label shown to players.
    pub fn label(&self) -> String {
        match self {
            GameweekKey::Week(n) => format!("Game Week {}", n),
            GameweekKey::Tiebreak => "Tiebreak".to_string(),
        }
    }

    /// Fixtures document id in the edition-scoped layout.
    pub fn doc_key(&self, edition: &Edition) -> String {
        format!("edition{}_{}", edition, self)
    }

    /// Fixtures document id in the pre-edition layout, kept for
    /// backward compatibility with existing data.
    pub fn legacy_doc_key(&self) -> String {
        self.to_string()
    }

    /// Dotted field path of this round's entry in a user's pick map.
    pub fn field_path(&self) -> String {
        format!("picks.{}", self)
    }
}

impl fmt::Display for GameweekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameweekKey::Week(n) => write!(f, "gw{}", n),
            GameweekKey::Tiebreak => write!(f, "gwtiebreak"),
        }
    }
}

impl Ord for GameweekKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GameweekKey::Week(a), GameweekKey::Week(b)) => a.cmp(b),
            (GameweekKey::Week(_), GameweekKey::Tiebreak) => Ordering::Less,
            (GameweekKey::Tiebreak, GameweekKey::Week(_)) => Ordering::Greater,
            (GameweekKey::Tiebreak, GameweekKey::Tiebreak) => Ordering::Equal,
        }
    }
}

impl PartialOrd for GameweekKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for GameweekKey {
    type Err = InvalidGameweek;

    /// Accepts both the short form ("3", "tiebreak") and the storage
    /// form ("gw3", "gwtiebreak").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix("gw").unwrap_or(trimmed);
        if bare.eq_ignore_ascii_case("tiebreak") {
            return Ok(GameweekKey::Tiebreak);
        }
        bare.parse::<u8>()
            .map_err(|_| InvalidGameweek(s.to_string()))
            .and_then(GameweekKey::week)
    }
}

impl Serialize for GameweekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GameweekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidGameweek(pub String);

impl fmt::Display for InvalidGameweek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid gameweek: {:?}", self.0)
    }
}

impl std::error::Error for InvalidGameweek {}

/// An independent run of the competition. Editions are opaque ids ("1",
/// "2", "test"); gameweeks are scoped within one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct Edition(pub String);

impl Edition {
    pub fn new(id: impl Into<String>) -> Self {
        Edition(id.into())
    }
}

impl Default for Edition {
    fn default() -> Self {
        Edition("1".to_string())
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
