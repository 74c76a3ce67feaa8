use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::gameweek::GameweekKey;

/// A user's pick map: one team name per gameweek key. The map itself
/// guarantees one team per round; the one-round-per-team direction is
/// enforced by the mutation engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Picks(BTreeMap<GameweekKey, String>);

impl Picks {
    pub fn new() -> Self {
        Picks(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, gameweek: &GameweekKey) -> Option<&str> {
        self.0.get(gameweek).map(String::as_str)
    }

    pub fn set(&mut self, gameweek: GameweekKey, team: impl Into<String>) {
        self.0.insert(gameweek, team.into());
    }

    pub fn clear_week(&mut self, gameweek: &GameweekKey) -> Option<String> {
        self.0.remove(gameweek)
    }

    /// Reverse scan: the round a team is currently assigned to, if any.
    /// The map is keyed by round, not team, so this is O(picks) — fine at
    /// a bounded 11 entries.
    pub fn gameweek_for_team(&self, team: &str) -> Option<GameweekKey> {
        self.0
            .iter()
            .find(|(_, picked)| picked.as_str() == team)
            .map(|(week, _)| *week)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GameweekKey, &String)> {
        self.0.iter()
    }
}

impl FromIterator<(GameweekKey, String)> for Picks {
    fn from_iter<I: IntoIterator<Item = (GameweekKey, String)>>(iter: I) -> Self {
        Picks(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_scan_finds_team() {
        let mut picks = Picks::new();
        picks.set(GameweekKey::Week(1), "Arsenal");
        picks.set(GameweekKey::Week(5), "Chelsea");
        picks.set(GameweekKey::Tiebreak, "Spurs");

        assert_eq!(picks.gameweek_for_team("Chelsea"), Some(GameweekKey::Week(5)));
        assert_eq!(picks.gameweek_for_team("Spurs"), Some(GameweekKey::Tiebreak));
        assert_eq!(picks.gameweek_for_team("Liverpool"), None);
    }

    #[test]
    fn test_serde_uses_storage_keys() {
        let mut picks = Picks::new();
        picks.set(GameweekKey::Week(2), "Arsenal");
        picks.set(GameweekKey::Tiebreak, "Chelsea");

        let json = serde_json::to_string(&picks).unwrap();
        assert_eq!(json, r#"{"gw2":"Arsenal","gwtiebreak":"Chelsea"}"#);

        let parsed: Picks = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, picks);
    }

    #[test]
    fn test_one_team_per_round() {
        let mut picks = Picks::new();
        picks.set(GameweekKey::Week(3), "Arsenal");
        picks.set(GameweekKey::Week(3), "Chelsea");
        assert_eq!(picks.len(), 1);
        assert_eq!(picks.get(&GameweekKey::Week(3)), Some("Chelsea"));
    }
}
