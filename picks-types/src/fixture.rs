use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A score as it arrives from the fixtures feed. Some sources send numbers,
/// others send numeric strings, so both are accepted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(i64),
    Text(String),
}

impl ScoreValue {
    /// Coerce to a goal count; non-numeric text counts as 0.
    pub fn as_goals(&self) -> i64 {
        match self {
            ScoreValue::Number(n) => *n,
            ScoreValue::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

/// Missing scores are treated as 0 when a comparison is forced.
pub fn goals_or_zero(score: &Option<ScoreValue>) -> i64 {
    score.as_ref().map(ScoreValue::as_goals).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum FixtureStatus {
    #[serde(alias = "NS")]
    NotStarted,
    #[serde(alias = "KO", alias = "1H", alias = "2H")]
    KickedOff,
    #[serde(alias = "HT")]
    HalfTime,
    #[serde(alias = "FT")]
    FullTime,
    #[serde(alias = "PP")]
    Postponed,
    #[serde(alias = "AET", alias = "PEN")]
    Completed,
}

impl FixtureStatus {
    /// Terminal statuses have a final result and can cost a life.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FixtureStatus::FullTime | FixtureStatus::Completed)
    }

    pub fn is_in_play(&self) -> bool {
        matches!(self, FixtureStatus::KickedOff | FixtureStatus::HalfTime)
    }
}

impl Default for FixtureStatus {
    fn default() -> Self {
        FixtureStatus::NotStarted
    }
}

/// One scheduled match. Identity within a gameweek is the (home, away) pair;
/// the feed guarantees no numeric id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub home_team: String,
    pub away_team: String,
    /// Calendar date; may already embed a kickoff time.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kick_off_time: Option<String>,
    #[serde(default)]
    pub status: FixtureStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score: Option<ScoreValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score: Option<ScoreValue>,
}

impl Fixture {
    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Goals scored (team, opponent), from the team's point of view.
    /// Returns None if the team is not part of this fixture.
    pub fn goals_for(&self, team: &str) -> Option<(i64, i64)> {
        if self.home_team == team {
            Some((goals_or_zero(&self.home_score), goals_or_zero(&self.away_score)))
        } else if self.away_team == team {
            Some((goals_or_zero(&self.away_score), goals_or_zero(&self.home_score)))
        } else {
            None
        }
    }
}
