#![allow(dead_code)]

use chrono::{DateTime, NaiveDateTime, Utc};
use picks_types::{Fixture, FixtureStatus, GameweekKey, Picks, ScoreValue};

/// Parses "YYYY-MM-DDTHH:MM:SS" as a UTC instant.
pub fn instant(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .unwrap()
        .and_utc()
}

/// Creates an unstarted fixture kicking off at the given date/time string.
pub fn upcoming_fixture(home: &str, away: &str, date: &str) -> Fixture {
    Fixture {
        home_team: home.to_string(),
        away_team: away.to_string(),
        date: date.to_string(),
        kick_off_time: None,
        status: FixtureStatus::NotStarted,
        home_score: None,
        away_score: None,
    }
}

/// Creates a full-time fixture with the given score.
pub fn finished_fixture(home: &str, away: &str, home_goals: i64, away_goals: i64) -> Fixture {
    Fixture {
        home_team: home.to_string(),
        away_team: away.to_string(),
        date: "2025-08-09T15:00:00".to_string(),
        kick_off_time: None,
        status: FixtureStatus::FullTime,
        home_score: Some(ScoreValue::Number(home_goals)),
        away_score: Some(ScoreValue::Number(away_goals)),
    }
}

/// Creates a fixture that has kicked off but has no result yet.
pub fn live_fixture(home: &str, away: &str) -> Fixture {
    Fixture {
        home_team: home.to_string(),
        away_team: away.to_string(),
        date: "2025-08-09T15:00:00".to_string(),
        kick_off_time: None,
        status: FixtureStatus::KickedOff,
        home_score: None,
        away_score: None,
    }
}

/// Builds a pick map from (gameweek, team) pairs.
pub fn picks_of(entries: &[(GameweekKey, &str)]) -> Picks {
    entries
        .iter()
        .map(|(week, team)| (*week, team.to_string()))
        .collect()
}

pub fn gw(n: u8) -> GameweekKey {
    GameweekKey::Week(n)
}
