use chrono::{DateTime, Utc};

use picks_types::{Fixture, GameweekState};

use crate::kickoff::effective_kickoff;

/// The deadline for a round is the earliest kickoff among its fixtures:
/// once any match could plausibly start, all picking for the round freezes.
/// An empty (or wholly unparseable) fixture list has no deadline.
pub fn earliest_kickoff(fixtures: &[Fixture]) -> Option<DateTime<Utc>> {
    fixtures.iter().filter_map(effective_kickoff).min()
}

pub fn is_deadline_passed(fixtures: &[Fixture], now: DateTime<Utc>) -> bool {
    matches!(earliest_kickoff(fixtures), Some(deadline) if now >= deadline)
}

pub fn gameweek_state(fixtures: &[Fixture], now: DateTime<Utc>) -> GameweekState {
    gameweek_state_with_deadline(fixtures, earliest_kickoff(fixtures), now)
}

/// State computation with an externally supplied deadline, for callers that
/// resolve deadlines through an override table or cache.
pub fn gameweek_state_with_deadline(
    fixtures: &[Fixture],
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> GameweekState {
    if fixtures.is_empty() {
        return GameweekState::NotStarted;
    }
    match deadline {
        Some(deadline) if now >= deadline => {
            if fixtures.iter().all(|f| f.status.is_terminal()) {
                GameweekState::Completed
            } else {
                GameweekState::InProgress
            }
        }
        _ => GameweekState::NotStarted,
    }
}
