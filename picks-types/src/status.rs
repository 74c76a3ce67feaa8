use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::gameweek::GameweekKey;

/// Where a round stands relative to the wall clock and its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum GameweekState {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum TeamStatusKind {
    Available,
    CurrentPick,
    LockedPick,
    SavedPick,
}

/// What clicking a team would do in the round being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum PickAction {
    Pick,
    Change,
    ReleaseAndPick,
    Locked,
    Unavailable,
}

/// Full classification of one team for one viewed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TeamPickStatus {
    pub status: TeamStatusKind,
    pub clickable: bool,
    pub tooltip: String,
    pub action: PickAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub saved_gameweek: Option<GameweekKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidReason {
    FixtureNotFound,
    Lost,
    Draw,
}

/// Whether a pick is still alive against the round's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PickVerdict {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidReason>,
}

impl PickVerdict {
    pub fn valid() -> Self {
        PickVerdict {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: InvalidReason) -> Self {
        PickVerdict {
            valid: false,
            reason: Some(reason),
        }
    }
}

/// Outcome badge for a pick once its fixture is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PickResult {
    Won,
    Lost,
    Draw,
    Pending,
}
