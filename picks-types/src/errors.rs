use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::gameweek::GameweekKey;

/// A pick request the engine refused. These are shown to the player, so
/// every variant renders a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PickRejection {
    DeadlinePassed {
        #[ts(type = "string")]
        gameweek: GameweekKey,
    },
    GameweekStarted {
        #[ts(type = "string")]
        gameweek: GameweekKey,
    },
    TeamLocked {
        team: String,
        #[ts(type = "string")]
        gameweek: GameweekKey,
    },
    UserNotFound {
        user_id: String,
    },
    SelectionStale,
    StoreUnavailable,
}

impl PickRejection {
    pub fn message(&self) -> String {
        match self {
            PickRejection::DeadlinePassed { .. } => {
                "This pick cannot be changed - the gameweek deadline has passed.".to_string()
            }
            PickRejection::GameweekStarted { .. } => {
                "Picks are not available for this gameweek - it has already started.".to_string()
            }
            PickRejection::TeamLocked { team, gameweek } => {
                format!(
                    "{} is locked - picked for {} (deadline passed)",
                    team,
                    gameweek.label()
                )
            }
            PickRejection::UserNotFound { .. } => {
                "User data not found. Please refresh the page.".to_string()
            }
            PickRejection::SelectionStale => {
                "Your picks changed while confirming. Please try again.".to_string()
            }
            PickRejection::StoreUnavailable => {
                "Error processing pick. Please try again.".to_string()
            }
        }
    }
}
