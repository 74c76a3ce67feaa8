use std::collections::HashSet;

use picks_types::{
    GameweekKey, GameweekState, PickAction, Picks, TeamPickStatus, TeamStatusKind,
};

/// Teams whose pick sits in a round with a passed deadline. These are
/// untouchable regardless of which round is being viewed.
pub fn locked_teams<'a>(picks: &'a Picks, passed_deadlines: &HashSet<GameweekKey>) -> Vec<&'a str> {
    picks
        .iter()
        .filter(|(week, _)| passed_deadlines.contains(week))
        .map(|(_, team)| team.as_str())
        .collect()
}

/// Teams banked for a round after the one being viewed. Key order puts the
/// tiebreak after every numbered week, so a tiebreak pick counts as saved
/// from any numbered round.
pub fn saved_teams<'a>(picks: &'a Picks, viewed: GameweekKey) -> Vec<&'a str> {
    picks
        .iter()
        .filter(|(week, _)| **week > viewed)
        .map(|(_, team)| team.as_str())
        .collect()
}

/// Classify one team for the round being viewed.
///
/// Priority order: current pick, then locked, then saved, then available.
/// A passed deadline is an irreversible constraint while a save is only a
/// provisional commitment, so the locked check outranks saved.
pub fn classify(
    team: &str,
    viewed: GameweekKey,
    picks: &Picks,
    viewed_state: GameweekState,
    passed_deadlines: &HashSet<GameweekKey>,
) -> TeamPickStatus {
    if picks.get(&viewed) == Some(team) {
        let can_change = viewed_state == GameweekState::NotStarted;
        return TeamPickStatus {
            status: TeamStatusKind::CurrentPick,
            clickable: can_change,
            tooltip: if can_change {
                "Current pick - click to change".to_string()
            } else {
                "Current pick for this gameweek (locked)".to_string()
            },
            action: if can_change {
                PickAction::Change
            } else {
                PickAction::Locked
            },
            saved_gameweek: None,
        };
    }

    if let Some(week) = picks.gameweek_for_team(team) {
        if passed_deadlines.contains(&week) {
            return TeamPickStatus {
                status: TeamStatusKind::LockedPick,
                clickable: false,
                tooltip: format!("Team locked - picked for {} (deadline passed)", week.label()),
                action: PickAction::Locked,
                saved_gameweek: None,
            };
        }
        if week > viewed {
            return TeamPickStatus {
                status: TeamStatusKind::SavedPick,
                clickable: true,
                tooltip: format!(
                    "Picked for {} - click to release and pick for {}",
                    week.label(),
                    viewed.label()
                ),
                action: PickAction::ReleaseAndPick,
                saved_gameweek: Some(week),
            };
        }
    }

    let can_pick = viewed_state == GameweekState::NotStarted;
    TeamPickStatus {
        status: TeamStatusKind::Available,
        clickable: can_pick,
        tooltip: if can_pick {
            "Click to pick this team".to_string()
        } else {
            "Gameweek has started - cannot pick".to_string()
        },
        action: if can_pick {
            PickAction::Pick
        } else {
            PickAction::Unavailable
        },
        saved_gameweek: None,
    }
}
