use picks_types::{Fixture, InvalidReason, PickResult, PickVerdict};

/// Is a pick still alive against the round's fixtures?
///
/// The picked team's fixture is located by name (home or away). An
/// undecided match keeps the pick alive; a decided one requires an
/// outright win - a draw costs a life in a last-man-standing ruleset.
pub fn check_pick_still_valid(team: &str, fixtures: &[Fixture]) -> PickVerdict {
    let Some(fixture) = fixtures.iter().find(|f| f.involves(team)) else {
        return PickVerdict::invalid(InvalidReason::FixtureNotFound);
    };

    if !fixture.status.is_terminal() {
        // match undecided, no life lost yet
        return PickVerdict::valid();
    }

    match fixture.goals_for(team) {
        Some((ours, theirs)) if ours > theirs => PickVerdict::valid(),
        Some((ours, theirs)) if ours == theirs => PickVerdict::invalid(InvalidReason::Draw),
        _ => PickVerdict::invalid(InvalidReason::Lost),
    }
}

/// Outcome badge for a pick: decided fixtures report won/lost/draw,
/// everything else is pending.
pub fn pick_result(team: &str, fixtures: &[Fixture]) -> PickResult {
    let Some(fixture) = fixtures.iter().find(|f| f.involves(team)) else {
        return PickResult::Pending;
    };
    if !fixture.status.is_terminal() {
        return PickResult::Pending;
    }
    match fixture.goals_for(team) {
        Some((ours, theirs)) if ours > theirs => PickResult::Won,
        Some((ours, theirs)) if ours == theirs => PickResult::Draw,
        _ => PickResult::Lost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picks_types::{FixtureStatus, ScoreValue};

    fn decided(home: &str, away: &str, home_goals: i64, away_goals: i64) -> Fixture {
        Fixture {
            home_team: home.to_string(),
            away_team: away.to_string(),
            date: "2025-08-09".to_string(),
            kick_off_time: None,
            status: FixtureStatus::FullTime,
            home_score: Some(ScoreValue::Number(home_goals)),
            away_score: Some(ScoreValue::Number(away_goals)),
        }
    }

    fn in_play(home: &str, away: &str) -> Fixture {
        Fixture {
            home_team: home.to_string(),
            away_team: away.to_string(),
            date: "2025-08-09".to_string(),
            kick_off_time: None,
            status: FixtureStatus::KickedOff,
            home_score: None,
            away_score: None,
        }
    }

    #[test]
    fn test_win_keeps_pick_alive() {
        let fixtures = vec![decided("Arsenal", "Chelsea", 2, 0)];
        assert_eq!(check_pick_still_valid("Arsenal", &fixtures), PickVerdict::valid());
        assert_eq!(pick_result("Arsenal", &fixtures), PickResult::Won);
    }

    #[test]
    fn test_loss_costs_the_pick() {
        let fixtures = vec![decided("Arsenal", "Chelsea", 0, 1)];
        let verdict = check_pick_still_valid("Arsenal", &fixtures);
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, Some(InvalidReason::Lost));
        assert_eq!(pick_result("Arsenal", &fixtures), PickResult::Lost);
    }

    #[test]
    fn test_draw_is_not_good_enough() {
        // only outright wins survive
        let fixtures = vec![decided("Arsenal", "Chelsea", 2, 2)];
        let verdict = check_pick_still_valid("Arsenal", &fixtures);
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, Some(InvalidReason::Draw));
        assert_eq!(pick_result("Arsenal", &fixtures), PickResult::Draw);
    }

    #[test]
    fn test_undecided_match_gets_benefit_of_the_doubt() {
        let fixtures = vec![in_play("Arsenal", "Chelsea")];
        assert_eq!(check_pick_still_valid("Arsenal", &fixtures), PickVerdict::valid());
        assert_eq!(pick_result("Arsenal", &fixtures), PickResult::Pending);
    }

    #[test]
    fn test_missing_fixture_invalidates() {
        let fixtures = vec![decided("Liverpool", "Everton", 1, 0)];
        let verdict = check_pick_still_valid("Arsenal", &fixtures);
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, Some(InvalidReason::FixtureNotFound));
        assert_eq!(pick_result("Arsenal", &fixtures), PickResult::Pending);
    }

    #[test]
    fn test_away_side_scores_compared_correctly() {
        let fixtures = vec![decided("Arsenal", "Chelsea", 1, 3)];
        assert_eq!(check_pick_still_valid("Chelsea", &fixtures), PickVerdict::valid());
        assert_eq!(pick_result("Chelsea", &fixtures), PickResult::Won);
    }

    #[test]
    fn test_string_scores_coerced() {
        let mut fixture = decided("Arsenal", "Chelsea", 0, 0);
        fixture.home_score = Some(ScoreValue::Text("2".to_string()));
        fixture.away_score = Some(ScoreValue::Text("1".to_string()));
        assert_eq!(check_pick_still_valid("Arsenal", &[fixture]), PickVerdict::valid());
    }

    #[test]
    fn test_missing_scores_default_to_zero() {
        let mut fixture = decided("Arsenal", "Chelsea", 0, 0);
        fixture.home_score = None;
        fixture.away_score = None;
        // 0-0 on defaults reads as a draw
        let verdict = check_pick_still_valid("Arsenal", &[fixture]);
        assert_eq!(verdict.reason, Some(InvalidReason::Draw));
    }
}
