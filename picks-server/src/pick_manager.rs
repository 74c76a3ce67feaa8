use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use picks_core::{check_pick_still_valid, classify, pick_result};
use picks_persistence::StoreError;
use picks_persistence::repositories::{FixtureRepository, PickOp, UserRepository};
use picks_types::{
    Edition, GameweekKey, PickAction, PickRejection, PickResult, PickVerdict, Picks,
    TeamPickStatus, TeamStatusKind, UserRecord,
};

use crate::deadline_service::DeadlineService;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{}", .0.message())]
    Rejected(PickRejection),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    fn user_not_found(user_id: &str) -> Self {
        EngineError::Rejected(PickRejection::UserNotFound {
            user_id: user_id.to_string(),
        })
    }

    pub fn rejection(&self) -> Option<&PickRejection> {
        match self {
            EngineError::Rejected(rejection) => Some(rejection),
            EngineError::Store(_) => None,
        }
    }
}

/// What a confirmed selection will do.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedAction {
    New,
    Change { from: String },
    ReleaseAndPick { from: GameweekKey },
}

/// A classified selection waiting on the player's yes/no. Nothing is
/// written until the plan is executed.
#[derive(Debug, Clone)]
pub struct SelectionPlan {
    pub user_id: String,
    pub edition: Edition,
    pub gameweek: GameweekKey,
    pub team: String,
    pub action: PlannedAction,
}

impl SelectionPlan {
    /// The confirmation question shown to the player.
    pub fn prompt(&self) -> String {
        match &self.action {
            PlannedAction::New => format!(
                "Would you like to pick {} for {}?",
                self.team,
                self.gameweek.label()
            ),
            PlannedAction::Change { from } => format!(
                "You currently have {} selected for {}. Would you like to change your pick to {}?",
                from,
                self.gameweek.label(),
                self.team
            ),
            PlannedAction::ReleaseAndPick { from } => format!(
                "You have picked {} for {}. Would you like to release this pick and select {} for {}?",
                self.team,
                from.label(),
                self.team,
                self.gameweek.label()
            ),
        }
    }
}

/// The pick mutation engine. Classification is read-only; mutations are
/// two-phase (prepare, confirm, execute), serialized per user, and
/// re-validated against a fresh document before any write.
pub struct PickManager {
    users: Arc<UserRepository>,
    fixtures: Arc<FixtureRepository>,
    deadlines: Arc<DeadlineService>,
    mutation_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PickManager {
    pub fn new(
        users: Arc<UserRepository>,
        fixtures: Arc<FixtureRepository>,
        deadlines: Arc<DeadlineService>,
    ) -> Self {
        Self {
            users,
            fixtures,
            deadlines,
            mutation_locks: DashMap::new(),
        }
    }

    /// Classify one team for the round a user is viewing. A missing user
    /// document classifies against an empty pick map.
    pub async fn team_status(
        &self,
        team: &str,
        gameweek: GameweekKey,
        edition: &Edition,
        user_id: &str,
    ) -> Result<TeamPickStatus, EngineError> {
        let picks = self
            .users
            .find_by_id(user_id)
            .await?
            .map(|user| user.picks)
            .unwrap_or_default();
        self.classify_against(team, gameweek, edition, &picks).await
    }

    /// Classification of every team appearing in the round's fixtures.
    pub async fn board(
        &self,
        gameweek: GameweekKey,
        edition: &Edition,
        user_id: &str,
    ) -> Result<BTreeMap<String, TeamPickStatus>, EngineError> {
        let fixtures = self.fixtures.get_fixtures(edition, gameweek).await?;
        let picks = self
            .users
            .find_by_id(user_id)
            .await?
            .map(|user| user.picks)
            .unwrap_or_default();
        let viewed_state = self.deadlines.state_for(gameweek, edition).await?;
        let passed = self.passed_deadlines(&picks, edition).await?;

        let mut teams = BTreeSet::new();
        for fixture in &fixtures {
            teams.insert(fixture.home_team.clone());
            teams.insert(fixture.away_team.clone());
        }

        Ok(teams
            .into_iter()
            .map(|team| {
                let status = classify(&team, gameweek, &picks, viewed_state, &passed);
                (team, status)
            })
            .collect())
    }

    /// Phase one of a selection: classify and build the plan the player
    /// must confirm. Locked and unavailable teams are rejected here, with
    /// no write ever issued.
    pub async fn prepare_selection(
        &self,
        team: &str,
        gameweek: GameweekKey,
        edition: &Edition,
        user_id: &str,
    ) -> Result<SelectionPlan, EngineError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| EngineError::user_not_found(user_id))?;

        let status = self
            .classify_against(team, gameweek, edition, &user.picks)
            .await?;
        let action = Self::plan_action(&status, team, gameweek, &user.picks)?;

        Ok(SelectionPlan {
            user_id: user_id.to_string(),
            edition: edition.clone(),
            gameweek,
            team: team.to_string(),
            action,
        })
    }

    /// Phase two: the player said yes. The user document is re-read and
    /// re-classified under the per-user mutation lock; if the plan no
    /// longer matches reality the whole thing is rejected as stale.
    pub async fn execute(&self, plan: &SelectionPlan) -> Result<UserRecord, EngineError> {
        let lock = self.mutation_lock(&plan.user_id);
        let _guard = lock.lock().await;

        let user = self
            .users
            .find_by_id(&plan.user_id)
            .await?
            .ok_or_else(|| EngineError::user_not_found(&plan.user_id))?;

        let status = self
            .classify_against(&plan.team, plan.gameweek, &plan.edition, &user.picks)
            .await?;
        let fresh_action = Self::plan_action(&status, &plan.team, plan.gameweek, &user.picks)?;
        if fresh_action != plan.action {
            return Err(EngineError::Rejected(PickRejection::SelectionStale));
        }

        // A team never occupies two rounds: vacate its previous slot in
        // the same atomic update that writes the new one.
        let mut ops = Vec::new();
        if let Some(previous) = user.picks.gameweek_for_team(&plan.team) {
            if previous != plan.gameweek {
                ops.push(PickOp::Clear(previous));
            }
        }
        ops.push(PickOp::Set(plan.gameweek, plan.team.clone()));
        self.users.apply_pick_ops(&plan.user_id, ops).await?;

        info!(
            user = %plan.user_id,
            team = %plan.team,
            gameweek = %plan.gameweek,
            "pick saved"
        );

        // The persisted document is the source of truth; re-read it
        // rather than patching the in-memory copy.
        self.users
            .find_by_id(&plan.user_id)
            .await?
            .ok_or_else(|| EngineError::user_not_found(&plan.user_id))
    }

    /// The user's pick for a round, judged against its results.
    pub async fn pick_validity(
        &self,
        user_id: &str,
        gameweek: GameweekKey,
        edition: &Edition,
    ) -> Result<(PickVerdict, PickResult), EngineError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| EngineError::user_not_found(user_id))?;

        let Some(team) = user.picks.get(&gameweek) else {
            // nothing staked, nothing at risk
            return Ok((PickVerdict::valid(), PickResult::Pending));
        };
        let team = team.to_string();

        let fixtures = self.fixtures.get_fixtures(edition, gameweek).await?;
        Ok((
            check_pick_still_valid(&team, &fixtures),
            pick_result(&team, &fixtures),
        ))
    }

    /// The edition a request should run against: an explicit choice wins,
    /// otherwise the user's own registration resolves it.
    pub async fn resolve_edition(
        &self,
        user_id: &str,
        requested: Option<Edition>,
    ) -> Result<Edition, EngineError> {
        if let Some(edition) = requested {
            return Ok(edition);
        }
        let user = self.users.find_by_id(user_id).await?;
        Ok(user.map(|u| u.edition()).unwrap_or_default())
    }

    async fn classify_against(
        &self,
        team: &str,
        gameweek: GameweekKey,
        edition: &Edition,
        picks: &Picks,
    ) -> Result<TeamPickStatus, EngineError> {
        let viewed_state = self.deadlines.state_for(gameweek, edition).await?;
        let passed = self.passed_deadlines(picks, edition).await?;
        Ok(classify(team, gameweek, picks, viewed_state, &passed))
    }

    /// Which of the user's picked rounds have locked. Deadline lookups go
    /// through the service cache, so this stays cheap per classification.
    async fn passed_deadlines(
        &self,
        picks: &Picks,
        edition: &Edition,
    ) -> Result<HashSet<GameweekKey>, EngineError> {
        let mut passed = HashSet::new();
        for (week, _) in picks.iter() {
            if self.deadlines.is_deadline_passed(*week, edition).await? {
                passed.insert(*week);
            }
        }
        Ok(passed)
    }

    fn plan_action(
        status: &TeamPickStatus,
        team: &str,
        gameweek: GameweekKey,
        picks: &Picks,
    ) -> Result<PlannedAction, EngineError> {
        match status.action {
            PickAction::Pick => Ok(PlannedAction::New),
            PickAction::Change => Ok(PlannedAction::Change {
                from: picks.get(&gameweek).unwrap_or_default().to_string(),
            }),
            PickAction::ReleaseAndPick => {
                let from = picks
                    .gameweek_for_team(team)
                    .ok_or(EngineError::Rejected(PickRejection::SelectionStale))?;
                Ok(PlannedAction::ReleaseAndPick { from })
            }
            PickAction::Locked => {
                if status.status == TeamStatusKind::CurrentPick {
                    Err(EngineError::Rejected(PickRejection::DeadlinePassed {
                        gameweek,
                    }))
                } else {
                    let locked_week = picks.gameweek_for_team(team).unwrap_or(gameweek);
                    Err(EngineError::Rejected(PickRejection::TeamLocked {
                        team: team.to_string(),
                        gameweek: locked_week,
                    }))
                }
            }
            PickAction::Unavailable => Err(EngineError::Rejected(
                PickRejection::GameweekStarted { gameweek },
            )),
        }
    }

    fn mutation_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.mutation_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
