use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warp::Filter;
use warp::http::StatusCode;

use picks_persistence::StoreError;
use picks_persistence::repositories::FixtureRepository;
use picks_types::{
    Edition, Fixture, GameweekKey, GameweekState, PickAction, PickRejection, PickResult,
    PickVerdict,
};

use crate::deadline_service::DeadlineService;
use crate::pick_manager::{EngineError, PickManager, PlannedAction};

pub mod clock;
pub mod config;
pub mod deadline_service;
pub mod pick_manager;

#[derive(Deserialize)]
struct EditionQuery {
    edition: Option<Edition>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionRequest {
    team: String,
    gameweek: GameweekKey,
    #[serde(default)]
    edition: Option<Edition>,
    #[serde(default)]
    confirm: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationResponse {
    requires_confirmation: bool,
    prompt: String,
    action: PickAction,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeadlineResponse {
    deadline: Option<DateTime<Utc>>,
    relative: Option<String>,
    passed: bool,
    state: GameweekState,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidityResponse {
    verdict: PickVerdict,
    result: PickResult,
}

pub fn create_routes(
    manager: Arc<PickManager>,
    deadlines: Arc<DeadlineService>,
    fixtures: Arc<FixtureRepository>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let manager_filter = warp::any().map({
        let manager = manager.clone();
        move || manager.clone()
    });

    let deadlines_filter = warp::any().map({
        let deadlines = deadlines.clone();
        move || deadlines.clone()
    });

    let fixtures_filter = warp::any().map({
        let fixtures = fixtures.clone();
        move || fixtures.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Deadline for one round
    let deadline = warp::path!("gameweek" / GameweekKey / "deadline")
        .and(warp::get())
        .and(warp::query::<EditionQuery>())
        .and(deadlines_filter.clone())
        .and_then(handle_deadline_request);

    // Deadlines for every round of an edition
    let all_deadlines = warp::path!("gameweeks" / "deadlines")
        .and(warp::get())
        .and(warp::query::<EditionQuery>())
        .and(deadlines_filter.clone())
        .and_then(handle_all_deadlines_request);

    // Classification of one team for the round a user is viewing
    let team_status = warp::path!("user" / String / "gameweek" / GameweekKey / "team" / String / "status")
        .and(warp::get())
        .and(warp::query::<EditionQuery>())
        .and(manager_filter.clone())
        .and_then(handle_team_status_request);

    // Classification of the whole round
    let board = warp::path!("user" / String / "gameweek" / GameweekKey / "board")
        .and(warp::get())
        .and(warp::query::<EditionQuery>())
        .and(manager_filter.clone())
        .and_then(handle_board_request);

    // Two-phase selection: confirm=false answers with the prompt,
    // confirm=true performs the mutation
    let selection = warp::path!("user" / String / "picks")
        .and(warp::post())
        .and(warp::body::json::<SelectionRequest>())
        .and(manager_filter.clone())
        .and_then(handle_selection_request);

    // The user's pick for a round, judged against live results
    let validity = warp::path!("user" / String / "gameweek" / GameweekKey / "validity")
        .and(warp::get())
        .and(warp::query::<EditionQuery>())
        .and(manager_filter.clone())
        .and_then(handle_validity_request);

    // Admin fixture import; invalidates the round's cached deadline
    let fixture_import = warp::path!("admin" / "gameweek" / GameweekKey / "fixtures")
        .and(warp::put())
        .and(warp::query::<EditionQuery>())
        .and(warp::body::json::<Vec<Fixture>>())
        .and(fixtures_filter.clone())
        .and(deadlines_filter.clone())
        .and_then(handle_fixture_import_request);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "PUT"]);

    health
        .or(deadline)
        .or(all_deadlines)
        .or(team_status)
        .or(board)
        .or(selection)
        .or(validity)
        .or(fixture_import)
        .with(cors)
        .with(warp::log("picks_server"))
}

fn store_error_response(err: StoreError) -> warp::reply::WithStatus<warp::reply::Json> {
    tracing::error!("store failure: {}", err);
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": PickRejection::StoreUnavailable.message(),
            "retryable": err.is_retryable(),
        })),
        StatusCode::SERVICE_UNAVAILABLE,
    )
}

fn engine_error_response(err: EngineError) -> warp::reply::WithStatus<warp::reply::Json> {
    match err {
        EngineError::Rejected(rejection) => warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": rejection.message(),
                "rejection": rejection,
            })),
            StatusCode::CONFLICT,
        ),
        EngineError::Store(err) => store_error_response(err),
    }
}

async fn handle_deadline_request(
    gameweek: GameweekKey,
    query: EditionQuery,
    deadlines: Arc<DeadlineService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let edition = query.edition.unwrap_or_default();

    let deadline = match deadlines.deadline_for(gameweek, &edition).await {
        Ok(deadline) => deadline,
        Err(err) => return Ok(store_error_response(err)),
    };
    let passed = match deadlines.is_deadline_passed(gameweek, &edition).await {
        Ok(passed) => passed,
        Err(err) => return Ok(store_error_response(err)),
    };
    let state = match deadlines.state_for(gameweek, &edition).await {
        Ok(state) => state,
        Err(err) => return Ok(store_error_response(err)),
    };

    let response = DeadlineResponse {
        deadline,
        relative: deadline.map(|d| deadlines.format_relative(d)),
        passed,
        state,
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::OK,
    ))
}

async fn handle_all_deadlines_request(
    query: EditionQuery,
    deadlines: Arc<DeadlineService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let edition = query.edition.unwrap_or_default();
    match deadlines.all_deadlines(&edition).await {
        Ok(deadlines) => Ok(warp::reply::with_status(
            warp::reply::json(&deadlines),
            StatusCode::OK,
        )),
        Err(err) => Ok(store_error_response(err)),
    }
}

async fn handle_team_status_request(
    user_id: String,
    gameweek: GameweekKey,
    team: String,
    query: EditionQuery,
    manager: Arc<PickManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let edition = match manager.resolve_edition(&user_id, query.edition).await {
        Ok(edition) => edition,
        Err(err) => return Ok(engine_error_response(err)),
    };

    match manager.team_status(&team, gameweek, &edition, &user_id).await {
        Ok(status) => Ok(warp::reply::with_status(
            warp::reply::json(&status),
            StatusCode::OK,
        )),
        Err(err) => Ok(engine_error_response(err)),
    }
}

async fn handle_board_request(
    user_id: String,
    gameweek: GameweekKey,
    query: EditionQuery,
    manager: Arc<PickManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let edition = match manager.resolve_edition(&user_id, query.edition).await {
        Ok(edition) => edition,
        Err(err) => return Ok(engine_error_response(err)),
    };

    match manager.board(gameweek, &edition, &user_id).await {
        Ok(board) => Ok(warp::reply::with_status(
            warp::reply::json(&board),
            StatusCode::OK,
        )),
        Err(err) => Ok(engine_error_response(err)),
    }
}

async fn handle_selection_request(
    user_id: String,
    request: SelectionRequest,
    manager: Arc<PickManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let edition = match manager.resolve_edition(&user_id, request.edition).await {
        Ok(edition) => edition,
        Err(err) => return Ok(engine_error_response(err)),
    };

    let plan = match manager
        .prepare_selection(&request.team, request.gameweek, &edition, &user_id)
        .await
    {
        Ok(plan) => plan,
        Err(err) => return Ok(engine_error_response(err)),
    };

    if !request.confirm {
        let response = ConfirmationResponse {
            requires_confirmation: true,
            prompt: plan.prompt(),
            action: planned_action_label(&plan.action),
        };
        return Ok(warp::reply::with_status(
            warp::reply::json(&response),
            StatusCode::OK,
        ));
    }

    match manager.execute(&plan).await {
        Ok(user) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "user": user })),
            StatusCode::OK,
        )),
        Err(err) => Ok(engine_error_response(err)),
    }
}

async fn handle_validity_request(
    user_id: String,
    gameweek: GameweekKey,
    query: EditionQuery,
    manager: Arc<PickManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let edition = match manager.resolve_edition(&user_id, query.edition).await {
        Ok(edition) => edition,
        Err(err) => return Ok(engine_error_response(err)),
    };

    match manager.pick_validity(&user_id, gameweek, &edition).await {
        Ok((verdict, result)) => Ok(warp::reply::with_status(
            warp::reply::json(&ValidityResponse { verdict, result }),
            StatusCode::OK,
        )),
        Err(err) => Ok(engine_error_response(err)),
    }
}

async fn handle_fixture_import_request(
    gameweek: GameweekKey,
    query: EditionQuery,
    fixtures: Vec<Fixture>,
    repository: Arc<FixtureRepository>,
    deadlines: Arc<DeadlineService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let edition = query.edition.unwrap_or_default();

    match repository.set_fixtures(&edition, gameweek, &fixtures).await {
        Ok(()) => {
            // stale cached deadlines could wrongly permit or deny picks
            deadlines.invalidate(&edition, gameweek);
            tracing::info!(%gameweek, %edition, count = fixtures.len(), "fixtures imported");
            Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({ "imported": fixtures.len() })),
                StatusCode::OK,
            ))
        }
        Err(err) => Ok(store_error_response(err)),
    }
}

fn planned_action_label(action: &PlannedAction) -> PickAction {
    match action {
        PlannedAction::New => PickAction::Pick,
        PlannedAction::Change { .. } => PickAction::Change,
        PlannedAction::ReleaseAndPick { .. } => PickAction::ReleaseAndPick,
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::deadline_service::DeadlineOverrides;
    use chrono::NaiveDateTime;
    use picks_persistence::MemoryStore;
    use picks_persistence::repositories::UserRepository;
    use picks_types::{FixtureStatus, UserRecord};

    fn instant(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn upcoming(home: &str, away: &str, date: &str) -> Fixture {
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

    fn create_test_app(
        now: &str,
    ) -> (
        impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone,
        Arc<UserRepository>,
        Arc<FixtureRepository>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let users = Arc::new(UserRepository::new(store.clone()));
        let fixtures = Arc::new(FixtureRepository::new(store));
        let clock = Arc::new(FixedClock(instant(now)));
        let deadlines = Arc::new(DeadlineService::new(
            fixtures.clone(),
            DeadlineOverrides::empty(),
            clock,
        ));
        let manager = Arc::new(PickManager::new(
            users.clone(),
            fixtures.clone(),
            deadlines.clone(),
        ));

        let routes = create_routes(manager, deadlines, fixtures.clone());
        (routes, users, fixtures)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _, _) = create_test_app("2025-08-01T12:00:00");

        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), "OK");
    }

    #[tokio::test]
    async fn test_deadline_for_empty_round() {
        let (app, _, _) = create_test_app("2025-08-01T12:00:00");

        let response = warp::test::request()
            .method("GET")
            .path("/gameweek/4/deadline")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["deadline"], serde_json::Value::Null);
        assert_eq!(body["passed"], false);
        assert_eq!(body["state"], "not-started");
    }

    #[tokio::test]
    async fn test_invalid_gameweek_rejected() {
        let (app, _, _) = create_test_app("2025-08-01T12:00:00");

        let response = warp::test::request()
            .method("GET")
            .path("/gameweek/99/deadline")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_two_phase_pick_flow() {
        let (app, users, fixtures) = create_test_app("2025-08-01T12:00:00");
        users.create("u1", &UserRecord::default()).await.unwrap();
        fixtures
            .set_fixtures(
                &Edition::default(),
                GameweekKey::Week(2),
                &[upcoming("Athletic", "Rovers", "2025-09-01T15:00:00")],
            )
            .await
            .unwrap();

        // phase one: ask without confirming
        let response = warp::test::request()
            .method("POST")
            .path("/user/u1/picks")
            .json(&serde_json::json!({
                "team": "Athletic",
                "gameweek": "gw2",
                "confirm": false
            }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["requiresConfirmation"], true);
        assert_eq!(body["action"], "pick");
        assert_eq!(body["prompt"], "Would you like to pick Athletic for Game Week 2?");

        // no write happened yet
        let user = users.find_by_id("u1").await.unwrap().unwrap();
        assert!(user.picks.is_empty());

        // phase two: confirm
        let response = warp::test::request()
            .method("POST")
            .path("/user/u1/picks")
            .json(&serde_json::json!({
                "team": "Athletic",
                "gameweek": "gw2",
                "confirm": true
            }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["user"]["picks"]["gw2"], "Athletic");

        // the status endpoint now reports it as the current pick
        let response = warp::test::request()
            .method("GET")
            .path("/user/u1/gameweek/2/team/Athletic/status")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["status"], "current-pick");
        assert_eq!(body["action"], "change");
    }

    #[tokio::test]
    async fn test_locked_selection_conflicts() {
        let (app, users, fixtures) = create_test_app("2025-08-20T12:00:00");

        let mut user = UserRecord::default();
        user.picks.set(GameweekKey::Week(1), "Arsenal");
        users.create("u1", &user).await.unwrap();

        // round 1 kicked off long before "now"
        fixtures
            .set_fixtures(
                &Edition::default(),
                GameweekKey::Week(1),
                &[upcoming("Arsenal", "Chelsea", "2025-08-09T15:00:00")],
            )
            .await
            .unwrap();
        fixtures
            .set_fixtures(
                &Edition::default(),
                GameweekKey::Week(2),
                &[upcoming("Arsenal", "Liverpool", "2025-09-01T15:00:00")],
            )
            .await
            .unwrap();

        let response = warp::test::request()
            .method("POST")
            .path("/user/u1/picks")
            .json(&serde_json::json!({
                "team": "Arsenal",
                "gameweek": "gw2",
                "confirm": true
            }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 409);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(
            body["error"],
            "Arsenal is locked - picked for Game Week 1 (deadline passed)"
        );

        // nothing was written
        let user = users.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(user.picks.get(&GameweekKey::Week(2)), None);
    }

    #[tokio::test]
    async fn test_board_lists_every_team_in_round() {
        let (app, users, fixtures) = create_test_app("2025-08-01T12:00:00");
        users.create("u1", &UserRecord::default()).await.unwrap();
        fixtures
            .set_fixtures(
                &Edition::default(),
                GameweekKey::Week(2),
                &[
                    upcoming("Arsenal", "Chelsea", "2025-09-01T15:00:00"),
                    upcoming("Liverpool", "Everton", "2025-09-01T17:30:00"),
                ],
            )
            .await
            .unwrap();

        let response = warp::test::request()
            .method("GET")
            .path("/user/u1/gameweek/2/board")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        let board = body.as_object().unwrap();
        assert_eq!(board.len(), 4);
        assert_eq!(board["Arsenal"]["status"], "available");
        assert_eq!(board["Arsenal"]["clickable"], true);
    }

    #[tokio::test]
    async fn test_fixture_import_updates_deadline() {
        let (app, _, _) = create_test_app("2025-08-01T12:00:00");

        let response = warp::test::request()
            .method("PUT")
            .path("/admin/gameweek/3/fixtures?edition=1")
            .json(&serde_json::json!([
                {
                    "homeTeam": "Leeds",
                    "awayTeam": "Villa",
                    "date": "2025-08-23",
                    "kickOffTime": "12:30:00",
                    "status": "not-started"
                }
            ]))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["imported"], 1);

        let response = warp::test::request()
            .method("GET")
            .path("/gameweek/3/deadline?edition=1")
            .reply(&app)
            .await;
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        let deadline = body["deadline"].as_str().unwrap();
        assert!(deadline.starts_with("2025-08-23T12:30:00"));
        assert_eq!(body["passed"], false);
    }

    #[tokio::test]
    async fn test_validity_endpoint_reports_draw() {
        let (app, users, fixtures) = create_test_app("2025-08-10T12:00:00");

        let mut user = UserRecord::default();
        user.picks.set(GameweekKey::Week(1), "Arsenal");
        users.create("u1", &user).await.unwrap();

        let mut fixture = upcoming("Arsenal", "Chelsea", "2025-08-09T15:00:00");
        fixture.status = FixtureStatus::FullTime;
        fixture.home_score = Some(picks_types::ScoreValue::Number(2));
        fixture.away_score = Some(picks_types::ScoreValue::Number(2));
        fixtures
            .set_fixtures(&Edition::default(), GameweekKey::Week(1), &[fixture])
            .await
            .unwrap();

        let response = warp::test::request()
            .method("GET")
            .path("/user/u1/gameweek/1/validity")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["verdict"]["valid"], false);
        assert_eq!(body["verdict"]["reason"], "draw");
        assert_eq!(body["result"], "draw");
    }

    #[tokio::test]
    async fn test_invalid_routes() {
        let (app, _, _) = create_test_app("2025-08-01T12:00:00");

        let response = warp::test::request()
            .method("GET")
            .path("/invalid")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }
}
