use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use picks_types::{GameweekKey, UserRecord};

use crate::store::{DocumentStore, FieldUpdate, StoreError};

pub const USERS_COLLECTION: &str = "users";

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(10);

/// A single change to a user's pick map.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOp {
    Set(GameweekKey, String),
    Clear(GameweekKey),
}

impl PickOp {
    fn into_field(self) -> (String, FieldUpdate) {
        match self {
            PickOp::Set(week, team) => (week.field_path(), FieldUpdate::Set(Value::String(team))),
            PickOp::Clear(week) => (week.field_path(), FieldUpdate::Delete),
        }
    }
}

pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
    op_timeout: Duration,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_timeout(store, DEFAULT_OP_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn DocumentStore>, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let doc = self
            .timed(self.store.get(USERS_COLLECTION, user_id))
            .await?;
        match doc {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, user_id: &str, user: &UserRecord) -> Result<(), StoreError> {
        let data = serde_json::to_value(user)?;
        self.timed(self.store.set(USERS_COLLECTION, user_id, data))
            .await
    }

    /// Apply a group of pick changes as one atomic document update.
    pub async fn apply_pick_ops(
        &self,
        user_id: &str,
        ops: Vec<PickOp>,
    ) -> Result<(), StoreError> {
        let fields = ops.into_iter().map(PickOp::into_field).collect();
        self.timed(self.store.update(USERS_COLLECTION, user_id, fields))
            .await
    }

    async fn timed<T>(
        &self,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use picks_types::{Picks, UserStatus};

    fn repo_with_store() -> (Arc<MemoryStore>, UserRepository) {
        let store = Arc::new(MemoryStore::new());
        let repo = UserRepository::new(store.clone());
        (store, repo)
    }

    fn user_with_picks(entries: &[(GameweekKey, &str)]) -> UserRecord {
        let mut user = UserRecord::default();
        for (week, team) in entries {
            user.picks.set(*week, *team);
        }
        user
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let (_, repo) = repo_with_store();
        let user = user_with_picks(&[(GameweekKey::Week(1), "Arsenal")]);

        repo.create("u1", &user).await.unwrap();

        let found = repo.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(found.picks.get(&GameweekKey::Week(1)), Some("Arsenal"));
        assert_eq!(found.status, UserStatus::Active);

        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_and_clear_in_one_update() {
        let (_, repo) = repo_with_store();
        repo.create("u1", &user_with_picks(&[(GameweekKey::Week(5), "Chelsea")]))
            .await
            .unwrap();

        repo.apply_pick_ops(
            "u1",
            vec![
                PickOp::Clear(GameweekKey::Week(5)),
                PickOp::Set(GameweekKey::Week(3), "Chelsea".to_string()),
            ],
        )
        .await
        .unwrap();

        let found = repo.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(found.picks.get(&GameweekKey::Week(5)), None);
        assert_eq!(found.picks.get(&GameweekKey::Week(3)), Some("Chelsea"));

        let mut expected = Picks::new();
        expected.set(GameweekKey::Week(3), "Chelsea");
        assert_eq!(found.picks, expected);
    }

    #[tokio::test]
    async fn test_tiebreak_pick_field_path() {
        let (_, repo) = repo_with_store();
        repo.create("u1", &UserRecord::default()).await.unwrap();

        repo.apply_pick_ops(
            "u1",
            vec![PickOp::Set(GameweekKey::Tiebreak, "Spurs".to_string())],
        )
        .await
        .unwrap();

        let found = repo.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(found.picks.get(&GameweekKey::Tiebreak), Some("Spurs"));
    }

    #[tokio::test]
    async fn test_offline_surfaces_unavailable() {
        let (store, repo) = repo_with_store();
        store.set_offline(true);
        let err = repo.find_by_id("u1").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
