use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use picks_types::{Edition, Fixture, GameweekKey};

use crate::store::{DocumentStore, StoreError};

pub const FIXTURES_COLLECTION: &str = "fixtures";

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads and writes per-round fixture documents. Documents are keyed
/// `edition{e}_gw{k}`; data written before editions existed sits at the
/// bare `gw{k}` key and is still honored on reads.
pub struct FixtureRepository {
    store: Arc<dyn DocumentStore>,
    op_timeout: Duration,
}

impl FixtureRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_timeout(store, DEFAULT_OP_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn DocumentStore>, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    /// The round's fixtures, or an empty list when none have been loaded
    /// yet. Store failures are surfaced, not folded into "no fixtures".
    pub async fn get_fixtures(
        &self,
        edition: &Edition,
        gameweek: GameweekKey,
    ) -> Result<Vec<Fixture>, StoreError> {
        let mut doc = self.get_doc(&gameweek.doc_key(edition)).await?;
        if doc.is_none() {
            doc = self.get_doc(&gameweek.legacy_doc_key()).await?;
            if doc.is_some() {
                debug!(%gameweek, "using legacy fixtures document");
            }
        }

        let Some(doc) = doc else {
            return Ok(Vec::new());
        };
        let fixtures = doc
            .get("fixtures")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        Ok(serde_json::from_value(fixtures)?)
    }

    /// Replaces the round's fixture list. Callers own invalidating any
    /// deadline cache entries for the round.
    pub async fn set_fixtures(
        &self,
        edition: &Edition,
        gameweek: GameweekKey,
        fixtures: &[Fixture],
    ) -> Result<(), StoreError> {
        let data = json!({ "fixtures": fixtures });
        self.timed(
            self.store
                .set(FIXTURES_COLLECTION, &gameweek.doc_key(edition), data),
        )
        .await
    }

    async fn get_doc(&self, id: &str) -> Result<Option<Value>, StoreError> {
        self.timed(self.store.get(FIXTURES_COLLECTION, id)).await
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
