use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info};

use picks_core::{earliest_kickoff, gameweek_state_with_deadline};
use picks_persistence::StoreError;
use picks_persistence::repositories::FixtureRepository;
use picks_types::{Edition, GameweekKey, GameweekState};

use crate::clock::Clock;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Fixed deadlines that bypass fixture-derived computation, keyed by
/// (edition, gameweek). Kept as injected data so corrections for bad
/// historical fixture data never turn into code paths.
#[derive(Debug, Clone, Default)]
pub struct DeadlineOverrides {
    entries: HashMap<(Edition, GameweekKey), DateTime<Utc>>,
}

impl DeadlineOverrides {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, edition: Edition, gameweek: GameweekKey, deadline: DateTime<Utc>) {
        self.entries.insert((edition, gameweek), deadline);
    }

    pub fn get(&self, edition: &Edition, gameweek: GameweekKey) -> Option<DateTime<Utc>> {
        self.entries.get(&(edition.clone(), gameweek)).copied()
    }

    /// The edition-1 deadlines that were corrected by hand during the
    /// first 2025 run, before fixture data for those rounds was reliable.
    pub fn legacy_defaults() -> Self {
        let mut overrides = Self::empty();
        let edition = Edition::new("1");
        for (week, deadline) in [
            (1, "2025-08-09T15:00:00"),
            (2, "2025-08-16T12:30:00"),
            (3, "2025-08-19T19:45:00"),
        ] {
            overrides.insert(
                edition.clone(),
                GameweekKey::Week(week),
                parse_literal(deadline),
            );
        }
        overrides
    }
}

fn parse_literal(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .expect("valid deadline literal")
        .and_utc()
}

struct CacheEntry {
    deadline: DateTime<Utc>,
    stored_at: Instant,
}

/// TTL cache for fixture-derived deadlines, keyed by (edition, gameweek).
struct DeadlineCache {
    entries: Mutex<HashMap<(Edition, GameweekKey), CacheEntry>>,
    ttl: Duration,
}

impl DeadlineCache {
    fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn get(&self, edition: &Edition, gameweek: GameweekKey) -> Option<DateTime<Utc>> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(&(edition.clone(), gameweek))
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.deadline)
    }

    fn put(&self, edition: &Edition, gameweek: GameweekKey, deadline: DateTime<Utc>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            (edition.clone(), gameweek),
            CacheEntry {
                deadline,
                stored_at: Instant::now(),
            },
        );
    }

    fn invalidate(&self, edition: &Edition, gameweek: GameweekKey) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(&(edition.clone(), gameweek));
    }

    fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

/// Single source of truth for deadlines. Overrides win over fixture
/// data; fixture-derived results are cached per (edition, gameweek).
pub struct DeadlineService {
    fixtures: Arc<FixtureRepository>,
    cache: DeadlineCache,
    overrides: DeadlineOverrides,
    clock: Arc<dyn Clock>,
}

impl DeadlineService {
    pub fn new(
        fixtures: Arc<FixtureRepository>,
        overrides: DeadlineOverrides,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_cache_ttl(fixtures, overrides, clock, DEFAULT_CACHE_TTL)
    }

    pub fn with_cache_ttl(
        fixtures: Arc<FixtureRepository>,
        overrides: DeadlineOverrides,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            fixtures,
            cache: DeadlineCache::new(ttl),
            overrides,
            clock,
        }
    }

    /// The round's deadline, or None when nothing is scheduled yet.
    pub async fn deadline_for(
        &self,
        gameweek: GameweekKey,
        edition: &Edition,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        if let Some(fixed) = self.overrides.get(edition, gameweek) {
            return Ok(Some(fixed));
        }
        if let Some(cached) = self.cache.get(edition, gameweek) {
            return Ok(Some(cached));
        }

        let fixtures = self.fixtures.get_fixtures(edition, gameweek).await?;
        let deadline = earliest_kickoff(&fixtures);
        if let Some(deadline) = deadline {
            self.cache.put(edition, gameweek, deadline);
            debug!(%gameweek, %edition, %deadline, "deadline derived from fixtures");
        }
        Ok(deadline)
    }

    /// A round with no deadline never locks.
    pub async fn is_deadline_passed(
        &self,
        gameweek: GameweekKey,
        edition: &Edition,
    ) -> Result<bool, StoreError> {
        let deadline = self.deadline_for(gameweek, edition).await?;
        Ok(matches!(deadline, Some(d) if self.clock.now() >= d))
    }

    pub async fn state_for(
        &self,
        gameweek: GameweekKey,
        edition: &Edition,
    ) -> Result<GameweekState, StoreError> {
        let fixtures = self.fixtures.get_fixtures(edition, gameweek).await?;
        let deadline = match self.overrides.get(edition, gameweek) {
            Some(fixed) => Some(fixed),
            None => earliest_kickoff(&fixtures),
        };
        Ok(gameweek_state_with_deadline(
            &fixtures,
            deadline,
            self.clock.now(),
        ))
    }

    /// Deadlines for every round of an edition, in play order.
    pub async fn all_deadlines(
        &self,
        edition: &Edition,
    ) -> Result<BTreeMap<GameweekKey, Option<DateTime<Utc>>>, StoreError> {
        let mut deadlines = BTreeMap::new();
        for gameweek in GameweekKey::all() {
            deadlines.insert(gameweek, self.deadline_for(gameweek, edition).await?);
        }
        Ok(deadlines)
    }

    /// Drop the cached deadline for a round. Must be called whenever the
    /// round's fixtures are rewritten, or a stale deadline could wrongly
    /// permit or deny a pick change.
    pub fn invalidate(&self, edition: &Edition, gameweek: GameweekKey) {
        self.cache.invalidate(edition, gameweek);
        info!(%gameweek, %edition, "deadline cache invalidated");
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("deadline cache cleared");
    }

    /// Human-readable countdown to a deadline.
    pub fn format_relative(&self, deadline: DateTime<Utc>) -> String {
        let now = self.clock.now();
        if now >= deadline {
            return "Deadline passed".to_string();
        }
        let remaining = deadline - now;
        let seconds = remaining.num_seconds();
        if seconds >= 48 * 3600 {
            format!("{} days", (seconds + 86_399) / 86_400)
        } else if seconds >= 24 * 3600 {
            "Tomorrow".to_string()
        } else if seconds >= 3600 {
            format!("{} hours", (seconds + 3599) / 3600)
        } else {
            format!("{} minutes", ((seconds + 59) / 60).max(1))
        }
    }
}
