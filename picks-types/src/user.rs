use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::gameweek::Edition;
use crate::pick::Picks;

/// Every player starts a run with two lives; elimination at zero.
pub const STARTING_LIVES: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Archived,
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Active
    }
}

/// A player document. Lives and status are written by the settlement job
/// and admin tooling; the pick engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    #[ts(type = "Record<string, string>")]
    pub picks: Picks,
    #[serde(default = "default_lives")]
    pub lives: u8,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_edition: Option<Edition>,
    #[serde(default)]
    pub registrations: BTreeMap<String, bool>,
}

fn default_lives() -> u8 {
    STARTING_LIVES
}

impl Default for UserRecord {
    fn default() -> Self {
        UserRecord {
            picks: Picks::new(),
            lives: STARTING_LIVES,
            status: UserStatus::Active,
            preferred_edition: None,
            registrations: BTreeMap::new(),
        }
    }
}

impl UserRecord {
    /// Resolve which edition this player belongs to: preferred edition
    /// first, then edition 1, then the test edition, then any other
    /// registration, defaulting to edition 1.
    pub fn edition(&self) -> Edition {
        if let Some(preferred) = &self.preferred_edition {
            return preferred.clone();
        }
        if self.is_registered("edition1") {
            return Edition::new("1");
        }
        if self.is_registered("editiontest") {
            return Edition::new("test");
        }
        for (key, registered) in &self.registrations {
            if *registered {
                if let Some(id) = key.strip_prefix("edition") {
                    return Edition::new(id);
                }
            }
        }
        Edition::default()
    }

    pub fn is_eliminated(&self) -> bool {
        self.lives == 0
    }

    fn is_registered(&self, key: &str) -> bool {
        self.registrations.get(key).copied().unwrap_or(false)
    }
}
