// src/domain/entry.rs
//
// Entry Entity
//
// One consumption attempt for an item: a read-through, a watch, a re-watch.
// An item can accumulate any number of entries.
//
// Status is free to move between any of the four states. Each status
// timestamp (started_at / finished_at / dropped_at) is set the first time
// its status is reached and is never overwritten or cleared afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::UserId;
use crate::domain::{DomainError, DomainResult};

/// Consumption status of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Planned,
    Started,
    Finished,
    Dropped,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Planned => write!(f, "planned"),
            EntryStatus::Started => write!(f, "started"),
            EntryStatus::Finished => write!(f, "finished"),
            EntryStatus::Dropped => write!(f, "dropped"),
        }
    }
}

impl FromStr for EntryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(EntryStatus::Planned),
            "started" => Ok(EntryStatus::Started),
            "finished" => Ok(EntryStatus::Finished),
            "dropped" => Ok(EntryStatus::Dropped),
            other => Err(DomainError::InvariantViolation(format!(
                "Unknown entry status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: UserId,

    /// Item this entry tracks
    pub item_id: Uuid,

    pub status: EntryStatus,

    /// Set the first time the entry reaches `started`
    pub started_at: Option<DateTime<Utc>>,

    /// Set the first time the entry reaches `finished`
    pub finished_at: Option<DateTime<Utc>>,

    /// Set the first time the entry reaches `dropped`
    pub dropped_at: Option<DateTime<Utc>>,

    /// Would the user recommend this item
    pub recommend: Option<bool>,

    /// Rating on a 0-100 scale
    pub score: Option<i32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Create a new entry with an initial status. The timestamp matching the
    /// initial status is set to now.
    pub fn new(user_id: UserId, item_id: Uuid, status: EntryStatus) -> Self {
        let now = Utc::now();
        let mut entry = Self {
            id: Uuid::new_v4(),
            user_id,
            item_id,
            status: EntryStatus::Planned,
            started_at: None,
            finished_at: None,
            dropped_at: None,
            recommend: None,
            score: None,
            created_at: now,
            updated_at: now,
        };
        entry.apply_status(status);
        entry
    }

    /// Move the entry to a new status. Sets exactly the timestamp field
    /// matching the new status, and only if it has never been set before.
    pub fn apply_status(&mut self, status: EntryStatus) {
        let now = Utc::now();
        self.status = status;

        match status {
            EntryStatus::Planned => {}
            EntryStatus::Started => {
                if self.started_at.is_none() {
                    self.started_at = Some(now);
                }
            }
            EntryStatus::Finished => {
                if self.finished_at.is_none() {
                    self.finished_at = Some(now);
                }
            }
            EntryStatus::Dropped => {
                if self.dropped_at.is_none() {
                    self.dropped_at = Some(now);
                }
            }
        }

        self.updated_at = now;
    }

    pub fn set_recommend(&mut self, recommend: Option<bool>) {
        self.recommend = recommend;
        self.updated_at = Utc::now();
    }

    pub fn set_score(&mut self, score: Option<i32>) {
        self.score = score;
        self.updated_at = Utc::now();
    }
}

/// Validates Entry invariants
pub fn validate_entry(entry: &Entry) -> DomainResult<()> {
    if let Some(score) = entry.score {
        if !(0..=100).contains(&score) {
            return Err(DomainError::InvariantViolation(format!(
                "Score must be between 0 and 100, got {}",
                score
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: EntryStatus) -> Entry {
        Entry::new(UserId::from("user-1"), Uuid::new_v4(), status)
    }

    #[test]
    fn test_new_sets_matching_timestamp_only() {
        let planned = entry(EntryStatus::Planned);
        assert!(planned.started_at.is_none());
        assert!(planned.finished_at.is_none());
        assert!(planned.dropped_at.is_none());

        let started = entry(EntryStatus::Started);
        assert!(started.started_at.is_some());
        assert!(started.finished_at.is_none());
        assert!(started.dropped_at.is_none());

        let finished = entry(EntryStatus::Finished);
        assert!(finished.started_at.is_none());
        assert!(finished.finished_at.is_some());

        let dropped = entry(EntryStatus::Dropped);
        assert!(dropped.dropped_at.is_some());
        assert!(dropped.finished_at.is_none());
    }

    #[test]
    fn test_transition_sets_only_new_status_timestamp() {
        let mut e = entry(EntryStatus::Started);
        let started_at = e.started_at;

        e.apply_status(EntryStatus::Finished);
        assert_eq!(e.status, EntryStatus::Finished);
        assert_eq!(e.started_at, started_at);
        assert!(e.finished_at.is_some());
        assert!(e.dropped_at.is_none());
    }

    #[test]
    fn test_timestamps_are_first_time_wins() {
        let mut e = entry(EntryStatus::Finished);
        let first_finish = e.finished_at;

        // Leave and come back; the original timestamp must survive.
        e.apply_status(EntryStatus::Started);
        e.apply_status(EntryStatus::Finished);

        assert_eq!(e.finished_at, first_finish);
    }

    #[test]
    fn test_any_state_reachable_from_any_other() {
        let mut e = entry(EntryStatus::Dropped);
        e.apply_status(EntryStatus::Planned);
        assert_eq!(e.status, EntryStatus::Planned);
        // dropped_at survives the move back to planned
        assert!(e.dropped_at.is_some());
    }

    #[test]
    fn test_score_bounds() {
        let mut e = entry(EntryStatus::Planned);

        e.set_score(Some(100));
        assert!(validate_entry(&e).is_ok());

        e.set_score(Some(101));
        assert!(validate_entry(&e).is_err());

        e.set_score(Some(-1));
        assert!(validate_entry(&e).is_err());

        e.set_score(None);
        assert!(validate_entry(&e).is_ok());
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            EntryStatus::Planned,
            EntryStatus::Started,
            EntryStatus::Finished,
            EntryStatus::Dropped,
        ] {
            let parsed: EntryStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("watching".parse::<EntryStatus>().is_err());
    }
}
