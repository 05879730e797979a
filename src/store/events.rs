// Copyright (c) 2025 - Cowboy AI, Inc.
//! Store change notifications
//!
//! Exactly one [`StoreChanged`] is emitted per committed external call,
//! after every cascade for that call has run. Failed calls emit nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Locator, ResourceKind};

/// What a committed call did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    /// Record appended to its collection
    Created { kind: ResourceKind, locator: Locator },

    /// Record merged with an update, possibly renamed
    Saved {
        kind: ResourceKind,
        locator: Locator,
        renamed_to: Option<String>,
    },

    /// Record removed along with its dependents
    Deleted { kind: ResourceKind, locator: Locator },

    /// `_options` updated
    OptionsSaved { readdressed: bool },

    /// Activity tracker singleton updated
    AtrackerSaved,

    /// Whole document replaced
    Imported { sanitized: usize },
}

impl Mutation {
    /// Kind of record touched, if the call targeted one
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            Self::Created { kind, .. } | Self::Saved { kind, .. } | Self::Deleted { kind, .. } => {
                Some(*kind)
            }
            _ => None,
        }
    }
}

/// Notification delivered to subscribers after a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreChanged {
    /// Monotonic commit counter, starting at 1
    pub sequence: u64,
    pub mutation: Mutation,
    pub at: DateTime<Utc>,
}
