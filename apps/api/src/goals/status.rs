//! Goal status reconciliation between the UI vocabulary and the persisted one.
//!
//! The two domains do not correspond 1:1. `NotStarted` and `InProgress` both
//! persist as `Active`, and `Active` always reads back as `NotStarted`, so an
//! `InProgress` goal does not survive a round trip through storage. Write paths
//! echo the caller's own UI value instead of re-reading it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Progress floor applied when a goal moves to `InProgress` via a status change.
pub const IN_PROGRESS_FLOOR: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiStatus {
    NotStarted,
    InProgress,
    Completed,
    OnHold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistedStatus {
    Active,
    Completed,
    Paused,
    Cancelled,
}

impl UiStatus {
    pub const ALL: [UiStatus; 4] = [
        UiStatus::NotStarted,
        UiStatus::InProgress,
        UiStatus::Completed,
        UiStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UiStatus::NotStarted => "not_started",
            UiStatus::InProgress => "in_progress",
            UiStatus::Completed => "completed",
            UiStatus::OnHold => "on_hold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        UiStatus::ALL.into_iter().find(|v| v.as_str() == s)
    }

    pub fn to_persisted(self) -> PersistedStatus {
        match self {
            UiStatus::NotStarted | UiStatus::InProgress => PersistedStatus::Active,
            UiStatus::Completed => PersistedStatus::Completed,
            UiStatus::OnHold => PersistedStatus::Paused,
        }
    }
}

impl PersistedStatus {
    pub const ALL: [PersistedStatus; 4] = [
        PersistedStatus::Active,
        PersistedStatus::Completed,
        PersistedStatus::Paused,
        PersistedStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersistedStatus::Active => "active",
            PersistedStatus::Completed => "completed",
            PersistedStatus::Paused => "paused",
            PersistedStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        PersistedStatus::ALL.into_iter().find(|v| v.as_str() == s)
    }

    pub fn to_ui(self) -> UiStatus {
        match self {
            PersistedStatus::Active => UiStatus::NotStarted,
            PersistedStatus::Completed => UiStatus::Completed,
            PersistedStatus::Paused | PersistedStatus::Cancelled => UiStatus::OnHold,
        }
    }
}

impl fmt::Display for UiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PersistedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI → persisted. Unrecognized input maps to `active`.
pub fn map_status_to_database(ui_status: &str) -> PersistedStatus {
    UiStatus::parse(ui_status)
        .map(UiStatus::to_persisted)
        .unwrap_or(PersistedStatus::Active)
}

/// Persisted → UI. Unrecognized input maps to `not_started`.
pub fn map_status_from_database(persisted: &str) -> UiStatus {
    PersistedStatus::parse(persisted)
        .map(PersistedStatus::to_ui)
        .unwrap_or(UiStatus::NotStarted)
}

pub fn clamp_progress(progress: i64) -> u8 {
    progress.clamp(0, 100) as u8
}

/// Progress to store alongside a status change.
///
/// Only the status-change path calls this; direct percentage edits keep the
/// value the user entered (clamped).
pub fn progress_for_status_change(new_status: UiStatus, current_progress: i64) -> u8 {
    let current = clamp_progress(current_progress);
    match new_status {
        UiStatus::Completed => 100,
        UiStatus::InProgress => current.max(IN_PROGRESS_FLOOR),
        UiStatus::NotStarted | UiStatus::OnHold => current,
    }
}
