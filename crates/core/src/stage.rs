// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage decision engine
//!
//! Maps "days until expiry" plus the stored marker to the next notification
//! stage. Stages cover half-open windows over the days remaining:
//!
//! ```text
//! early:   early  >= days > middle
//! middle:  middle >= days > urgent
//! urgent:  urgent >= days > expired
//! expired: expired >= days            (no lower bound)
//! ```
//!
//! A stage is sent at most once per expiry epoch. An epoch ends when the
//! account is seen above the early threshold while a marker is present,
//! which is how a renewal shows up.

use crate::marker::{NotificationMarker, TAG_PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Notification tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Early,
    Middle,
    Urgent,
    Expired,
}

impl Stage {
    /// All stages in evaluation order
    pub const ALL: [Stage; 4] = [Stage::Early, Stage::Middle, Stage::Urgent, Stage::Expired];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Early => "early",
            Stage::Middle => "middle",
            Stage::Urgent => "urgent",
            Stage::Expired => "expired",
        }
    }

    /// Marker tag recorded once this stage has been sent
    pub fn tag(&self) -> String {
        format!("{}{}", TAG_PREFIX, self.name())
    }

    /// Stage whose window holds `days_left`, ignoring what was already sent.
    ///
    /// Values above the early threshold map to `Early`.
    pub fn for_days(days_left: i64, thresholds: &StageThresholds) -> Stage {
        thresholds
            .windows()
            .iter()
            .find(|w| w.contains(days_left))
            .map(|w| w.stage)
            .unwrap_or(Stage::Early)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Stage {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "early" => Ok(Stage::Early),
            "middle" => Ok(Stage::Middle),
            "urgent" => Ok(Stage::Urgent),
            "expired" => Ok(Stage::Expired),
            other => Err(StageError::UnknownStage(other.to_string())),
        }
    }
}

/// Errors from stage configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error("unknown stage: {0}")]
    UnknownStage(String),
    #[error(
        "notification_days must be strictly decreasing \
         (early {early} > middle {middle} > urgent {urgent} > expired {expired})"
    )]
    NotDecreasing {
        early: i64,
        middle: i64,
        urgent: i64,
        expired: i64,
    },
}

/// Stage boundaries in days (`notification_days` in the configuration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageThresholds {
    pub early: i64,
    pub middle: i64,
    pub urgent: i64,
    pub expired: i64,
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            early: 30,
            middle: 14,
            urgent: 7,
            expired: 0,
        }
    }
}

impl StageThresholds {
    pub fn validate(&self) -> Result<(), StageError> {
        if self.early > self.middle && self.middle > self.urgent && self.urgent > self.expired {
            Ok(())
        } else {
            Err(StageError::NotDecreasing {
                early: self.early,
                middle: self.middle,
                urgent: self.urgent,
                expired: self.expired,
            })
        }
    }

    /// Windows in evaluation order
    pub fn windows(&self) -> [StageWindow; 4] {
        [
            StageWindow::new(Stage::Early, self.early, Some(self.middle)),
            StageWindow::new(Stage::Middle, self.middle, Some(self.urgent)),
            StageWindow::new(Stage::Urgent, self.urgent, Some(self.expired)),
            StageWindow::new(Stage::Expired, self.expired, None),
        ]
    }
}

/// One stage's `[start, end)` window over days remaining
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageWindow {
    pub stage: Stage,
    /// Inclusive upper bound
    pub start: i64,
    /// Exclusive lower bound; `None` is negative infinity
    pub end: Option<i64>,
}

impl StageWindow {
    fn new(stage: Stage, start: i64, end: Option<i64>) -> Self {
        Self { stage, start, end }
    }

    pub fn contains(&self, days_left: i64) -> bool {
        self.start >= days_left && self.end.map_or(true, |end| days_left > end)
    }
}

impl fmt::Display for StageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}: {} >= days > {}", self.stage, self.start, end),
            None => write!(f, "{}: {} >= days", self.stage, self.start),
        }
    }
}

/// Outcome of evaluating one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageDecision {
    /// Account was renewed: wipe the marker, send nothing this pass
    ResetMarker,
    /// Send this stage and record its tag
    Notify(Stage),
    /// Nothing to do
    Nothing,
}

/// Whether the marker belongs to a finished epoch.
pub fn is_epoch_reset(
    days_left: i64,
    marker: &NotificationMarker,
    thresholds: &StageThresholds,
) -> bool {
    !marker.is_empty() && days_left > thresholds.early
}

/// First unsent stage whose window holds `days_left`.
///
/// Returns `None` on an epoch reset, when the matching stage was already
/// sent, or when `days_left` is above every window.
pub fn next_stage(
    days_left: i64,
    already_notified: &NotificationMarker,
    epoch_reset: bool,
    thresholds: &StageThresholds,
) -> Option<Stage> {
    if epoch_reset {
        return None;
    }
    thresholds
        .windows()
        .iter()
        .find(|w| w.contains(days_left) && !already_notified.has_stage(w.stage))
        .map(|w| w.stage)
}

/// Full decision for one user.
pub fn evaluate(
    days_left: i64,
    marker: &NotificationMarker,
    thresholds: &StageThresholds,
) -> StageDecision {
    if is_epoch_reset(days_left, marker, thresholds) {
        return StageDecision::ResetMarker;
    }
    match next_stage(days_left, marker, false, thresholds) {
        Some(stage) => StageDecision::Notify(stage),
        None => StageDecision::Nothing,
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
