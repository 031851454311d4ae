// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger times and their debounce state
//!
//! The coordinator polls far more often than once a minute, so every trigger
//! remembers the last minute it fired and stays quiet until the clock has
//! moved off that minute.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors parsing a trigger time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriggerTimeError {
    #[error("invalid trigger time {0:?}: expected HH:MM")]
    Format(String),
    #[error("invalid trigger time {0:?}: hour must be 0-23 and minute 0-59")]
    Range(String),
}

/// Wall-clock minute of day (`"HH:MM"` in configuration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerTime {
    hour: u8,
    minute: u8,
}

impl TriggerTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, TriggerTimeError> {
        if hour > 23 || minute > 59 {
            return Err(TriggerTimeError::Range(format!("{}:{}", hour, minute)));
        }
        Ok(Self { hour, minute })
    }

    /// Minute of day for a clock reading.
    pub fn of<T: Timelike>(time: &T) -> Self {
        // Timelike guarantees hour < 24 and minute < 60
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl FromStr for TriggerTime {
    type Err = TriggerTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (hour, minute) = trimmed
            .split_once(':')
            .ok_or_else(|| TriggerTimeError::Format(s.to_string()))?;
        let hour: u8 = hour
            .parse()
            .map_err(|_| TriggerTimeError::Format(s.to_string()))?;
        let minute: u8 = minute
            .parse()
            .map_err(|_| TriggerTimeError::Format(s.to_string()))?;
        Self::new(hour, minute).map_err(|_| TriggerTimeError::Range(s.to_string()))
    }
}

impl TryFrom<String> for TriggerTime {
    type Error = TriggerTimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TriggerTime> for String {
    fn from(t: TriggerTime) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TriggerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Which pass a trigger starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Staged notifications to users, followed by the admin digest
    UserPass,
    /// Expiring-accounts alert to admins only
    AdminPass,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::UserPass => write!(f, "user"),
            TriggerKind::AdminPass => write!(f, "admin"),
        }
    }
}

/// Last minute each trigger kind fired
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    last_fired: HashMap<TriggerKind, TriggerTime>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `now` matches `trigger` and this kind has not fired during
    /// this minute yet. Records the fire.
    ///
    /// Must be called on every wake: a reading off the remembered minute
    /// re-arms the trigger for the next day.
    pub fn should_fire(&mut self, kind: TriggerKind, now: TriggerTime, trigger: TriggerTime) -> bool {
        if self.last_fired.get(&kind).is_some_and(|last| *last != now) {
            self.last_fired.remove(&kind);
        }
        if now != trigger || self.last_fired.contains_key(&kind) {
            return false;
        }
        self.last_fired.insert(kind, now);
        true
    }

    pub fn last_fired(&self, kind: TriggerKind) -> Option<TriggerTime> {
        self.last_fired.get(&kind).copied()
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
