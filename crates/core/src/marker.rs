// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification marker
//!
//! The marker is the only persisted notification state. On the wire it is a
//! semicolon-joined list of stage tags (`notified_early;notified_urgent`)
//! kept in a free-text directory attribute. In memory it is an ordered set.

use crate::stage::Stage;
use std::fmt;

/// Prefix shared by all stage tags
pub const TAG_PREFIX: &str = "notified_";

const SEPARATOR: char = ';';

/// Set of stage tags already notified in the current expiry epoch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationMarker {
    // Insertion order is kept so the encoded attribute is stable
    tags: Vec<String>,
}

impl NotificationMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the attribute value. Empty segments and whitespace are dropped.
    pub fn decode(raw: &str) -> Self {
        let mut marker = Self::new();
        for segment in raw.split(SEPARATOR) {
            marker.insert(segment);
        }
        marker
    }

    /// Render the attribute value.
    pub fn encode(&self) -> String {
        self.tags.join(";")
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn has_stage(&self, stage: Stage) -> bool {
        self.contains(&stage.tag())
    }

    /// Add a tag. Returns false when it was already present or blank.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Copy of this marker with the stage's tag appended.
    pub fn with_stage(&self, stage: Stage) -> Self {
        let mut next = self.clone();
        next.insert(&stage.tag());
        next
    }
}

impl fmt::Display for NotificationMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl<'a> FromIterator<&'a str> for NotificationMarker {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut marker = Self::new();
        for tag in iter {
            for segment in tag.split(SEPARATOR) {
                marker.insert(segment);
            }
        }
        marker
    }
}

#[cfg(test)]
#[path = "marker_tests.rs"]
mod tests;
