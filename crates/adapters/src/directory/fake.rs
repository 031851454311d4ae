// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake directory adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    AttributeChange, ChangeOp, DirectoryAdapter, DirectoryConnection, DirectoryEntry,
    DirectoryError, SearchScope,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Recorded directory call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    Connect,
    Search {
        base: String,
        scope: SearchScope,
        filter: String,
    },
    Modify {
        dn: String,
        changes: Vec<AttributeChange>,
    },
    Unbind,
}

#[derive(Default)]
struct FakeState {
    entries: BTreeMap<String, DirectoryEntry>,
    /// Subtree search results by filter, as DNs into `entries`
    results: HashMap<String, Vec<String>>,
    /// Entries returned verbatim for a filter (may lack a DN)
    extra_results: HashMap<String, Vec<DirectoryEntry>>,
    connect_error: Option<DirectoryError>,
    search_errors: HashMap<String, DirectoryError>,
    modify_errors: HashMap<String, DirectoryError>,
    calls: Vec<DirectoryCall>,
}

/// In-memory directory.
///
/// Subtree searches return the entries registered for the exact filter
/// string. Base-scope searches resolve the base DN against stored entries,
/// and modifications update them in place.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store an entry and make it a result of `filter`
    pub fn add_result(&self, filter: &str, entry: DirectoryEntry) {
        let mut state = self.state();
        match entry.dn() {
            Some(dn) => {
                let dn = dn.to_string();
                state
                    .results
                    .entry(filter.to_string())
                    .or_default()
                    .push(dn.clone());
                state.entries.entry(dn).or_insert(entry);
            }
            None => state
                .extra_results
                .entry(filter.to_string())
                .or_default()
                .push(entry),
        }
    }

    /// Current state of a stored entry
    pub fn entry(&self, dn: &str) -> Option<DirectoryEntry> {
        self.state().entries.get(dn).cloned()
    }

    /// First value of an attribute on a stored entry
    pub fn attribute(&self, dn: &str, name: &str) -> Option<String> {
        self.entry(dn)
            .and_then(|e| e.first(name).map(str::to_string))
    }

    /// Replace an attribute on a stored entry, outside of any recorded call
    pub fn set_attribute(&self, dn: &str, name: &str, value: &str) {
        if let Some(entry) = self.state().entries.get_mut(dn) {
            entry.set(name, vec![value.to_string()]);
        }
    }

    pub fn fail_connect(&self, error: DirectoryError) {
        self.state().connect_error = Some(error);
    }

    pub fn fail_search(&self, filter: &str, error: DirectoryError) {
        self.state()
            .search_errors
            .insert(filter.to_string(), error);
    }

    pub fn fail_modify(&self, dn: &str, error: DirectoryError) {
        self.state().modify_errors.insert(dn.to_string(), error);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.state().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&DirectoryCall) -> bool) -> usize {
        self.state().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn connects(&self) -> usize {
        self.count(|c| matches!(c, DirectoryCall::Connect))
    }

    pub fn unbinds(&self) -> usize {
        self.count(|c| matches!(c, DirectoryCall::Unbind))
    }

    /// Modifications recorded against one DN
    pub fn modifications(&self, dn: &str) -> Vec<Vec<AttributeChange>> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                DirectoryCall::Modify { dn: d, changes } if d == dn => Some(changes.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DirectoryAdapter for FakeDirectory {
    type Connection = FakeConnection;

    async fn connect(&self) -> Result<FakeConnection, DirectoryError> {
        let mut state = self.state();
        state.calls.push(DirectoryCall::Connect);
        if let Some(err) = state.connect_error.clone() {
            return Err(err);
        }
        Ok(FakeConnection {
            directory: self.clone(),
        })
    }
}

/// Connection handed out by [`FakeDirectory`]
pub struct FakeConnection {
    directory: FakeDirectory,
}

fn apply(entry: &mut DirectoryEntry, change: &AttributeChange) {
    match change.op {
        ChangeOp::Replace if change.values.is_empty() => entry.remove(&change.attribute),
        ChangeOp::Replace => entry.set(&change.attribute, change.values.clone()),
        ChangeOp::Add => {
            let mut values = entry.values(&change.attribute).to_vec();
            values.extend(change.values.iter().cloned());
            entry.set(&change.attribute, values);
        }
    }
}

#[async_trait]
impl DirectoryConnection for FakeConnection {
    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
        _attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let mut state = self.directory.state();
        state.calls.push(DirectoryCall::Search {
            base: base.to_string(),
            scope,
            filter: filter.to_string(),
        });

        if let Some(err) = state.search_errors.get(filter) {
            return Err(err.clone());
        }

        if scope == SearchScope::Base {
            return match state.entries.get(base) {
                Some(entry) => Ok(vec![entry.clone()]),
                None => Err(DirectoryError::NoSuchObject(base.to_string())),
            };
        }

        let mut found: Vec<DirectoryEntry> = state
            .results
            .get(filter)
            .map(|dns| {
                dns.iter()
                    .filter_map(|dn| state.entries.get(dn).cloned())
                    .collect()
            })
            .unwrap_or_default();
        if let Some(extra) = state.extra_results.get(filter) {
            found.extend(extra.iter().cloned());
        }
        Ok(found)
    }

    async fn modify(
        &mut self,
        dn: &str,
        changes: Vec<AttributeChange>,
    ) -> Result<(), DirectoryError> {
        let mut state = self.directory.state();
        state.calls.push(DirectoryCall::Modify {
            dn: dn.to_string(),
            changes: changes.clone(),
        });

        if let Some(err) = state.modify_errors.get(dn) {
            return Err(err.clone());
        }

        let entry = state
            .entries
            .get_mut(dn)
            .ok_or_else(|| DirectoryError::NoSuchObject(dn.to_string()))?;
        for change in &changes {
            apply(entry, change);
        }
        Ok(())
    }

    async fn unbind(&mut self) -> Result<(), DirectoryError> {
        self.directory.state().calls.push(DirectoryCall::Unbind);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
