//! Domain types for the startup cache.
//!
//! The on-disk shape is `{ "items": [ { "name", "value", "enabled" } ] }`;
//! `StartupItem::command` is serialized under the `value` key.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Live view of the Run key: value name -> raw command line.
///
/// Read fresh for every operation and never persisted.
pub type RunKeySnapshot = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// StartupItem
// ---------------------------------------------------------------------------

/// One remembered startup command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupItem {
    /// Registry value name. Case-sensitive, unique within a document.
    pub name: String,
    /// Quoted absolute executable path or an arbitrary command line.
    #[serde(rename = "value")]
    pub command: String,
    /// `true` iff the Run key currently holds a value for `name`.
    pub enabled: bool,
}

impl StartupItem {
    pub fn new(name: impl Into<String>, command: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            enabled,
        }
    }
}

/// Which cached items a query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemFilter {
    #[default]
    All,
    Enabled,
    Disabled,
}

impl ItemFilter {
    pub fn matches(self, item: &StartupItem) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Enabled => item.enabled,
            ItemFilter::Disabled => !item.enabled,
        }
    }
}

// ---------------------------------------------------------------------------
// CacheDocument
// ---------------------------------------------------------------------------

/// Root of the persisted cache file.
///
/// Item order is insertion order and survives a load/modify/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheDocument {
    #[serde(default)]
    pub items: Vec<StartupItem>,
}

impl CacheDocument {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, name: &str) -> Option<&StartupItem> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut StartupItem> {
        self.items.iter_mut().find(|i| i.name == name)
    }

    /// Update the item called `name` in place, or append it.
    pub fn upsert(&mut self, name: &str, command: &str, enabled: bool) -> &StartupItem {
        let idx = match self.items.iter().position(|i| i.name == name) {
            Some(idx) => {
                let item = &mut self.items[idx];
                item.command = command.to_owned();
                item.enabled = enabled;
                idx
            }
            None => {
                self.items.push(StartupItem::new(name, command, enabled));
                self.items.len() - 1
            }
        };
        &self.items[idx]
    }

    /// Drop the item called `name`, returning it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<StartupItem> {
        let idx = self.items.iter().position(|i| i.name == name)?;
        Some(self.items.remove(idx))
    }

    /// Items currently present in the Run key.
    pub fn enabled(&self) -> impl Iterator<Item = &StartupItem> {
        self.items.iter().filter(|i| i.enabled)
    }

    /// Soft-disabled items.
    pub fn disabled(&self) -> impl Iterator<Item = &StartupItem> {
        self.items.iter().filter(|i| !i.enabled)
    }

    /// Clones of the items that pass `filter`, sorted by name for display.
    pub fn sorted_by_name(&self, filter: ItemFilter) -> Vec<StartupItem> {
        let mut items: Vec<StartupItem> = match filter {
            ItemFilter::All => self.items.iter().cloned().collect(),
            ItemFilter::Enabled => self.enabled().cloned().collect(),
            ItemFilter::Disabled => self.disabled().cloned().collect(),
        };
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    /// Keep the first item of every name and drop the rest.
    ///
    /// Returns the names that had duplicates, once each, in document order.
    pub fn dedup_by_name(&mut self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut repeated = Vec::new();
        self.items.retain(|item| {
            if seen.insert(item.name.clone()) {
                return true;
            }
            if !repeated.contains(&item.name) {
                repeated.push(item.name.clone());
            }
            false
        });
        repeated
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
