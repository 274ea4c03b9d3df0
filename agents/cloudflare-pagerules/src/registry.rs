//! Zone Registry
//!
//! In-memory record of every zone seen during a run, keyed by zone name and
//! kept in first-insertion order so the report lists zones the way the API
//! returned them.

use std::collections::HashMap;

/// Zone id plus the page-rule ids collected for it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneRecord {
    pub zone_id: String,
    pub rule_ids: Vec<String>,
}

/// Insertion-ordered map of zone name to [`ZoneRecord`]
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<(String, ZoneRecord)>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a zone with an empty rule list.
    ///
    /// A name that is already present keeps its position; its record is
    /// replaced. Returns `true` if the name was new.
    pub fn insert_zone(&mut self, name: &str, zone_id: &str) -> bool {
        let record = ZoneRecord {
            zone_id: zone_id.to_string(),
            rule_ids: Vec::new(),
        };

        match self.index.get(name) {
            Some(&pos) => {
                self.entries[pos].1 = record;
                false
            }
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), record));
                true
            }
        }
    }

    /// Append a rule id to a zone. Returns `false` if the zone is unknown.
    pub fn push_rule(&mut self, name: &str, rule_id: &str) -> bool {
        match self.index.get(name) {
            Some(&pos) => {
                self.entries[pos].1.rule_ids.push(rule_id.to_string());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ZoneRecord> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ZoneRecord)> {
        self.entries.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Owned `(name, zone_id)` pairs, so callers can mutate the registry
    /// while walking the zones.
    pub fn zone_ids(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, record)| (name.clone(), record.zone_id.clone()))
            .collect()
    }

    pub fn rule_count(&self) -> usize {
        self.entries.iter().map(|(_, r)| r.rule_ids.len()).sum()
    }
}
