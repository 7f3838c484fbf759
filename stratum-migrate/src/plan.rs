//! Migration planning from fingerprint history.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;

use crate::fingerprint::{SchemaObjectKey, SchemaObjectKind};
use crate::history::FingerprintRecord;

/// The objects a schema upgrade must touch.
///
/// Names are raw object names, the same spelling as fingerprint keys;
/// escaping happens in the statement builders. A table in `tables_to_create`
/// regenerates its indexes as part of its full DDL; `indexes_to_create`
/// carries indexes that must be (re)created independently of a table
/// rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Tables to drop.
    pub tables_to_drop: BTreeSet<String>,
    /// Indexes to drop.
    pub indexes_to_drop: BTreeSet<String>,
    /// Tables to (re)create.
    pub tables_to_create: BTreeSet<String>,
    /// Indexes to (re)create.
    pub indexes_to_create: BTreeSet<String>,
}

impl MigrationPlan {
    /// Check if there is anything to do.
    pub fn is_empty(&self) -> bool {
        self.tables_to_drop.is_empty()
            && self.indexes_to_drop.is_empty()
            && self.tables_to_create.is_empty()
            && self.indexes_to_create.is_empty()
    }

    /// Get a human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.tables_to_drop.is_empty() {
            parts.push(format!("Drop {} tables", self.tables_to_drop.len()));
        }
        if !self.indexes_to_drop.is_empty() {
            parts.push(format!("Drop {} indexes", self.indexes_to_drop.len()));
        }
        if !self.tables_to_create.is_empty() {
            parts.push(format!("Create {} tables", self.tables_to_create.len()));
        }
        if !self.indexes_to_create.is_empty() {
            parts.push(format!("Create {} indexes", self.indexes_to_create.len()));
        }

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Compares recorded fingerprints against freshly computed ones.
pub struct MigrationPlanner {
    /// Stored hash per object, filtered to the current owner.
    old: HashMap<SchemaObjectKey, String>,
    /// Freshly computed hash per object.
    current: IndexMap<SchemaObjectKey, String>,
}

impl MigrationPlanner {
    /// Create a planner from stored records and current fingerprints.
    pub fn new(
        old: impl IntoIterator<Item = FingerprintRecord>,
        current: IndexMap<SchemaObjectKey, String>,
    ) -> Self {
        Self {
            old: old.into_iter().map(|r| (r.key, r.hash)).collect(),
            current,
        }
    }

    /// Compute the migration plan.
    ///
    /// One pass over each mapping; correctness depends on set membership
    /// only, never on iteration order. An object whose stored and current
    /// hashes match is left untouched.
    pub fn plan(&self) -> MigrationPlan {
        let mut plan = MigrationPlan::default();

        for (key, stored_hash) in &self.old {
            let name = key.name.to_string();
            match self.current.get(key) {
                // Removed from the model
                None => match key.kind {
                    SchemaObjectKind::Table => {
                        plan.tables_to_drop.insert(name);
                    }
                    SchemaObjectKind::Index => {
                        plan.indexes_to_drop.insert(name);
                    }
                },
                // Changed
                Some(current_hash) if current_hash != stored_hash => match key.kind {
                    SchemaObjectKind::Table => {
                        plan.tables_to_drop.insert(name.clone());
                        plan.tables_to_create.insert(name);
                    }
                    SchemaObjectKind::Index => {
                        plan.indexes_to_drop.insert(name.clone());
                        plan.indexes_to_create.insert(name);
                    }
                },
                // Unchanged
                Some(_) => {}
            }
        }

        for key in self.current.keys() {
            if self.old.contains_key(key) {
                continue;
            }
            match key.kind {
                SchemaObjectKind::Table => {
                    plan.tables_to_create.insert(key.name.to_string());
                }
                SchemaObjectKind::Index => {
                    plan.indexes_to_create.insert(key.name.to_string());
                }
            }
        }

        plan
    }
}
