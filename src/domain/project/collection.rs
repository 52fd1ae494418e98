//! Id-keyed child collections with baseline diffing.
//!
//! Each collection remembers the snapshot it was loaded (or last persisted)
//! with. `changes()` diffs that baseline against the current items so a
//! persistence adapter can issue targeted inserts, updates and deletes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use super::ProjectError;

/// A child entity owned by a project.
pub trait Entity: Clone + PartialEq + Debug {
    type Id: Copy + Eq + Hash + Ord + Debug + Display;

    /// Human-readable entity name used in errors.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;

    /// Error returned when an id is not part of the collection.
    fn not_found(id: Self::Id) -> ProjectError;
}

/// Ids added, updated and removed since the last baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset<Id> {
    pub added: Vec<Id>,
    pub updated: Vec<Id>,
    pub removed: Vec<Id>,
}

impl<Id> Changeset<Id> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

impl<Id> Default for Changeset<Id> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Ordered set of entities keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCollection<T: Entity> {
    items: Vec<T>,
    baseline: Vec<T>,
}

impl<T: Entity> EntityCollection<T> {
    /// Creates an empty collection with an empty baseline.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            baseline: Vec::new(),
        }
    }

    /// Creates a collection from persisted items; they become the baseline.
    pub fn from_persisted(items: Vec<T>) -> Result<Self, ProjectError> {
        let mut collection = Self::new();
        collection.add_all(items)?;
        collection.mark_persisted();
        Ok(collection)
    }

    // ───────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = T::Id> + '_ {
        self.items.iter().map(|item| item.id())
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Finds an entity, failing with the entity's not-found error.
    pub fn find(&self, id: T::Id) -> Result<&T, ProjectError> {
        self.get(id).ok_or_else(|| T::not_found(id))
    }

    pub fn find_mut(&mut self, id: T::Id) -> Result<&mut T, ProjectError> {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| T::not_found(id))
    }

    /// Lazily yields every entity except the one with `id`.
    pub fn excluding(&self, id: T::Id) -> impl Iterator<Item = &T> {
        self.items.iter().filter(move |item| item.id() != id)
    }

    // ───────────────────────────────────────────────────────────────
    // Mutation
    // ───────────────────────────────────────────────────────────────

    pub fn add(&mut self, item: T) -> Result<(), ProjectError> {
        if self.contains(item.id()) {
            return Err(ProjectError::duplicate(T::NAME, item.id()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Adds every item or none of them.
    pub fn add_all(&mut self, items: Vec<T>) -> Result<(), ProjectError> {
        let mut seen = HashSet::new();
        for item in &items {
            if self.contains(item.id()) || !seen.insert(item.id()) {
                return Err(ProjectError::duplicate(T::NAME, item.id()));
            }
        }
        self.items.extend(items);
        Ok(())
    }

    pub fn remove(&mut self, id: T::Id) -> Result<T, ProjectError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| T::not_found(id))?;
        Ok(self.items.remove(index))
    }

    // ───────────────────────────────────────────────────────────────
    // Change tracking
    // ───────────────────────────────────────────────────────────────

    /// Diffs the current items against the baseline.
    pub fn changes(&self) -> Changeset<T::Id> {
        let mut changes = Changeset::default();
        for item in &self.items {
            match self.baseline.iter().find(|b| b.id() == item.id()) {
                None => changes.added.push(item.id()),
                Some(before) if before != item => changes.updated.push(item.id()),
                Some(_) => {}
            }
        }
        for before in &self.baseline {
            if !self.contains(before.id()) {
                changes.removed.push(before.id());
            }
        }
        changes
    }

    /// Entities present now but not in the baseline.
    pub fn added(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| !self.baseline.iter().any(|b| b.id() == item.id()))
            .collect()
    }

    /// Baseline entities that are no longer present.
    pub fn removed(&self) -> Vec<&T> {
        self.baseline
            .iter()
            .filter(|before| !self.contains(before.id()))
            .collect()
    }

    /// Makes the current items the new baseline.
    pub fn mark_persisted(&mut self) {
        self.baseline = self.items.clone();
    }
}

impl<T: Entity> Default for EntityCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}
