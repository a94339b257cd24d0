//! In-memory sinks for testing and headless runs.
//!
//! Each sink keeps what it was given and exposes it for reading back. The
//! bridge takes sinks by value inside its per-instance state, so these are
//! built on shared handles: clone one, hand the clone to the bridge, and read
//! through the original after the calls.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::{HierarchyView, LogSink, Scene};
use crate::types::{Color, HierarchyItem, ObjectId, SceneObject, Vec3};

fn lock<T>(inner: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned lock only means a reader panicked; the data is still usable.
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Log sink that records every entry in order.
#[derive(Debug, Clone, Default)]
pub struct MemLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries written so far.
    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl LogSink for MemLog {
    fn write(&mut self, text: &str) {
        lock(&self.entries).push(text.to_owned());
    }
}

/// Hierarchy view that appends rows in call order.
#[derive(Debug, Clone, Default)]
pub struct MemHierarchy {
    items: Arc<Mutex<Vec<HierarchyItem>>>,
}

impl MemHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<HierarchyItem> {
        lock(&self.items).clone()
    }

    /// All rows carrying `id`, in insertion order.
    pub fn find(&self, id: ObjectId) -> Vec<HierarchyItem> {
        lock(&self.items)
            .iter()
            .filter(|item| item.id == id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }
}

impl HierarchyView for MemHierarchy {
    fn insert(&mut self, name: &str, id: ObjectId) {
        lock(&self.items).push(HierarchyItem {
            name: name.to_owned(),
            id,
        });
    }
}

/// Scene keyed by handle. A repeated spawn overwrites the entry.
#[derive(Debug, Clone, Default)]
pub struct MemScene {
    objects: Arc<Mutex<BTreeMap<ObjectId, SceneObject>>>,
}

impl MemScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ObjectId) -> Option<SceneObject> {
        lock(&self.objects).get(&id).copied()
    }

    /// All objects ordered by handle.
    pub fn objects(&self) -> Vec<SceneObject> {
        lock(&self.objects).values().copied().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.objects).is_empty()
    }
}

impl Scene for MemScene {
    fn spawn(&mut self, id: ObjectId, position: Vec3, color: Color) {
        lock(&self.objects).insert(id, SceneObject { id, position, color });
    }

    fn move_object(&mut self, id: ObjectId, position: Vec3) {
        if let Some(object) = lock(&self.objects).get_mut(&id) {
            object.position = position;
        }
    }
}
