//! Keyed critical sections for the style tree.
//!
//! One [`StyleLockManager`] is shared by every storage component that touches
//! the same directory tree. Each key maps to its own mutex; entries are
//! created on first use and removed when the last holder or waiter lets go,
//! so the table only ever contains keys somebody is using.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The lockable resource inside one base resource.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LockSlot {
    Style(String),
    /// The base resource's default-style record. Kept distinct from
    /// `Style` so a style literally named after the record cannot share it.
    DefaultStyle,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LockKey {
    pub base_resource: String,
    pub slot: LockSlot,
}

impl LockKey {
    pub fn style(base_resource: &str, style_id: &str) -> Self {
        Self {
            base_resource: base_resource.to_string(),
            slot: LockSlot::Style(style_id.to_string()),
        }
    }

    pub fn default_style(base_resource: &str) -> Self {
        Self {
            base_resource: base_resource.to_string(),
            slot: LockSlot::DefaultStyle,
        }
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            LockSlot::Style(id) => write!(f, "{}/{}", self.base_resource, id),
            LockSlot::DefaultStyle => write!(f, "{}#default", self.base_resource),
        }
    }
}

type Handle = Arc<Mutex<()>>;

#[derive(Debug, Default)]
pub struct StyleLockManager {
    table: Mutex<HashMap<LockKey, Handle>>,
}

impl StyleLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `section` while holding the lock for `key`.
    ///
    /// Blocks until no other section for the same key is running. Sections
    /// for different keys do not wait on each other. A panic inside `section`
    /// releases the key.
    pub fn run_exclusive<T>(&self, key: LockKey, section: impl FnOnce() -> T) -> T {
        let lease = self.lease(key);
        let _guard = lease.lock();
        section()
    }

    /// Keys currently held or waited on.
    pub fn active_keys(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<LockKey, Handle>> {
        // Sections never run under the table lock, so a poisoned table
        // still holds a consistent map.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lease(&self, key: LockKey) -> Lease<'_> {
        let handle = self.table().entry(key.clone()).or_default().clone();
        Lease {
            manager: self,
            key,
            handle,
        }
    }
}

/// A counted reference to one key's mutex. Dropping the last lease removes
/// the key from the table.
struct Lease<'a> {
    manager: &'a StyleLockManager,
    key: LockKey,
    handle: Handle,
}

impl Lease<'_> {
    fn lock(&self) -> MutexGuard<'_, ()> {
        // The mutex guards no data; poisoning carries no meaning here.
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let mut table = self.manager.table();
        let only_table_left = table
            .get(&self.key)
            .is_some_and(|held| Arc::ptr_eq(held, &self.handle))
            && Arc::strong_count(&self.handle) == 2;
        if only_table_left {
            table.remove(&self.key);
        }
    }
}
