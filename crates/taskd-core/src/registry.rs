use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

use taskd_model::{Settings, Task};

use crate::error::ConfigError;

/// One complete, validated load of the config document.
///
/// Immutable once built; a reload produces a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    settings: Settings,
    tasks: BTreeMap<String, Task>,
}

impl Snapshot {
    /// Build a snapshot from validated tasks.
    ///
    /// Fails on the first repeated name.
    pub fn new(
        settings: Settings,
        tasks: impl IntoIterator<Item = Task>,
    ) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for task in tasks {
            if map.contains_key(task.name()) {
                return Err(ConfigError::DuplicateTask(task.name().to_string()));
            }
            map.insert(task.name().to_string(), task);
        }
        Ok(Self {
            settings,
            tasks: map,
        })
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Task names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Shared handle to the currently published [`Snapshot`].
///
/// Cloning the handle is cheap; all clones observe the same publications.
/// Readers only hold the lock long enough to clone an `Arc`, so they never
/// see a half-built registry and never wait on a load in progress.
#[derive(Clone, Default)]
pub struct Registry {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl Registry {
    /// Empty registry (no tasks, default settings).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// The snapshot published at the time of the call.
    ///
    /// Use it to run several reads against one consistent load.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        // A poisoned lock still guards a complete snapshot: writers only swap the Arc.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Find a task by name.
    pub fn lookup(&self, name: &str) -> Option<Task> {
        self.snapshot().get(name).cloned()
    }

    /// Names of all published tasks, in ascending order.
    pub fn list_names(&self) -> Vec<String> {
        self.snapshot().names().map(str::to_string).collect()
    }

    pub fn settings(&self) -> Settings {
        *self.snapshot().settings()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Replace the published snapshot as a whole.
    pub(crate) fn publish(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("tasks", &self.len())
            .finish()
    }
}
