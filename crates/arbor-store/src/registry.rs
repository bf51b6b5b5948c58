use std::sync::Arc;

use tracing::warn;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::events::{EventState, EventSwitch};
use crate::memory::InMemoryDatabase;
use crate::snapshot::RegistrySnapshot;
use crate::traits::{Database, DatabaseRegistry};

/// Ordered set of in-memory databases sharing one events switch.
#[derive(Debug)]
pub struct InMemoryRegistry {
    events: Arc<EventSwitch>,
    databases: Vec<Arc<InMemoryDatabase>>,
}

impl InMemoryRegistry {
    /// An empty registry with its own events switch.
    pub fn new() -> Self {
        Self::with_events(Arc::new(EventSwitch::new()))
    }

    /// An empty registry using a shared events switch.
    pub fn with_events(events: Arc<EventSwitch>) -> Self {
        Self {
            events,
            databases: Vec::new(),
        }
    }

    /// Register the databases named in `config`.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let mut registry = Self::new();
        for db in &config.databases {
            registry.register(db.name.trim())?;
        }
        Ok(registry)
    }

    /// Register a new, empty database.
    pub fn register(&mut self, name: &str) -> StoreResult<Arc<InMemoryDatabase>> {
        if name.trim().is_empty() {
            return Err(StoreError::Config("database name cannot be empty".into()));
        }
        if self.get(name).is_some() {
            return Err(StoreError::Config(format!("duplicate database name: {name}")));
        }
        let events: Arc<dyn EventState> = self.events.clone();
        let db = Arc::new(InMemoryDatabase::new(name, events));
        self.databases.push(Arc::clone(&db));
        Ok(db)
    }

    /// The events switch shared by every database in this registry.
    pub fn events(&self) -> &Arc<EventSwitch> {
        &self.events
    }

    /// Concrete handle to a registered database (case-insensitive).
    pub fn get(&self, name: &str) -> Option<Arc<InMemoryDatabase>> {
        self.databases
            .iter()
            .find(|db| db.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Capture every database.
    pub fn snapshot(&self) -> StoreResult<RegistrySnapshot> {
        Ok(RegistrySnapshot {
            databases: self
                .databases
                .iter()
                .map(|db| db.snapshot())
                .collect::<StoreResult<_>>()?,
        })
    }

    /// Load matching databases from `snapshot`.
    ///
    /// Databases missing from the snapshot are left untouched; snapshot
    /// entries for unregistered databases are skipped with a warning.
    pub fn apply_snapshot(&self, snapshot: &RegistrySnapshot) -> StoreResult<()> {
        for entry in &snapshot.databases {
            match self.get(&entry.name) {
                Some(db) => db.load_snapshot(entry)?,
                None => warn!(database = %entry.name, "snapshot references unregistered database, skipped"),
            }
        }
        Ok(())
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseRegistry for InMemoryRegistry {
    fn database_names(&self) -> Vec<String> {
        self.databases.iter().map(|db| db.name().to_string()).collect()
    }

    fn database(&self, name: &str) -> Option<Arc<dyn Database>> {
        self.get(name).map(|db| db as Arc<dyn Database>)
    }
}
