//! Save/load orchestrator.
//!
//! [`SaveSystem`] owns the entity registry, the save slot and the preference
//! store, and runs every save or load against the readiness gate. Saves merge
//! fresh captures into whatever the slot already holds, so entities from
//! levels that are not loaded right now keep their saved state.

use std::sync::Arc;

use save_core::{Identity, SaveFile, SaveableEntity};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::SaveConfig;
use crate::error::Result;
use crate::events::{SaveEvent, SaveEvents};
use crate::gate::{AlwaysReady, ReadinessGate};
use crate::prefs::{PreferenceStore, SessionMetadata, Settings};
use crate::registry::EntityRegistry;
use crate::repository::{FileSaveRepository, SaveRepository};

/// What kind of save is being taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRequest {
    /// Save in place; the next launch reloads `level` and restores entities.
    Checkpoint { level: String },
    /// Save while leaving for `next_level`; the next launch boots there.
    Transition { next_level: String },
}

impl SaveRequest {
    pub fn checkpoint(level: impl Into<String>) -> Self {
        Self::Checkpoint {
            level: level.into(),
        }
    }

    pub fn transition(next_level: impl Into<String>) -> Self {
        Self::Transition {
            next_level: next_level.into(),
        }
    }

    /// Level recorded as the one to boot into.
    pub fn level(&self) -> &str {
        match self {
            Self::Checkpoint { level } => level,
            Self::Transition { next_level } => next_level,
        }
    }

    pub fn resume_in_place(&self) -> bool {
        matches!(self, Self::Checkpoint { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved {
        level: String,
        /// Entities captured by this save.
        captured: usize,
        /// Entities in the slot after merging.
        total: usize,
    },
    /// The gate was closed; nothing was written.
    NotReady,
}

/// Which registered entities a load touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Registered and present in the save; restored.
    pub restored: Vec<Identity>,
    /// Registered but absent from the save; left at their current state.
    pub defaulted: Vec<Identity>,
    /// In the save but not registered; skipped.
    pub ignored: Vec<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum LoadOutcome {
    Restored(LoadReport),
    /// No save slot yet. A new game, not an error.
    NoSave,
    /// The gate was closed; nothing was restored.
    NotReady,
}

/// Result of the "continue" menu action.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ContinueOutcome {
    /// Boot into `level`; the save is restored once it is ready.
    Resume { level: String },
    NoSavedGame,
}

/// Orchestrates capture, merge, persist and restore for registered entities.
pub struct SaveSystem {
    config: SaveConfig,
    repository: Arc<dyn SaveRepository>,
    prefs: PreferenceStore,
    registry: EntityRegistry,
    gate: Arc<dyn ReadinessGate>,
    events: SaveEvents,
    pending_load: bool,
}

impl SaveSystem {
    /// Create a new save system builder
    pub fn builder() -> SaveSystemBuilder {
        SaveSystemBuilder::new()
    }

    pub fn config(&self) -> &SaveConfig {
        &self.config
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    /// Registers an entity as it enters the scene.
    pub fn register(&mut self, entity: SaveableEntity) -> Result<()> {
        self.registry.register(entity)?;
        Ok(())
    }

    /// Unregisters an entity as it leaves the scene.
    pub fn unregister(&mut self, identity: &Identity) -> Option<SaveableEntity> {
        self.registry.unregister(identity)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.events.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn has_pending_load(&self) -> bool {
        self.pending_load
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn preferences_mut(&mut self) -> &mut PreferenceStore {
        &mut self.prefs
    }

    pub fn session(&self) -> SessionMetadata {
        SessionMetadata::load(&self.prefs)
    }

    pub fn settings(&self) -> Settings {
        Settings::load(&self.prefs)
    }

    /// Stores and flushes settings.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<()> {
        settings.store(&mut self.prefs);
        self.prefs.flush()?;
        Ok(())
    }

    /// True when the save slot holds data.
    pub fn has_save(&self) -> bool {
        self.repository.exists()
    }

    /// Checkpoint save at `level`.
    pub fn save(&mut self, level: impl Into<String>) -> Result<SaveOutcome> {
        self.save_with(SaveRequest::checkpoint(level))
    }

    /// Captures every registered entity and merges it into the save slot.
    ///
    /// Refused while the gate is closed, leaving the slot untouched. Entries
    /// for identities that are not registered right now are carried over.
    ///
    /// The slot is committed before the session metadata is flushed. If the
    /// flush fails the new slot stays on disk, the error is returned and no
    /// completion event is published.
    pub fn save_with(&mut self, request: SaveRequest) -> Result<SaveOutcome> {
        if !self.gate.is_ready() {
            warn!(
                target: "save::system",
                level = request.level(),
                "save refused: scene is not ready"
            );
            return Ok(SaveOutcome::NotReady);
        }

        let mut file = self.repository.load()?.unwrap_or_default();
        let previous = file.len();

        let mut captured = 0;
        for entity in self.registry.iter() {
            let bundle = entity.capture_all()?;
            if file.merge(entity.identity().clone(), bundle).is_some() {
                debug!(
                    target: "save::system",
                    identity = %entity.identity(),
                    "replaced saved entry"
                );
            }
            captured += 1;
        }

        self.repository.save(&file)?;

        let level = request.level().to_string();
        SessionMetadata {
            saved_level: Some(level.clone()),
            resume_in_place: request.resume_in_place(),
        }
        .store(&mut self.prefs);
        if let Err(e) = self.prefs.flush() {
            warn!(
                target: "save::system",
                level = %level,
                error = %e,
                "save slot written but session metadata was not flushed"
            );
            return Err(e.into());
        }

        info!(
            target: "save::system",
            level = %level,
            captured,
            carried_over = file.len().saturating_sub(captured),
            previous,
            "save completed"
        );

        self.events.publish(SaveEvent::SaveCompleted {
            level: level.clone(),
            entities: captured,
            notice_for: self.config.notice_duration,
        });

        Ok(SaveOutcome::Saved {
            level,
            captured,
            total: file.len(),
        })
    }

    /// Restores every registered entity that has an entry in the save slot.
    ///
    /// Restoration runs entity by entity. If one fails, entities earlier in
    /// identity order stay restored.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        if !self.gate.is_ready() {
            debug!(target: "save::system", "load deferred: scene is not ready");
            return Ok(LoadOutcome::NotReady);
        }

        let Some(file) = self.repository.load()? else {
            info!(target: "save::system", "no save found, starting fresh");
            return Ok(LoadOutcome::NoSave);
        };

        let report = self.restore_from(&file)?;

        info!(
            target: "save::system",
            restored = report.restored.len(),
            defaulted = report.defaulted.len(),
            ignored = report.ignored.len(),
            "load completed"
        );

        self.events.publish(SaveEvent::LoadCompleted {
            restored: report.restored.len(),
        });

        Ok(LoadOutcome::Restored(report))
    }

    fn restore_from(&self, file: &SaveFile) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for entity in self.registry.iter() {
            match file.get(entity.identity()) {
                Some(bundle) => {
                    entity.restore_all(bundle)?;
                    report.restored.push(entity.identity().clone());
                }
                None => report.defaulted.push(entity.identity().clone()),
            }
        }

        report.ignored = file
            .identities()
            .filter(|identity| !self.registry.contains(identity))
            .cloned()
            .collect();

        Ok(report)
    }

    /// Schedules a load for the first [`tick`](Self::tick) with an open gate.
    pub fn request_load(&mut self) {
        self.pending_load = true;
    }

    /// Host-loop hook. Runs a pending load once the gate opens.
    ///
    /// Returns `None` when nothing ran this tick.
    pub fn tick(&mut self) -> Result<Option<LoadOutcome>> {
        if !self.pending_load || !self.gate.is_ready() {
            return Ok(None);
        }

        self.pending_load = false;
        self.load().map(Some)
    }

    /// Waits for the gate, yielding to the scheduler between polls, then loads.
    pub async fn load_when_ready(&mut self) -> Result<LoadOutcome> {
        while !self.gate.is_ready() {
            tokio::time::sleep(self.config.poll_interval).await;
        }

        self.pending_load = false;
        self.load()
    }

    /// Launch flow. Schedules a deferred load when the last session saved a
    /// level, and returns that session.
    pub fn startup(&mut self) -> SessionMetadata {
        let session = self.session();
        if let Some(level) = &session.saved_level {
            info!(
                target: "save::system",
                level = %level,
                resume_in_place = session.resume_in_place,
                "resuming saved session"
            );
            self.request_load();
        }
        session
    }

    /// "Continue" menu action.
    ///
    /// Needs both a recorded level and a save slot; otherwise publishes a
    /// [`SaveEvent::NoSavedGame`] notice.
    pub fn continue_game(&mut self) -> ContinueOutcome {
        let session = self.session();
        match session.saved_level {
            Some(level) if self.repository.exists() => {
                self.request_load();
                ContinueOutcome::Resume { level }
            }
            _ => {
                info!(target: "save::system", "continue requested with no saved game");
                self.events.publish(SaveEvent::NoSavedGame);
                ContinueOutcome::NoSavedGame
            }
        }
    }

    /// Deletes the save slot and forgets the saved level.
    pub fn new_game(&mut self) -> Result<()> {
        self.repository.delete()?;
        SessionMetadata::clear(&mut self.prefs);
        self.prefs.flush()?;
        self.pending_load = false;

        info!(target: "save::system", "save slot cleared for a new game");
        Ok(())
    }
}

/// Builder for [`SaveSystem`] with flexible configuration.
pub struct SaveSystemBuilder {
    config: SaveConfig,
    repository: Option<Arc<dyn SaveRepository>>,
    prefs: Option<PreferenceStore>,
    gate: Option<Arc<dyn ReadinessGate>>,
}

impl SaveSystemBuilder {
    fn new() -> Self {
        Self {
            config: SaveConfig::default(),
            repository: None,
            prefs: None,
            gate: None,
        }
    }

    /// Override configuration
    pub fn config(mut self, config: SaveConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom slot repository.
    ///
    /// Defaults to a [`FileSaveRepository`] in `config.data_dir`.
    pub fn repository(mut self, repository: impl SaveRepository + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    /// Use a custom preference store.
    ///
    /// Defaults to the JSON file at `config.prefs_path()`.
    pub fn preferences(mut self, prefs: PreferenceStore) -> Self {
        self.prefs = Some(prefs);
        self
    }

    /// Set the readiness gate. Defaults to [`AlwaysReady`].
    pub fn gate(mut self, gate: impl ReadinessGate + 'static) -> Self {
        self.gate = Some(Arc::new(gate));
        self
    }

    pub fn build(self) -> Result<SaveSystem> {
        let repository = match self.repository {
            Some(repository) => repository,
            None => Arc::new(FileSaveRepository::new(
                &self.config.data_dir,
                &self.config.save_file_name,
            )?),
        };

        let prefs = match self.prefs {
            Some(prefs) => prefs,
            None => PreferenceStore::open(self.config.prefs_path())?,
        };

        let gate = self.gate.unwrap_or_else(|| Arc::new(AlwaysReady));
        let events = SaveEvents::with_capacity(self.config.event_buffer_size);

        Ok(SaveSystem {
            config: self.config,
            repository,
            prefs,
            registry: EntityRegistry::new(),
            gate,
            events,
            pending_load: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::ReadyFlag;
    use crate::repository::InMemorySaveRepo;

    fn system(gate: ReadyFlag) -> SaveSystem {
        SaveSystem::builder()
            .repository(InMemorySaveRepo::new())
            .preferences(PreferenceStore::in_memory())
            .gate(gate)
            .build()
            .unwrap()
    }

    #[test]
    fn request_describes_session() {
        let checkpoint = SaveRequest::checkpoint("Asylum");
        let transition = SaveRequest::transition("Tunnel");

        assert_eq!(checkpoint.level(), "Asylum");
        assert!(checkpoint.resume_in_place());
        assert_eq!(transition.level(), "Tunnel");
        assert!(!transition.resume_in_place());
    }

    #[test]
    fn refused_save_records_nothing() {
        let mut system = system(ReadyFlag::new());
        let mut events = system.subscribe();

        assert_eq!(system.save("Asylum").unwrap(), SaveOutcome::NotReady);

        assert!(!system.has_save());
        assert_eq!(system.session(), SessionMetadata::default());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn transition_save_records_next_level() {
        let gate = ReadyFlag::new();
        gate.open();
        let mut system = system(gate);

        let outcome = system
            .save_with(SaveRequest::transition("Graveyard"))
            .unwrap();

        assert!(matches!(outcome, SaveOutcome::Saved { ref level, .. } if level == "Graveyard"));
        let session = system.session();
        assert_eq!(session.saved_level.as_deref(), Some("Graveyard"));
        assert!(!session.resume_in_place);
    }

    #[test]
    fn tick_waits_for_gate() {
        let gate = ReadyFlag::new();
        let mut system = system(gate.clone());

        system.request_load();
        assert_eq!(system.tick().unwrap(), None);
        assert!(system.has_pending_load());

        gate.open();
        assert_eq!(system.tick().unwrap(), Some(LoadOutcome::NoSave));
        assert!(!system.has_pending_load());
        assert_eq!(system.tick().unwrap(), None);
    }
}
