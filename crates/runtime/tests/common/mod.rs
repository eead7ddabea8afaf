//! Test capabilities and fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use save_core::{Capability, CapsuleError, Identity, SaveableEntity, StateCapsule, shared};
use save_runtime::{
    InMemorySaveRepo, PreferenceStore, ReadyFlag, SaveConfig, SaveSystem,
};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    pub hp: f32,
}

impl Capability for Health {
    fn kind(&self) -> &'static str {
        "health"
    }

    fn capture(&self) -> StateCapsule {
        StateCapsule::builder().field("hp", self.hp).build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        self.hp = capsule.get_f32("hp")?;
        Ok(())
    }
}

/// Body whose collisions are suppressed while it is moved by a restore.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub position: [f32; 3],
    pub collisions_enabled: bool,
}

impl Position {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            collisions_enabled: true,
        }
    }
}

impl Capability for Position {
    fn kind(&self) -> &'static str {
        "position"
    }

    fn capture(&self) -> StateCapsule {
        StateCapsule::builder()
            .field("position", self.position)
            .build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        let position = capsule.get_vec3("position")?;
        self.collisions_enabled = false;
        self.position = position;
        self.collisions_enabled = true;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub picked_up: bool,
    pub active: bool,
}

impl Default for Pickup {
    fn default() -> Self {
        Self {
            picked_up: false,
            active: true,
        }
    }
}

impl Capability for Pickup {
    fn kind(&self) -> &'static str {
        "pickup"
    }

    fn capture(&self) -> StateCapsule {
        StateCapsule::builder()
            .field("picked_up", self.picked_up)
            .build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        self.picked_up = capsule.get_bool("picked_up")?;
        self.active = !self.picked_up;
        Ok(())
    }
}

pub fn id(token: &str) -> Identity {
    Identity::new(token).expect("test identity should be valid")
}

/// A player entity plus handles to its capabilities.
pub struct Player {
    pub entity: SaveableEntity,
    pub health: Arc<RwLock<Health>>,
    pub position: Arc<RwLock<Position>>,
}

pub fn player(token: &str, hp: f32, position: [f32; 3]) -> Player {
    let health = shared(Health { hp });
    let position = shared(Position::at(position));
    let entity = SaveableEntity::builder(id(token))
        .with(health.clone())
        .with(position.clone())
        .build()
        .expect("player capabilities should not collide");

    Player {
        entity,
        health,
        position,
    }
}

pub fn pickup(token: &str, picked_up: bool) -> (SaveableEntity, Arc<RwLock<Pickup>>) {
    let pickup = shared(Pickup {
        picked_up,
        active: !picked_up,
    });
    let entity = SaveableEntity::builder(id(token))
        .with(pickup.clone())
        .build()
        .expect("pickup should build");
    (entity, pickup)
}

/// Save system over a file slot in a fresh temp dir, gate open.
pub fn file_system(temp_dir: &TempDir) -> (SaveSystem, ReadyFlag) {
    let gate = ReadyFlag::new();
    gate.open();
    let system = SaveSystem::builder()
        .config(SaveConfig::with_data_dir(temp_dir.path()))
        .gate(gate.clone())
        .build()
        .expect("save system should build");
    (system, gate)
}

/// Save system over an in-memory slot, gate closed.
pub fn memory_system() -> (SaveSystem, ReadyFlag) {
    let gate = ReadyFlag::new();
    let system = SaveSystem::builder()
        .repository(InMemorySaveRepo::new())
        .preferences(PreferenceStore::in_memory())
        .gate(gate.clone())
        .build()
        .expect("save system should build");
    (system, gate)
}
