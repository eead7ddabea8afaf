//! Demo levels, their entities and the intro cutscene gating them.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use save_core::{Identity, SaveableEntity, shared};
use save_runtime::{ReadyFlag, SaveSystem};

use crate::capabilities::{
    AmmoPouch, AmmoSlot, AmmoType, Body, EnemyAlert, EnemyHealth, FlashLight, Magazine, Pickup,
    PlayerHealth, WeaponInventory,
};

pub const ASYLUM: &str = "Asylum";
pub const TUNNEL: &str = "Tunnel";

/// Intro sequence that keeps the save gate closed for a number of frames.
pub struct Cutscene {
    remaining: u32,
    gate: ReadyFlag,
}

impl Cutscene {
    pub fn start(frames: u32, gate: ReadyFlag) -> Self {
        if frames == 0 {
            gate.open();
        } else {
            gate.close();
        }
        Self {
            remaining: frames,
            gate,
        }
    }

    /// Advances one frame. Returns true once the cutscene is over.
    pub fn advance(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.gate.open();
                tracing::info!("cutscene finished");
            }
        }
        self.remaining == 0
    }
}

/// Handles into the player's components.
pub struct PlayerRig {
    pub health: Arc<RwLock<PlayerHealth>>,
    pub body: Arc<RwLock<Body>>,
    pub flashlight: Arc<RwLock<FlashLight>>,
    pub weapons: Arc<RwLock<WeaponInventory>>,
    pub ammo: Arc<RwLock<AmmoPouch>>,
    pub pistol: Arc<RwLock<Magazine>>,
}

/// Live handles for every entity spawned into a level.
pub struct Scene {
    pub level: &'static str,
    pub player: PlayerRig,
    pub pickups: BTreeMap<&'static str, Arc<RwLock<Pickup>>>,
    pub enemies: BTreeMap<&'static str, (Arc<RwLock<EnemyHealth>>, Arc<RwLock<EnemyAlert>>)>,
}

fn identity(token: &str) -> Result<Identity> {
    Ok(Identity::new(token)?)
}

fn spawn_player(
    system: &mut SaveSystem,
    level: &'static str,
    spawn: [f32; 3],
) -> Result<PlayerRig> {
    let rig = PlayerRig {
        health: shared(PlayerHealth { hp: 100.0 }),
        body: shared(Body::at(spawn)),
        flashlight: shared(FlashLight {
            intensity: 2.0,
            spot_angle: 70.0,
        }),
        weapons: shared(WeaponInventory {
            current_weapon: 0,
            obtained: BTreeMap::from([("0".to_string(), true)]),
        }),
        ammo: shared(AmmoPouch {
            slots: vec![AmmoSlot {
                ammo_type: AmmoType::Bullets,
                amount: 24,
            }],
        }),
        pistol: shared(Magazine { rounds: 8 }),
    };

    let entity = SaveableEntity::builder(identity("player")?)
        .with(rig.health.clone())
        .with(rig.flashlight.clone())
        .with(rig.weapons.clone())
        .with(rig.ammo.clone())
        .build()?;
    system.register(entity)?;

    // Positions only make sense inside the level they were saved in.
    let body = SaveableEntity::builder(identity(&format!("{}-player-body", level.to_lowercase()))?)
        .with(rig.body.clone())
        .build()?;
    system.register(body)?;

    // The weapon lives on its own entity, as it is swapped in and out.
    let pistol = SaveableEntity::builder(identity("player-pistol")?)
        .with(rig.pistol.clone())
        .build()?;
    system.register(pistol)?;

    Ok(rig)
}

fn spawn_pickup(system: &mut SaveSystem, token: &'static str) -> Result<Arc<RwLock<Pickup>>> {
    let pickup = shared(Pickup::new());
    let entity = SaveableEntity::builder(identity(token)?)
        .with(pickup.clone())
        .build()?;
    system.register(entity)?;
    Ok(pickup)
}

fn spawn_enemy(
    system: &mut SaveSystem,
    token: &'static str,
    position: [f32; 3],
) -> Result<(Arc<RwLock<EnemyHealth>>, Arc<RwLock<EnemyAlert>>)> {
    let health = shared(EnemyHealth {
        dead: false,
        body: Body::at(position),
    });
    let alert = shared(EnemyAlert { provoked: false });
    let entity = SaveableEntity::builder(identity(token)?)
        .with(health.clone())
        .with(alert.clone())
        .build()?;
    system.register(entity)?;
    Ok((health, alert))
}

/// Registers the level's entities in their authored state.
pub fn spawn(system: &mut SaveSystem, level: &'static str) -> Result<Scene> {
    system.registry_mut().clear();

    let (spawn_point, pickups, enemies): (_, &[&'static str], &[(&'static str, [f32; 3])]) =
        match level {
            TUNNEL => (
                [0.0, -4.0, 0.0],
                &["tunnel-battery", "tunnel-shells"],
                &[("tunnel-zombie-1", [12.0, -4.0, 3.0]), ("tunnel-zombie-2", [20.0, -4.0, -1.0])],
            ),
            _ => (
                [0.0, 0.0, 0.0],
                &["asylum-battery", "asylum-shotgun"],
                &[("asylum-zombie", [6.0, 0.0, 8.0])],
            ),
        };

    let player = spawn_player(system, level, spawn_point)?;

    let mut scene = Scene {
        level,
        player,
        pickups: BTreeMap::new(),
        enemies: BTreeMap::new(),
    };
    for &token in pickups {
        scene.pickups.insert(token, spawn_pickup(system, token)?);
    }
    for &(token, position) in enemies {
        scene
            .enemies
            .insert(token, spawn_enemy(system, token, position)?);
    }

    tracing::info!(
        level,
        entities = system.registry().len(),
        "level spawned"
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use save_runtime::{InMemorySaveRepo, PreferenceStore};

    #[test]
    fn cutscene_opens_gate_after_its_frames() {
        let gate = ReadyFlag::new();
        gate.open();
        let mut cutscene = Cutscene::start(2, gate.clone());

        assert!(!save_runtime::ReadinessGate::is_ready(&gate));
        assert!(!cutscene.advance());
        assert!(cutscene.advance());
        assert!(save_runtime::ReadinessGate::is_ready(&gate));
    }

    #[test]
    fn respawning_replaces_the_registry() {
        let mut system = SaveSystem::builder()
            .repository(InMemorySaveRepo::new())
            .preferences(PreferenceStore::in_memory())
            .build()
            .unwrap();

        spawn(&mut system, ASYLUM).unwrap();
        let asylum = system.registry().len();
        spawn(&mut system, TUNNEL).unwrap();

        assert_eq!(asylum, 6);
        assert_eq!(system.registry().len(), 7);
    }
}
