//! Gameplay components that persist through the capability contract.

use std::collections::BTreeMap;

use save_core::{Capability, CapsuleError, FieldValue, StateCapsule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerHealth {
    pub hp: f32,
}

impl PlayerHealth {
    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).max(0.0);
    }
}

impl Capability for PlayerHealth {
    fn kind(&self) -> &'static str {
        "player_health"
    }

    fn capture(&self) -> StateCapsule {
        StateCapsule::builder().field("hp", self.hp).build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        self.hp = capsule.get_f32("hp")?;
        Ok(())
    }
}

/// Physical body. Collisions are off while a restore teleports it so it
/// does not shove whatever stands at the saved spot.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: [f32; 3],
    pub collisions_enabled: bool,
}

impl Body {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            collisions_enabled: true,
        }
    }

    fn warp(&mut self, position: [f32; 3]) {
        self.collisions_enabled = false;
        self.position = position;
        self.collisions_enabled = true;
    }
}

impl Capability for Body {
    fn kind(&self) -> &'static str {
        "body"
    }

    fn capture(&self) -> StateCapsule {
        StateCapsule::builder()
            .field("position", self.position)
            .build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        let position = capsule.get_vec3("position")?;
        self.warp(position);
        Ok(())
    }
}

/// World item that disappears once collected.
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub picked_up: bool,
    pub visible: bool,
}

impl Pickup {
    pub fn new() -> Self {
        Self {
            picked_up: false,
            visible: true,
        }
    }

    pub fn collect(&mut self) {
        self.picked_up = true;
        self.visible = false;
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
        self.visible = !self.picked_up;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlashLight {
    pub intensity: f32,
    pub spot_angle: f32,
}

impl FlashLight {
    /// Battery drain for one tick.
    pub fn drain(&mut self, intensity: f32, angle: f32) {
        self.intensity = (self.intensity - intensity).max(0.0);
        self.spot_angle = (self.spot_angle - angle).max(40.0);
    }

    pub fn recharge(&mut self) {
        self.intensity = 2.0;
        self.spot_angle = 70.0;
    }
}

impl Capability for FlashLight {
    fn kind(&self) -> &'static str {
        "flashlight"
    }

    fn capture(&self) -> StateCapsule {
        StateCapsule::builder()
            .field("intensity", self.intensity)
            .field("spot_angle", self.spot_angle)
            .build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        self.intensity = capsule.get_f32("intensity")?;
        self.spot_angle = capsule.get_f32("spot_angle")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmmoType {
    Bullets,
    Shells,
}

impl AmmoType {
    /// Matches the serde name, so [`StateCapsule::to_record`] reads it back.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullets => "bullets",
            Self::Shells => "shells",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmoSlot {
    pub ammo_type: AmmoType,
    pub amount: i64,
}

/// Ammo carried per type. Restored through a serde record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmoPouch {
    pub slots: Vec<AmmoSlot>,
}

impl AmmoPouch {
    pub fn amount(&self, ammo_type: AmmoType) -> i64 {
        self.slots
            .iter()
            .find(|slot| slot.ammo_type == ammo_type)
            .map_or(0, |slot| slot.amount)
    }

    pub fn add(&mut self, ammo_type: AmmoType, amount: i64) {
        match self.slots.iter_mut().find(|slot| slot.ammo_type == ammo_type) {
            Some(slot) => slot.amount += amount,
            None => self.slots.push(AmmoSlot { ammo_type, amount }),
        }
    }
}

impl Capability for AmmoPouch {
    fn kind(&self) -> &'static str {
        "ammo"
    }

    fn capture(&self) -> StateCapsule {
        let slots: Vec<FieldValue> = self
            .slots
            .iter()
            .map(|slot| {
                FieldValue::Record(BTreeMap::from([
                    ("ammo_type".to_string(), slot.ammo_type.as_str().into()),
                    ("amount".to_string(), slot.amount.into()),
                ]))
            })
            .collect();

        StateCapsule::builder()
            .field("slots", FieldValue::List(slots))
            .build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        *self = capsule.to_record()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponInventory {
    pub current_weapon: u32,
    pub obtained: BTreeMap<String, bool>,
}

impl WeaponInventory {
    pub fn obtain(&mut self, slot: u32) {
        self.obtained.insert(slot.to_string(), true);
        self.current_weapon = slot;
    }
}

impl Capability for WeaponInventory {
    fn kind(&self) -> &'static str {
        "weapons"
    }

    fn capture(&self) -> StateCapsule {
        let obtained = self
            .obtained
            .iter()
            .map(|(slot, owned)| (slot.clone(), FieldValue::Bool(*owned)))
            .collect();

        StateCapsule::builder()
            .field("current_weapon", self.current_weapon)
            .field("obtained", FieldValue::Record(obtained))
            .build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        *self = capsule.to_record()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Magazine {
    pub rounds: i64,
}

impl Capability for Magazine {
    fn kind(&self) -> &'static str {
        "magazine"
    }

    fn capture(&self) -> StateCapsule {
        StateCapsule::builder().field("rounds", self.rounds).build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        self.rounds = capsule.get_int("rounds")?;
        Ok(())
    }
}

/// Enemy vitals plus where the body lies.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyHealth {
    pub dead: bool,
    pub body: Body,
}

impl Capability for EnemyHealth {
    fn kind(&self) -> &'static str {
        "enemy_health"
    }

    fn capture(&self) -> StateCapsule {
        StateCapsule::builder()
            .field("dead", self.dead)
            .field("position", self.body.position)
            .build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        let position = capsule.get_vec3("position")?;
        self.dead = capsule.get_bool("dead")?;
        self.body.warp(position);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyAlert {
    pub provoked: bool,
}

impl Capability for EnemyAlert {
    fn kind(&self) -> &'static str {
        "enemy_alert"
    }

    fn capture(&self) -> StateCapsule {
        StateCapsule::builder()
            .field("provoked", self.provoked)
            .build()
    }

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
        self.provoked = capsule.get_bool("provoked")?;
        Ok(())
    }
}
