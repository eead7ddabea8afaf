//! Aggregation of one entity's capabilities under a stable identity.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::bundle::{CapabilityKind, EntityBundle};
use crate::capability::{Capability, CapabilityHandle};
use crate::error::{ConfigError, EntityError};
use crate::identity::Identity;

/// A persistable entity: one identity plus the capabilities attached to it.
///
/// Capability kinds are unique per entity. A second capability declaring an
/// already attached kind is rejected when it is attached, never at save time.
pub struct SaveableEntity {
    identity: Identity,
    capabilities: BTreeMap<CapabilityKind, CapabilityHandle>,
}

impl SaveableEntity {
    /// Creates an entity with no capabilities.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            capabilities: BTreeMap::new(),
        }
    }

    pub fn builder(identity: Identity) -> SaveableEntityBuilder {
        SaveableEntityBuilder {
            entity: Self::new(identity),
            error: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Replaces the identity with a freshly generated one.
    ///
    /// This is the only way an identity changes. Any save entry written
    /// under the old identity is orphaned.
    pub fn regenerate_identity(&mut self) -> &Identity {
        self.identity = Identity::generate();
        &self.identity
    }

    /// Attaches a capability, rejecting a duplicate kind.
    pub fn attach<C>(&mut self, capability: Arc<RwLock<C>>) -> Result<(), ConfigError>
    where
        C: Capability + 'static,
    {
        let kind = CapabilityKind::from_static(
            capability
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .kind(),
        );

        if self.capabilities.contains_key(&kind) {
            return Err(ConfigError::KindCollision {
                identity: self.identity.clone(),
                kind,
            });
        }

        let handle: CapabilityHandle = capability;
        self.capabilities.insert(kind, handle);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &CapabilityKind> + '_ {
        self.capabilities.keys()
    }

    /// Captures every attached capability into one bundle.
    pub fn capture_all(&self) -> Result<EntityBundle, EntityError> {
        let mut bundle = EntityBundle::new();

        for (kind, handle) in &self.capabilities {
            let capability = handle.read().map_err(|_| EntityError::LockPoisoned {
                identity: self.identity.clone(),
                kind: kind.clone(),
            })?;
            bundle.insert(kind.clone(), capability.capture());
        }

        debug!(
            target: "save::entity",
            identity = %self.identity,
            capsules = bundle.len(),
            "captured entity"
        );

        Ok(bundle)
    }

    /// Restores every attached capability that has a capsule in `bundle`.
    ///
    /// Capabilities without an entry are left untouched, so entities may gain
    /// capabilities after a save was written. Capsules for kinds this entity
    /// does not carry are ignored. Returns the number of restored
    /// capabilities.
    pub fn restore_all(&self, bundle: &EntityBundle) -> Result<usize, EntityError> {
        let mut restored = 0;

        for (kind, handle) in &self.capabilities {
            let Some(capsule) = bundle.get(kind.as_str()) else {
                debug!(
                    target: "save::entity",
                    identity = %self.identity,
                    kind = %kind,
                    "no capsule for capability, keeping current state"
                );
                continue;
            };

            let mut capability = handle.write().map_err(|_| EntityError::LockPoisoned {
                identity: self.identity.clone(),
                kind: kind.clone(),
            })?;
            capability
                .restore(capsule)
                .map_err(|source| EntityError::TypeMismatch {
                    identity: self.identity.clone(),
                    kind: kind.clone(),
                    source,
                })?;
            restored += 1;
        }

        Ok(restored)
    }
}

impl std::fmt::Debug for SaveableEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveableEntity")
            .field("identity", &self.identity)
            .field("kinds", &self.capabilities.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`SaveableEntity`] that reports the first configuration error.
pub struct SaveableEntityBuilder {
    entity: SaveableEntity,
    error: Option<ConfigError>,
}

impl SaveableEntityBuilder {
    #[must_use]
    pub fn with<C>(mut self, capability: Arc<RwLock<C>>) -> Self
    where
        C: Capability + 'static,
    {
        if self.error.is_none()
            && let Err(e) = self.entity.attach(capability)
        {
            self.error = Some(e);
        }
        self
    }

    pub fn build(self) -> Result<SaveableEntity, ConfigError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::shared;
    use crate::capsule::StateCapsule;
    use crate::error::CapsuleError;

    #[derive(Debug, PartialEq)]
    struct Health {
        hp: f32,
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

    #[derive(Debug, PartialEq)]
    struct Pickup {
        picked_up: bool,
        active: bool,
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
            if self.picked_up {
                self.active = false;
            }
            Ok(())
        }
    }

    fn id(token: &str) -> Identity {
        Identity::new(token).unwrap()
    }

    #[test]
    fn duplicate_kind_is_rejected_at_attach() {
        let result = SaveableEntity::builder(id("player"))
            .with(shared(Health { hp: 1.0 }))
            .with(shared(Health { hp: 2.0 }))
            .build();

        assert_eq!(
            result.unwrap_err(),
            ConfigError::KindCollision {
                identity: id("player"),
                kind: CapabilityKind::from_static("health"),
            }
        );
    }

    #[test]
    fn capture_all_keys_by_declared_kind() {
        let entity = SaveableEntity::builder(id("crate-7"))
            .with(shared(Health { hp: 40.0 }))
            .with(shared(Pickup {
                picked_up: true,
                active: false,
            }))
            .build()
            .unwrap();

        let bundle = entity.capture_all().unwrap();

        let kinds: Vec<_> = bundle.kinds().map(CapabilityKind::as_str).collect();
        assert_eq!(kinds, vec!["health", "pickup"]);
        assert_eq!(bundle.get("health").unwrap().get_f32("hp").unwrap(), 40.0);
    }

    #[test]
    fn restore_all_leaves_missing_kinds_untouched() {
        let health = shared(Health { hp: 100.0 });
        let pickup = shared(Pickup {
            picked_up: false,
            active: true,
        });
        let entity = SaveableEntity::builder(id("medkit"))
            .with(health.clone())
            .with(pickup.clone())
            .build()
            .unwrap();

        let mut bundle = EntityBundle::new();
        bundle.insert(
            "pickup",
            StateCapsule::builder().field("picked_up", true).build(),
        );
        bundle.insert("unknown", StateCapsule::default());

        let restored = entity.restore_all(&bundle).unwrap();

        assert_eq!(restored, 1);
        assert_eq!(health.read().unwrap().hp, 100.0);
        assert_eq!(
            *pickup.read().unwrap(),
            Pickup {
                picked_up: true,
                active: false
            }
        );
    }

    #[test]
    fn restore_all_is_idempotent() {
        let pickup = shared(Pickup {
            picked_up: false,
            active: true,
        });
        let entity = SaveableEntity::builder(id("battery"))
            .with(pickup.clone())
            .build()
            .unwrap();

        let mut bundle = EntityBundle::new();
        bundle.insert(
            "pickup",
            StateCapsule::builder().field("picked_up", true).build(),
        );

        entity.restore_all(&bundle).unwrap();
        let after_first = entity.capture_all().unwrap();
        entity.restore_all(&bundle).unwrap();
        let after_second = entity.capture_all().unwrap();

        assert_eq!(after_first, after_second);
        assert!(!pickup.read().unwrap().active);
    }

    #[test]
    fn wrong_shape_surfaces_as_type_mismatch() {
        let entity = SaveableEntity::builder(id("player"))
            .with(shared(Health { hp: 10.0 }))
            .build()
            .unwrap();

        let mut bundle = EntityBundle::new();
        bundle.insert("health", StateCapsule::builder().field("hp", "lots").build());

        let err = entity.restore_all(&bundle).unwrap_err();
        assert!(matches!(
            err,
            EntityError::TypeMismatch { ref kind, .. } if kind.as_str() == "health"
        ));
    }

    #[test]
    fn regenerate_identity_changes_the_token() {
        let mut entity = SaveableEntity::new(id("door"));
        let fresh = entity.regenerate_identity().clone();

        assert_ne!(fresh, id("door"));
        assert_eq!(entity.identity(), &fresh);
    }
}
