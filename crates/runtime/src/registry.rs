//! Explicit registry of the entities that take part in save and load.

use std::collections::BTreeMap;

use save_core::{ConfigError, Identity, SaveableEntity};
use tracing::debug;

/// Entities currently present in the scene, ordered by identity.
///
/// Hosts register an entity when it is created and unregister it when it is
/// destroyed. Disabled or hidden entities stay registered.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<Identity, SaveableEntity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity, rejecting an identity that is already registered.
    pub fn register(&mut self, entity: SaveableEntity) -> Result<(), ConfigError> {
        let identity = entity.identity().clone();
        if self.entities.contains_key(&identity) {
            return Err(ConfigError::IdentityCollision(identity));
        }

        debug!(
            target: "save::registry",
            identity = %identity,
            capabilities = entity.len(),
            "registered entity"
        );
        self.entities.insert(identity, entity);
        Ok(())
    }

    /// Removes an entity, handing it back to the caller.
    pub fn unregister(&mut self, identity: &Identity) -> Option<SaveableEntity> {
        let removed = self.entities.remove(identity);
        if removed.is_some() {
            debug!(target: "save::registry", identity = %identity, "unregistered entity");
        }
        removed
    }

    pub fn get(&self, identity: &Identity) -> Option<&SaveableEntity> {
        self.entities.get(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.entities.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drops every registration, e.g. when the scene unloads.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Entities in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &SaveableEntity> + '_ {
        self.entities.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(token: &str) -> SaveableEntity {
        SaveableEntity::new(Identity::new(token).unwrap())
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let mut registry = EntityRegistry::new();
        registry.register(entity("door-1")).unwrap();

        let err = registry.register(entity("door-1")).unwrap_err();

        assert_eq!(
            err,
            ConfigError::IdentityCollision(Identity::new("door-1").unwrap())
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn iteration_is_ordered_by_identity() {
        let mut registry = EntityRegistry::new();
        for token in ["zombie", "ammo", "player"] {
            registry.register(entity(token)).unwrap();
        }

        let order: Vec<_> = registry.iter().map(|e| e.identity().as_str()).collect();
        assert_eq!(order, vec!["ammo", "player", "zombie"]);
    }

    #[test]
    fn unregister_frees_the_identity() {
        let mut registry = EntityRegistry::new();
        let id = Identity::new("medkit").unwrap();
        registry.register(entity("medkit")).unwrap();

        assert!(registry.unregister(&id).is_some());
        assert!(registry.unregister(&id).is_none());
        registry.register(entity("medkit")).unwrap();
        assert!(registry.contains(&id));
    }
}
