//! Per-entity bundles and the save file map built from them.

use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capsule::StateCapsule;
use crate::identity::Identity;

/// Stable key a capability declares for its capsules.
///
/// Kinds are chosen by the capability author and persisted verbatim, so they
/// must not change between builds that share save files.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityKind(Cow<'static, str>);

impl CapabilityKind {
    pub const fn from_static(kind: &'static str) -> Self {
        Self(Cow::Borrowed(kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for CapabilityKind {
    fn from(kind: &'static str) -> Self {
        Self::from_static(kind)
    }
}

impl Borrow<str> for CapabilityKind {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of every capability on one entity, keyed by capability kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityBundle {
    capsules: BTreeMap<CapabilityKind, StateCapsule>,
}

impl EntityBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a capsule, returning the one it replaced.
    pub fn insert(
        &mut self,
        kind: impl Into<CapabilityKind>,
        capsule: StateCapsule,
    ) -> Option<StateCapsule> {
        self.capsules.insert(kind.into(), capsule)
    }

    pub fn get(&self, kind: &str) -> Option<&StateCapsule> {
        self.capsules.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.get(kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.capsules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capsules.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &CapabilityKind> + '_ {
        self.capsules.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, CapabilityKind, StateCapsule> {
        self.capsules.iter()
    }
}

/// The persisted artifact: every saved entity's bundle, keyed by identity.
///
/// A save file is partial by design. It may omit entities that exist in the
/// current scene and may hold entities that are not loaded right now.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveFile {
    entities: BTreeMap<Identity, EntityBundle>,
}

impl SaveFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bundle` under `identity`, replacing any earlier entry.
    ///
    /// This is the last-write-wins merge rule: entries for other identities
    /// are never touched.
    pub fn merge(&mut self, identity: Identity, bundle: EntityBundle) -> Option<EntityBundle> {
        self.entities.insert(identity, bundle)
    }

    pub fn get(&self, identity: &Identity) -> Option<&EntityBundle> {
        self.entities.get(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.entities.contains_key(identity)
    }

    pub fn remove(&mut self, identity: &Identity) -> Option<EntityBundle> {
        self.entities.remove(identity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn identities(&self) -> impl Iterator<Item = &Identity> + '_ {
        self.entities.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Identity, EntityBundle> {
        self.entities.iter()
    }
}

impl FromIterator<(Identity, EntityBundle)> for SaveFile {
    fn from_iter<I: IntoIterator<Item = (Identity, EntityBundle)>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(hp: f32) -> StateCapsule {
        StateCapsule::builder().field("hp", hp).build()
    }

    #[test]
    fn bundle_lookup_by_kind() {
        let mut bundle = EntityBundle::new();
        assert!(bundle.insert("health", health(40.0)).is_none());

        assert!(bundle.contains("health"));
        assert!(!bundle.contains("position"));
        assert_eq!(bundle.get("health"), Some(&health(40.0)));
    }

    #[test]
    fn merge_replaces_only_the_given_identity() {
        let kept = Identity::new("graveyard-gate").unwrap();
        let updated = Identity::new("player").unwrap();

        let mut old_bundle = EntityBundle::new();
        old_bundle.insert("health", health(100.0));

        let mut file: SaveFile = [
            (kept.clone(), old_bundle.clone()),
            (updated.clone(), old_bundle.clone()),
        ]
        .into_iter()
        .collect();

        let mut new_bundle = EntityBundle::new();
        new_bundle.insert("health", health(15.0));

        let previous = file.merge(updated.clone(), new_bundle.clone());

        assert_eq!(previous, Some(old_bundle.clone()));
        assert_eq!(file.get(&updated), Some(&new_bundle));
        assert_eq!(file.get(&kept), Some(&old_bundle));
        assert_eq!(file.len(), 2);
    }
}
