//! Session metadata recorded alongside each save.

use super::PreferenceStore;

const SAVED_LEVEL: &str = "session.saved_level";
const RESUME_IN_PLACE: &str = "session.resume_in_place";

/// Which level to boot into on the next launch, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMetadata {
    /// Level tag of the most recent save.
    pub saved_level: Option<String>,
    /// True when the save was a checkpoint inside `saved_level`, so entity
    /// state should be restored after the level loads. False when the save
    /// was taken while moving on to `saved_level`.
    pub resume_in_place: bool,
}

impl SessionMetadata {
    pub fn load(store: &PreferenceStore) -> Self {
        Self {
            saved_level: store.get_text(SAVED_LEVEL).map(str::to_owned),
            resume_in_place: store.get_bool(RESUME_IN_PLACE).unwrap_or(false),
        }
    }

    pub fn store(&self, store: &mut PreferenceStore) {
        match &self.saved_level {
            Some(level) => store.set_text(SAVED_LEVEL, level.as_str()),
            None => {
                store.remove(SAVED_LEVEL);
            }
        }
        store.set_bool(RESUME_IN_PLACE, self.resume_in_place);
    }

    /// Forgets the saved level, as a new game does.
    pub fn clear(store: &mut PreferenceStore) {
        store.remove(SAVED_LEVEL);
        store.set_bool(RESUME_IN_PLACE, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_no_session() {
        let store = PreferenceStore::in_memory();
        assert_eq!(SessionMetadata::load(&store), SessionMetadata::default());
    }

    #[test]
    fn store_then_clear() {
        let mut store = PreferenceStore::in_memory();
        SessionMetadata {
            saved_level: Some("Tunnel".into()),
            resume_in_place: true,
        }
        .store(&mut store);

        let loaded = SessionMetadata::load(&store);
        assert_eq!(loaded.saved_level.as_deref(), Some("Tunnel"));
        assert!(loaded.resume_in_place);

        SessionMetadata::clear(&mut store);
        assert_eq!(SessionMetadata::load(&store), SessionMetadata::default());
    }
}
