use std::sync::RwLock;

use crate::domain::test_case::ResultSet;

/// Holds the latest result set for the running session.
///
/// Each run replaces the previous set wholesale; nothing is merged or written
/// to disk.
#[derive(Default)]
pub struct SessionStore {
    current: RwLock<Option<ResultSet>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, result_set: ResultSet) {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Some(result_set);
    }

    pub fn current(&self) -> Option<ResultSet> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::GenerationMode;

    #[test]
    fn test_replace_supersedes_previous_run() {
        let store = SessionStore::new();
        assert!(store.current().is_none());

        store.replace(ResultSet::new(GenerationMode::Local, Vec::new()));
        store.replace(ResultSet::new(GenerationMode::Remote, Vec::new()));
        assert_eq!(store.current().unwrap().mode, GenerationMode::Remote);

        store.clear();
        assert!(store.current().is_none());
    }
}
