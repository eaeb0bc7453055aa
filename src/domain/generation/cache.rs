//! Session-scoped cache of validated provider question sets.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::questionnaire::{QuestionSet, QuestionStep};

/// Separator used when rendering a key; never appears in a category or step name.
const KEY_SEPARATOR: char = '\u{1f}';

/// Composite cache key of product category and step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub category: String,
    pub step: QuestionStep,
}

impl CacheKey {
    pub fn new(category: impl Into<String>, step: QuestionStep) -> Self {
        Self {
            category: category.into(),
            step,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.category, KEY_SEPARATOR, self.step)
    }
}

/// Clonable handle to one session's cache.
///
/// Only provider-produced, validated, non-empty sets are stored here.
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct QuestionCache {
    entries: Arc<Mutex<HashMap<CacheKey, QuestionSet>>>,
}

impl QuestionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, QuestionSet>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<QuestionSet> {
        self.lock().get(key).cloned()
    }

    /// Stores a set, ignoring empty ones.
    pub fn insert(&self, key: CacheKey, questions: QuestionSet) {
        if questions.is_empty() {
            return;
        }
        self.lock().insert(key, questions);
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::FallbackCatalog;

    #[test]
    fn keys_differ_by_step_and_category() {
        let a = CacheKey::new("food", QuestionStep::Testing);
        let b = CacheKey::new("food", QuestionStep::Manufacturing);
        let c = CacheKey::new("electronics", QuestionStep::Testing);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, CacheKey::new("food", QuestionStep::Testing));
    }

    #[test]
    fn display_uses_non_colliding_separator() {
        let key = CacheKey::new("food", QuestionStep::Testing);
        assert_eq!(key.to_string(), "food\u{1f}testing");
    }

    #[test]
    fn clones_share_entries() {
        let cache = QuestionCache::new();
        let handle = cache.clone();
        let set = FallbackCatalog::builtin().lookup("food", QuestionStep::Testing);

        handle.insert(CacheKey::new("food", QuestionStep::Testing), set.clone());

        let hit = cache.get(&CacheKey::new("food", QuestionStep::Testing)).unwrap();
        assert!(QuestionSet::ptr_eq(&hit, &set));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn empty_sets_are_not_stored() {
        let cache = QuestionCache::new();
        cache.insert(CacheKey::new("food", QuestionStep::Testing), QuestionSet::default());
        assert!(cache.is_empty());
    }
}
