//! In-memory character collection
//!
//! Appends keep insertion order; replacements never reorder. Identifiers are
//! unique within the collection.

use quill_entity::{Character, EntityId, StoredCharacter};

/// Ordered sequence of characters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    items: Vec<Character>,
}

impl Collection {
    /// Create empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection from durable rows, keeping their order
    #[must_use]
    pub fn from_rows(rows: Vec<StoredCharacter>) -> Self {
        let mut collection = Self::new();
        for row in rows {
            let character = Character::from(row);
            if collection.contains(character.id) {
                tracing::warn!(id = %character.id, "duplicate row from store skipped");
                continue;
            }
            collection.items.push(character);
        }
        collection
    }

    /// Number of characters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Characters in order
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Character] {
        &self.items
    }

    /// Iterate in order
    pub fn iter(&self) -> std::slice::Iter<'_, Character> {
        self.items.iter()
    }

    /// Position of the character with this id
    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.items.iter().position(|c| c.id == id)
    }

    /// Character with this id
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Character> {
        self.items.iter().find(|c| c.id == id)
    }

    /// True if a character has this id
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    pub(crate) fn push(&mut self, character: Character) {
        debug_assert!(!self.contains(character.id), "duplicate id {}", character.id);
        self.items.push(character);
    }

    /// Replace the character with id `id` at its position
    ///
    /// The replacement may carry a different id (local → persisted swap).
    /// Returns false if `id` is absent.
    pub(crate) fn replace(&mut self, id: EntityId, character: Character) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.items[idx] = character;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Character> {
        self.position(id).map(|idx| self.items.remove(idx))
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Character;
    type IntoIter = std::slice::Iter<'a, Character>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
