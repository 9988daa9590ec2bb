//! Character entity and its durable representations

use crate::error::{Field, InputError};
use crate::id::{EntityId, StoreId};
use serde::{Deserialize, Serialize};

/// A character in the in-memory collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    /// Local while the insert is in flight, persisted afterwards
    pub id: EntityId,
    /// Display name, never empty
    pub name: String,
    /// Short description
    pub summary: String,
    /// Epoch millis, set once on creation
    pub created_at: i64,
    /// Epoch millis, set on every successful mutation
    pub updated_at: i64,
}

impl Character {
    /// Normalized durable row for this character (identifier dropped)
    #[must_use]
    pub fn record(&self) -> CharacterRecord {
        CharacterRecord {
            name: self.name.clone(),
            summary: self.summary.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Durable row with id, or `None` while the id is still local
    #[must_use]
    pub fn to_stored(&self) -> Option<StoredCharacter> {
        self.id.as_persisted().map(|id| StoredCharacter {
            id,
            record: self.record(),
        })
    }

    /// Build from a record and an identifier
    #[must_use]
    pub fn from_record(id: EntityId, record: CharacterRecord) -> Self {
        Self {
            id,
            name: record.name,
            summary: record.summary,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<StoredCharacter> for Character {
    fn from(stored: StoredCharacter) -> Self {
        Self::from_record(EntityId::Persisted(stored.id), stored.record)
    }
}

/// Durable row without identifier, as handed to `insert`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    /// Display name
    pub name: String,
    /// Short description
    pub summary: String,
    /// Epoch millis
    pub created_at: i64,
    /// Epoch millis
    pub updated_at: i64,
}

/// Durable row with its store-assigned identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCharacter {
    /// Store-assigned identifier
    pub id: StoreId,
    /// Row fields
    #[serde(flatten)]
    pub record: CharacterRecord,
}

/// Input to the create operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCharacter {
    /// Display name
    pub name: String,
    /// Short description
    pub summary: String,
}

impl NewCharacter {
    /// Create input
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
        }
    }

    /// Reject blank required fields
    ///
    /// # Errors
    /// `InputError::Missing` naming the first blank field
    pub fn check(&self) -> Result<(), InputError> {
        require(&self.name, Field::Name)?;
        require(&self.summary, Field::Summary)
    }
}

/// Input to the update operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterUpdate {
    /// Target character
    pub id: EntityId,
    /// Replacement name
    pub name: String,
    /// Replacement summary
    pub summary: String,
}

impl CharacterUpdate {
    /// Create update input
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            summary: summary.into(),
        }
    }

    /// Reject blank required fields
    ///
    /// # Errors
    /// `InputError::Missing` naming the first blank field
    pub fn check(&self) -> Result<(), InputError> {
        require(&self.name, Field::Name)?;
        require(&self.summary, Field::Summary)
    }
}

fn require(value: &str, field: Field) -> Result<(), InputError> {
    if value.trim().is_empty() {
        Err(InputError::Missing(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::LocalId;

    fn sample(id: EntityId) -> Character {
        Character {
            id,
            name: "Ava".to_string(),
            summary: "A pilot.".to_string(),
            created_at: 10,
            updated_at: 20,
        }
    }

    #[test]
    fn record_drops_identifier() {
        let record = sample(EntityId::Persisted(StoreId(1))).record();
        assert_eq!(record.name, "Ava");
        assert_eq!(record.created_at, 10);
        assert_eq!(record.updated_at, 20);
    }

    #[test]
    fn to_stored_requires_persisted_id() {
        assert!(sample(EntityId::Local(LocalId::next())).to_stored().is_none());

        let stored = sample(EntityId::Persisted(StoreId(4))).to_stored().unwrap();
        assert_eq!(stored.id, StoreId(4));
        assert_eq!(Character::from(stored), sample(EntityId::Persisted(StoreId(4))));
    }

    #[test]
    fn stored_row_json_shape() {
        let stored = sample(EntityId::Persisted(StoreId(2))).to_stored().unwrap();
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 2,
                "name": "Ava",
                "summary": "A pilot.",
                "createdAt": 10,
                "updatedAt": 20
            })
        );

        let back: StoredCharacter = serde_json::from_value(json).unwrap();
        assert_eq!(back, stored);
    }

    #[test]
    fn new_character_rejects_blank_fields() {
        assert!(NewCharacter::new("Ava", "A pilot.").check().is_ok());
        assert!(matches!(
            NewCharacter::new("  ", "A pilot.").check(),
            Err(InputError::Missing(Field::Name))
        ));
        assert!(matches!(
            NewCharacter::new("Ava", "").check(),
            Err(InputError::Missing(Field::Summary))
        ));
    }

    #[test]
    fn update_rejects_blank_fields() {
        let update = CharacterUpdate::new(StoreId(1), "Ava", "\n\t");
        assert!(matches!(update.check(), Err(InputError::Missing(Field::Summary))));
    }
}
