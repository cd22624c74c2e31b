//! Core data types for the harvester.
//!
//! Raw records ([`Entity`], [`LocaleRecord`]) keep the server payload intact;
//! [`Envelope`] is the uniform wrapper emitted downstream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::HarvesterError;

/// Record categories a Pontoon harvester can fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Translatable strings with their history for one locale.
    #[default]
    Entity,

    /// Locales advertised by the server.
    Locale,
}

impl Category {
    /// Get the string value used in envelopes.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Locale => "locale",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = HarvesterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entity" => Ok(Self::Entity),
            "locale" => Ok(Self::Locale),
            other => Err(HarvesterError::InvalidCategory(other.to_string())),
        }
    }
}

/// Project an entity belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project slug (e.g., "amo").
    pub slug: String,

    /// Remaining project fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A translatable string as returned by the entities search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Server-assigned primary key.
    pub pk: u64,

    /// Owning project.
    pub project: Project,

    /// Locale the entity was fetched for. Set by the client.
    #[serde(default)]
    pub locale: String,

    /// History of the entity in `locale`. Set by the client.
    #[serde(default)]
    pub history_data: Vec<Value>,

    /// Remaining entity fields (original, translation, path, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A locale offered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleRecord {
    /// Locale code (e.g., "es").
    pub locale: String,

    /// Base address of the server the locale was listed by.
    pub url: String,
}

/// Raw record carried by an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Entity(Entity),
    Locale(LocaleRecord),
}

impl Item {
    /// Natural key of the record: the entity `pk` or the locale code.
    #[must_use]
    pub fn item_id(&self) -> String {
        match self {
            Self::Entity(entity) => entity.pk.to_string(),
            Self::Locale(locale) => locale.locale.clone(),
        }
    }

    /// Category the record belongs to.
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Entity(_) => Category::Entity,
            Self::Locale(_) => Category::Locale,
        }
    }
}

impl From<Entity> for Item {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

impl From<LocaleRecord> for Item {
    fn from(locale: LocaleRecord) -> Self {
        Self::Locale(locale)
    }
}

/// Cheap searchable projection of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFields {
    /// Plain natural key that feeds the uuid.
    pub item_id: String,
}

/// Uniform output record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Constant identifier of the harvester type.
    pub backend_name: String,

    /// Version of this crate.
    pub backend_version: String,

    /// Extraction time as UNIX seconds.
    pub timestamp: f64,

    /// Server address (plus locale for entities) the record came from.
    pub origin: String,

    /// Deterministic identity, see [`crate::identity::uuid`].
    pub uuid: String,

    /// Record category.
    pub category: Category,

    /// Searchable projection.
    pub search_fields: SearchFields,

    /// Grouping label.
    pub tag: String,

    /// The raw record.
    pub data: Item,
}
