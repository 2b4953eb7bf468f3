//! Field registry.
//!
//! The registry is built once, when the host registers its searchable schema,
//! and is read-only afterwards. Lookups go by canonical name or alias; dotted
//! names (`owner.name`) fall back to the segment before the first `.`.
//!
//! Field names and aliases are limited to ASCII letters, digits, `_`, `-`
//! and `.` since the canonical name is written into the query string as is.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

use super::field::FieldDefinition;
use super::temporal::TemporalParser;

static FIELD_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").expect("field name pattern is valid")
});

/// Schema document accepted by [`FieldRegistry::from_json`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Field definitions in registration order.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Immutable mapping of field names to definitions.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    /// Definitions in registration order.
    fields: Vec<Arc<FieldDefinition>>,

    /// Canonical names and aliases, indexed into `fields`.
    by_name: HashMap<String, usize>,

    /// Indexes of fields eligible for implicit search.
    defaults: Vec<usize>,

    /// Pinned anchor for relative phrases; `None` follows the clock.
    reference_time: Option<NaiveDateTime>,
}

impl FieldRegistry {
    /// Starts building a registry.
    pub fn builder() -> FieldRegistryBuilder {
        FieldRegistryBuilder::new()
    }

    /// Builds a registry from a JSON schema document.
    ///
    /// ```
    /// use filter_query::schema::FieldRegistry;
    ///
    /// let registry = FieldRegistry::from_json(r#"{
    ///     "fields": [
    ///         {"name": "name", "type": "string", "aliases": ["hostname"]},
    ///         {"name": "memory", "type": "integer", "only_explicit": true}
    ///     ]
    /// }"#).unwrap();
    ///
    /// assert!(registry.field_by_name("hostname").is_some());
    /// assert_eq!(registry.default_fields().count(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let config: SchemaConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    /// Builds a registry from an already deserialized schema document.
    pub fn from_config(config: SchemaConfig) -> Result<Self, RegistryError> {
        let mut builder = Self::builder();
        for field in config.fields {
            builder = builder.register(field)?;
        }
        Ok(builder.build())
    }

    /// Resolves a field by name or alias, falling back to the prefix before
    /// the first `.` for dotted names.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDefinition> {
        self.by_name
            .get(name)
            .or_else(|| {
                name.split_once('.')
                    .and_then(|(prefix, _)| self.by_name.get(prefix))
            })
            .map(|&index| self.fields[index].as_ref())
    }

    /// Fields taking part in implicit keyword search, in registration order.
    pub fn default_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.defaults.iter().map(|&index| self.fields[index].as_ref())
    }

    /// All fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().map(Arc::as_ref)
    }

    /// The pinned reference instant, if any.
    pub fn reference_time(&self) -> Option<NaiveDateTime> {
        self.reference_time
    }

    /// A temporal parser anchored at the pinned reference instant, or at the
    /// local clock when nothing is pinned.
    ///
    /// The clock is read on every call; a compilation takes one parser and
    /// keeps it for its whole run.
    pub fn temporal(&self) -> TemporalParser {
        self.reference_time
            .map(TemporalParser::new)
            .unwrap_or_else(TemporalParser::now)
    }

    /// Parses a temporal literal against [`FieldRegistry::temporal`].
    pub fn temporal_parse(&self, value: &str) -> Option<NaiveDateTime> {
        self.temporal().parse(value)
    }

    /// Returns the number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Collects field definitions and validates them before freezing.
#[derive(Debug, Default)]
pub struct FieldRegistryBuilder {
    fields: Vec<Arc<FieldDefinition>>,
    by_name: HashMap<String, usize>,
    reference_time: Option<NaiveDateTime>,
}

impl FieldRegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field.
    ///
    /// Fails if the name or one of the aliases is malformed or already
    /// taken, or if an enumerated entry has an empty or repeated name.
    pub fn register(mut self, field: FieldDefinition) -> Result<Self, RegistryError> {
        if let Some(bad) = field.names().find(|name| !FIELD_NAME.is_match(name)) {
            return Err(RegistryError::InvalidDefinition {
                field: field.name.clone(),
                message: format!(
                    "'{}' is not a valid field name, use letters, digits, '_', '-' or '.'",
                    bad
                ),
            });
        }

        let mut seen = HashSet::new();
        for entry in &field.values {
            if entry.name.is_empty() {
                return Err(RegistryError::InvalidDefinition {
                    field: field.name.clone(),
                    message: "enumerated value names must not be empty".to_string(),
                });
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(RegistryError::InvalidDefinition {
                    field: field.name.clone(),
                    message: format!("enumerated value '{}' is listed twice", entry.name),
                });
            }
        }

        let index = self.fields.len();
        for name in field.names() {
            if self.by_name.contains_key(name) {
                return Err(RegistryError::DuplicateName {
                    name: name.to_string(),
                });
            }
        }
        for name in field.names() {
            self.by_name.insert(name.to_string(), index);
        }

        self.fields.push(Arc::new(field));
        Ok(self)
    }

    /// Anchors relative temporal phrases at `reference` instead of the clock
    /// read at compile time.
    pub fn with_reference_time(mut self, reference: NaiveDateTime) -> Self {
        self.reference_time = Some(reference);
        self
    }

    /// Freezes the registry.
    pub fn build(self) -> FieldRegistry {
        let defaults = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.only_explicit)
            .map(|(index, _)| index)
            .collect();

        FieldRegistry {
            fields: self.fields,
            by_name: self.by_name,
            defaults,
            reference_time: self.reference_time,
        }
    }
}
