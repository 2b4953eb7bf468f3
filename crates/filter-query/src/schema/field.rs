//! Searchable field definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ast::Operator;

/// Declared storage type of a searchable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Short string.
    String,
    /// Long text.
    Text,
    /// Whole number.
    Integer,
    /// Floating point number.
    Float,
    /// Fixed point number.
    Decimal,
    /// Calendar date without time of day.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    Timestamp,
}

impl FieldType {
    /// String or text.
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Text)
    }

    /// Integer, float or decimal.
    pub fn is_numerical(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float | FieldType::Decimal)
    }

    /// Date, time or timestamp.
    pub fn is_temporal(&self) -> bool {
        self.is_date_only() || self.is_datetime()
    }

    /// Date without a time component.
    pub fn is_date_only(&self) -> bool {
        matches!(self, FieldType::Date)
    }

    /// Carries a time of day.
    pub fn is_datetime(&self) -> bool {
        matches!(self, FieldType::Time | FieldType::Timestamp)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Text => write!(f, "text"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::Decimal => write!(f, "decimal"),
            FieldType::Date => write!(f, "date"),
            FieldType::Time => write!(f, "time"),
            FieldType::Timestamp => write!(f, "timestamp"),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "text" => Ok(FieldType::Text),
            "integer" => Ok(FieldType::Integer),
            "float" => Ok(FieldType::Float),
            "decimal" => Ok(FieldType::Decimal),
            "date" => Ok(FieldType::Date),
            "time" => Ok(FieldType::Time),
            "timestamp" | "datetime" => Ok(FieldType::Timestamp),
            _ => Err(format!("unknown field type: {}", s)),
        }
    }
}

/// Value stored behind an enumerated name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// A flag; the field is boolean.
    Bool(bool),
    /// A numeric code.
    Integer(i64),
    /// A string code.
    Text(String),
}

impl StoredValue {
    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StoredValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// One entry of an enumerated field's value mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumeratedValue {
    /// The name users type.
    pub name: String,
    /// The value the remote API stores.
    pub value: StoredValue,
}

/// Definition of one searchable field.
///
/// A field is either a plain scalar or, when `values` is non-empty, an
/// enumerated ("set") field whose user-facing names map to stored values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Canonical field name.
    pub name: String,

    /// Declared storage type.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Excluded from implicit keyword search when set.
    #[serde(default)]
    pub only_explicit: bool,

    /// Alternative names resolving to this field.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Operator allow-list offered to completion tooling.
    #[serde(default)]
    pub operators: Option<Vec<Operator>>,

    /// Enumerated name to stored value mapping, in declaration order.
    #[serde(default)]
    pub values: Vec<EnumeratedValue>,

    /// Overrides the derived default operator.
    #[serde(default)]
    pub default_operator: Option<Operator>,
}

impl FieldDefinition {
    /// Creates a plain scalar field that takes part in implicit search.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            only_explicit: false,
            aliases: Vec::new(),
            operators: None,
            values: Vec::new(),
            default_operator: None,
        }
    }

    /// Marks the field as searchable only by explicit name.
    pub fn only_explicit(mut self) -> Self {
        self.only_explicit = true;
        self
    }

    /// Sets the aliases.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the operator allow-list.
    pub fn with_operators(mut self, operators: impl IntoIterator<Item = Operator>) -> Self {
        self.operators = Some(operators.into_iter().collect());
        self
    }

    /// Sets the enumerated value mapping.
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (S, StoredValue)>,
        S: Into<String>,
    {
        self.values = values
            .into_iter()
            .map(|(name, value)| EnumeratedValue {
                name: name.into(),
                value,
            })
            .collect();
        self
    }

    /// Overrides the default operator.
    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = Some(operator);
        self
    }

    /// Operator used for implicit keyword search: `like` for textual fields,
    /// `eq` otherwise, unless overridden.
    pub fn default_operator(&self) -> Operator {
        self.default_operator.unwrap_or(if self.field_type.is_textual() {
            Operator::Like
        } else {
            Operator::Eq
        })
    }

    /// Returns true for enumerated ("set") fields.
    pub fn is_enumerated(&self) -> bool {
        !self.values.is_empty()
    }

    /// Looks up the stored value for an enumerated name (exact match).
    pub fn stored_value(&self, name: &str) -> Option<&StoredValue> {
        self.values
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    /// For boolean fields, the first enumerated name mapped to `true`.
    pub fn true_key(&self) -> Option<&str> {
        self.values
            .iter()
            .find(|entry| entry.value == StoredValue::Bool(true))
            .map(|entry| entry.name.as_str())
    }

    /// Reference to this field in the compiled query string.
    pub fn attribute_reference(&self) -> String {
        format!("{}[]=", self.name)
    }

    /// The canonical name followed by all aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}
