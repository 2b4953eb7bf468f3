//! Field-type specific test generators.
//!
//! Each handler turns one `field op value` comparison into a [`Fragment`]
//! and records what it emitted in the [`CompileContext`].
//!
//! [`Fragment`]: super::Fragment
//! [`CompileContext`]: super::CompileContext

mod enumerated;
pub(crate) mod generic;
mod pattern;
mod temporal;

pub use enumerated::EnumeratedHandler;
pub use generic::GenericHandler;
pub use pattern::PatternHandler;
pub use temporal::TemporalHandler;

use crate::ast::Operator;
use crate::schema::{FieldDefinition, FieldType};

/// Which generator handles a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// Name lookup in the field's value mapping.
    Enumerated,
    /// Date or timestamp comparison.
    Temporal,
    /// `like` / `unlike` on text.
    Pattern,
    /// Anything else.
    Generic,
}

impl TestKind {
    /// Picks the generator for `field op value`.
    pub fn classify(field: &FieldDefinition, operator: Operator) -> Self {
        if field.is_enumerated() {
            return TestKind::Enumerated;
        }

        match field.field_type {
            FieldType::Date | FieldType::Time | FieldType::Timestamp => TestKind::Temporal,
            FieldType::String | FieldType::Text if operator.is_pattern() => TestKind::Pattern,
            FieldType::String
            | FieldType::Text
            | FieldType::Integer
            | FieldType::Float
            | FieldType::Decimal => TestKind::Generic,
        }
    }
}

/// `<attr> <op> ?`
pub(crate) fn comparison_text(field: &FieldDefinition, operator: Operator) -> String {
    format!(
        "{} {} ?",
        field.attribute_reference(),
        operator.target_literal()
    )
}
