//! Search phrase to filter-query compiler.
//!
//! This crate translates free-text or structured search phrases into the
//! filter-query string a remote read-only data API accepts. A schema of
//! searchable fields drives the translation: each field type has its own
//! operator rules, value heuristics and rewrites.
//!
//! # Architecture
//!
//! - [`ast`] - the search expression tree
//! - [`parser`] - text to tree
//! - [`schema`] - field definitions, the frozen registry, temporal parsing
//! - [`compiler`] - tree to fragments, per-type handlers, final assembly
//! - [`error`] - error types
//!
//! # Quick Start
//!
//! ```
//! use filter_query::{compile_str, schema::{FieldDefinition, FieldRegistry, FieldType}};
//!
//! let registry = FieldRegistry::builder()
//!     .register(FieldDefinition::new("name", FieldType::String))
//!     .unwrap()
//!     .register(FieldDefinition::new("memory", FieldType::Integer).only_explicit())
//!     .unwrap()
//!     .build();
//!
//! assert_eq!(compile_str(&registry, "name = bob").unwrap(), "?name[]=+%3D+bob");
//! assert_eq!(compile_str(&registry, "memory > 512").unwrap(), "?memory[]=+>+512");
//! assert_eq!(compile_str(&registry, "web").unwrap(), "?name[]=+LIKE+%25web%25");
//! ```
//!
//! # Output format
//!
//! Every field test renders as `name[]=<operator and value>`. Tests that must
//! all hold are separated by `&`; alternatives for one implicit keyword are
//! joined with `+OR+`. A query that produces no tests compiles to `?`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ast;
pub mod compiler;
pub mod error;
pub mod parser;
pub mod schema;

pub use error::{ParseError, QueryError, RegistryError, Result};

use tracing::debug;

use ast::{Node, Operator};
use compiler::{Compile, CompileContext, ParamValue, assemble};
use schema::{FieldRegistry, FieldType};

/// Compiles a search tree into a filter-query string.
///
/// Fails with [`QueryError::NotSupported`] when the tree references unknown
/// fields, uses an operator a field does not accept, or has a shape the
/// compiler cannot express. No partial output is ever returned.
pub fn compile_query(registry: &FieldRegistry, ast: &Node) -> Result<String> {
    let mut ctx = CompileContext::new();
    let fragment = ast.compile(registry, &mut ctx)?;
    let parameters: Vec<ParamValue> = ctx.parameters().cloned().collect();

    let query = assemble(fragment.as_ref(), &parameters);
    debug!(
        fragment = fragment.as_ref().map(|f| f.text.as_str()).unwrap_or(""),
        parameters = parameters.len(),
        %query,
        "compiled search query"
    );
    Ok(query)
}

/// Parses and compiles a search phrase. Blank input compiles to `?`.
pub fn compile_str(registry: &FieldRegistry, input: &str) -> Result<String> {
    match parser::parse(input)? {
        Some(ast) => compile_query(registry, &ast),
        None => Ok(assemble(None, &[])),
    }
}

/// Operator tokens offered for a field, for completion tooling.
///
/// An explicit allow-list on the field wins; otherwise the list follows the
/// field's kind.
pub fn operators_for(registry: &FieldRegistry, field_name: &str) -> Result<Vec<&'static str>> {
    let field = registry.field_by_name(field_name).ok_or_else(|| {
        QueryError::not_supported(format!(
            "unsupported field '{}', it cannot be classified",
            field_name
        ))
    })?;

    if let Some(operators) = &field.operators {
        return Ok(operators.iter().map(Operator::token).collect());
    }

    let operators: &[Operator] = if field.is_enumerated() {
        &[Operator::Eq, Operator::Ne]
    } else {
        match field.field_type {
            FieldType::Integer | FieldType::Float | FieldType::Decimal => &[
                Operator::Eq,
                Operator::Gt,
                Operator::Lt,
                Operator::Lte,
                Operator::Gte,
                Operator::Ne,
            ],
            FieldType::String | FieldType::Text => {
                &[Operator::Eq, Operator::Ne, Operator::Like, Operator::Unlike]
            }
            FieldType::Date | FieldType::Time | FieldType::Timestamp => &[
                Operator::Eq,
                Operator::Gt,
                Operator::Lt,
                Operator::Lte,
                Operator::Gte,
            ],
        }
    };
    Ok(operators.iter().map(Operator::token).collect())
}
