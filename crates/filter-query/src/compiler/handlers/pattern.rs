//! `like` / `unlike` handler.

use tracing::trace;

use crate::ast::Operator;
use crate::compiler::{CompileContext, Fragment, ParamValue};
use crate::error::{QueryError, Result};
use crate::schema::FieldDefinition;

use super::comparison_text;

/// Handles pattern comparisons on textual fields.
pub struct PatternHandler;

impl PatternHandler {
    /// Rejects pattern operators on fields that are not textual.
    pub fn check(field: &FieldDefinition, operator: Operator) -> Result<()> {
        if operator.is_pattern() && !field.field_type.is_textual() {
            return Err(QueryError::not_supported(format!(
                "operator '{}' is only supported on textual fields, '{}' is {}",
                operator.token(),
                field.name,
                field.field_type
            )));
        }
        Ok(())
    }

    /// Builds `<attr> LIKE ?` with the value wrapped in wildcards.
    ///
    /// A value without a leading or trailing `%`/`*` becomes `%value%`;
    /// otherwise wildcard runs collapse to a single `%`.
    pub fn build(
        field: &FieldDefinition,
        operator: Operator,
        value: &str,
        ctx: &mut CompileContext,
    ) -> Result<Fragment> {
        Self::check(field, operator)?;

        let pattern = wildcard_pattern(value);
        trace!(field = %field.name, %operator, %pattern, "pattern test");

        let fragment = Fragment::with_params(
            comparison_text(field, operator),
            vec![ParamValue::Text(pattern)],
        );
        ctx.record_test(&field.name, operator, &fragment.params);
        Ok(fragment)
    }
}

fn is_wildcard(c: char) -> bool {
    c == '%' || c == '*'
}

fn wildcard_pattern(value: &str) -> String {
    if !value.starts_with(is_wildcard) && !value.ends_with(is_wildcard) {
        return format!("%{}%", value);
    }

    let mut pattern = String::with_capacity(value.len());
    for c in value.chars() {
        if is_wildcard(c) {
            if !pattern.ends_with('%') {
                pattern.push('%');
            }
        } else {
            pattern.push(c);
        }
    }
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    #[test]
    fn test_wraps_plain_value() {
        let field = FieldDefinition::new("name", FieldType::String);
        let mut ctx = CompileContext::new();
        let frag = PatternHandler::build(&field, Operator::Like, "bo", &mut ctx).unwrap();

        assert_eq!(frag.text, "name[]= LIKE ?");
        assert_eq!(frag.params, vec![ParamValue::text("%bo%")]);
    }

    #[test]
    fn test_unlike_literal() {
        let field = FieldDefinition::new("name", FieldType::Text);
        let mut ctx = CompileContext::new();
        let frag = PatternHandler::build(&field, Operator::Unlike, "bo", &mut ctx).unwrap();

        assert_eq!(frag.text, "name[]= NOT LIKE ?");
    }

    #[test]
    fn test_collapses_wildcards() {
        assert_eq!(wildcard_pattern("bo*"), "bo%");
        assert_eq!(wildcard_pattern("**bo%*"), "%bo%");
        assert_eq!(wildcard_pattern("%b*%*o"), "%b%o");
        assert_eq!(wildcard_pattern("b*o"), "%b*o%");
    }

    #[test]
    fn test_rejects_numeric_field() {
        let field = FieldDefinition::new("memory", FieldType::Integer);
        let mut ctx = CompileContext::new();
        let err = PatternHandler::build(&field, Operator::Like, "4", &mut ctx).unwrap_err();

        assert!(err.reason().contains("only supported on textual fields"));
        assert_eq!(ctx.parameter_count(), 0);
    }
}
