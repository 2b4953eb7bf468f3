//! Enumerated ("set") field handler.

use tracing::trace;

use crate::ast::Operator;
use crate::compiler::{CompileContext, Fragment, ParamValue};
use crate::error::{QueryError, Result};
use crate::schema::{FieldDefinition, StoredValue};

/// Handles fields restricted to a fixed name to stored-value mapping.
pub struct EnumeratedHandler;

impl EnumeratedHandler {
    /// Builds `[NOT ](<attr> <op> ?)` for an enumerated name.
    ///
    /// Boolean stored values are rewritten against zero for numerical
    /// fields (`true` as `> 0`, `false` as `= 0`) and against `false`
    /// otherwise (`true` as `<> false`, `false` as `= false`); a `ne` query
    /// on a boolean is expressed by the leading `NOT`.
    pub fn build(
        field: &FieldDefinition,
        operator: Operator,
        value: &str,
        ctx: &mut CompileContext,
    ) -> Result<Fragment> {
        let stored = field.stored_value(value).ok_or_else(|| {
            QueryError::not_supported(format!(
                "'{}' is not a valid value for field '{}'",
                value, field.name
            ))
        })?;

        if !matches!(operator, Operator::Eq | Operator::Ne) {
            return Err(QueryError::not_supported(format!(
                "operator '{}' is not supported for field '{}', use '=' or '!='",
                operator.token(),
                field.name
            )));
        }

        let (negate, target_op, param) = match stored {
            StoredValue::Bool(flag) => {
                let negate = operator == Operator::Ne;
                let (target_op, param) = match (field.field_type.is_numerical(), *flag) {
                    (true, true) => (Operator::Gt, ParamValue::Integer(0)),
                    (true, false) => (Operator::Eq, ParamValue::Integer(0)),
                    (false, true) => (Operator::Ne, ParamValue::Boolean(false)),
                    (false, false) => (Operator::Eq, ParamValue::Boolean(false)),
                };
                (negate, target_op, param)
            }
            StoredValue::Integer(i) => (false, operator, ParamValue::Integer(*i)),
            StoredValue::Text(s) => (false, operator, ParamValue::text(s)),
        };

        let text = format!(
            "{}({} {} ?)",
            if negate { "NOT " } else { "" },
            field.attribute_reference(),
            target_op.target_literal()
        );
        trace!(field = %field.name, %value, %text, "enumerated test");

        let fragment = Fragment::with_params(text, vec![param]);
        ctx.record_test(&field.name, target_op, &fragment.params);
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn numeric_flag() -> FieldDefinition {
        FieldDefinition::new("status", FieldType::Integer).with_values([
            ("active", StoredValue::Bool(true)),
            ("inactive", StoredValue::Bool(false)),
        ])
    }

    fn text_flag() -> FieldDefinition {
        FieldDefinition::new("managed", FieldType::String).with_values([
            ("yes", StoredValue::Bool(true)),
            ("no", StoredValue::Bool(false)),
        ])
    }

    fn build(field: &FieldDefinition, op: Operator, value: &str) -> Result<Fragment> {
        EnumeratedHandler::build(field, op, value, &mut CompileContext::new())
    }

    #[test]
    fn test_numeric_true() {
        let frag = build(&numeric_flag(), Operator::Eq, "active").unwrap();
        assert_eq!(frag.text, "(status[]= > ?)");
        assert_eq!(frag.params, vec![ParamValue::Integer(0)]);
    }

    #[test]
    fn test_numeric_false() {
        let frag = build(&numeric_flag(), Operator::Eq, "inactive").unwrap();
        assert_eq!(frag.text, "(status[]= = ?)");
        assert_eq!(frag.params, vec![ParamValue::Integer(0)]);
    }

    #[test]
    fn test_numeric_ne_negates() {
        let frag = build(&numeric_flag(), Operator::Ne, "active").unwrap();
        assert_eq!(frag.text, "NOT (status[]= > ?)");
    }

    #[test]
    fn test_text_true_and_false() {
        let yes = build(&text_flag(), Operator::Eq, "yes").unwrap();
        assert_eq!(yes.text, "(managed[]= <> ?)");
        assert_eq!(yes.params, vec![ParamValue::Boolean(false)]);

        let no = build(&text_flag(), Operator::Ne, "no").unwrap();
        assert_eq!(no.text, "NOT (managed[]= = ?)");
        assert_eq!(no.params, vec![ParamValue::Boolean(false)]);
    }

    #[test]
    fn test_plain_stored_values() {
        let field = FieldDefinition::new("state", FieldType::Integer).with_values([
            ("running", StoredValue::Integer(1)),
            ("stopped", StoredValue::Integer(2)),
        ]);

        let frag = build(&field, Operator::Ne, "stopped").unwrap();
        assert_eq!(frag.text, "(state[]= <> ?)");
        assert_eq!(frag.params, vec![ParamValue::Integer(2)]);
    }

    #[test]
    fn test_unknown_value() {
        let err = build(&numeric_flag(), Operator::Eq, "Active").unwrap_err();
        assert!(err.reason().contains("not a valid value"));
    }

    #[test]
    fn test_rejects_ordering_operator() {
        let err = build(&numeric_flag(), Operator::Gt, "active").unwrap_err();
        assert!(err.reason().contains("use '=' or '!='"));
    }
}
