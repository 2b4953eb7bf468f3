//! Plain comparison handler.

use tracing::trace;

use crate::ast::Operator;
use crate::compiler::{CompileContext, Fragment, ParamValue};
use crate::error::{QueryError, Result};
use crate::schema::FieldDefinition;

use super::comparison_text;

/// Handles scalar comparisons that need no rewriting.
pub struct GenericHandler;

impl GenericHandler {
    /// Builds `<attr> <op> ?`, coercing the value to an integer for
    /// numerical fields.
    pub fn build(
        field: &FieldDefinition,
        operator: Operator,
        value: &str,
        ctx: &mut CompileContext,
    ) -> Result<Fragment> {
        let param = if field.field_type.is_numerical() {
            ParamValue::Integer(coerce_integer(field, value)?)
        } else {
            ParamValue::text(value)
        };
        trace!(field = %field.name, %operator, value = %param, "generic test");

        let fragment = Fragment::with_params(comparison_text(field, operator), vec![param]);
        ctx.record_test(&field.name, operator, &fragment.params);
        Ok(fragment)
    }
}

/// Truncates a numeric literal toward zero, if it fits an `i64`.
pub(crate) fn parse_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(int);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
        .map(|f| f.trunc() as i64)
}

fn coerce_integer(field: &FieldDefinition, value: &str) -> Result<i64> {
    parse_integer(value).ok_or_else(|| {
        QueryError::not_supported(format!(
            "value '{}' is not a number, field '{}' is {}",
            value, field.name, field.field_type
        ))
    })
}
