//! Date and timestamp handler.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::{debug, trace};

use crate::ast::{Connective, Operator};
use crate::compiler::{CompileContext, Fragment, ParamValue};
use crate::error::{QueryError, Result};
use crate::schema::{FieldDefinition, TemporalParser};

use super::comparison_text;

/// Handles comparisons on date, time and timestamp fields.
pub struct TemporalHandler;

impl TemporalHandler {
    /// Builds a temporal comparison.
    ///
    /// Returns `Ok(None)` when the value is not a temporal literal; the test
    /// is then dropped rather than failing the query.
    ///
    /// Date-only fields compare calendar dates. Datetime fields treat the
    /// parsed instant as the start of a span (a minute for `N minutes ago`,
    /// a day for values at midnight, an hour otherwise):
    /// - `eq` / `ne` become `>= start` and `< start + span`
    /// - `gt` becomes `>= start + span`
    /// - `lte` becomes `< start + span`
    ///
    /// `gt` and `lte` on date-only fields shift by one day the same way.
    pub fn build(
        field: &FieldDefinition,
        operator: Operator,
        value: &str,
        temporal: &TemporalParser,
        ctx: &mut CompileContext,
    ) -> Result<Option<Fragment>> {
        let Some(timestamp) = temporal.parse(value) else {
            debug!(field = %field.name, value, "not a temporal literal, skipping test");
            return Ok(None);
        };

        let (operator, fragment) = if field.field_type.is_date_only() {
            Self::build_date(field, operator, timestamp)?
        } else {
            Self::build_datetime(field, operator, value, timestamp)?
        };

        trace!(field = %field.name, text = %fragment.text, "temporal test");
        ctx.record_test(&field.name, operator, &fragment.params);
        Ok(Some(fragment))
    }

    fn build_date(
        field: &FieldDefinition,
        operator: Operator,
        timestamp: NaiveDateTime,
    ) -> Result<(Operator, Fragment)> {
        let date = timestamp.date();
        let (operator, date) = match operator {
            Operator::Gt => (Operator::Gte, next_day(date)?),
            Operator::Lte => (Operator::Lt, next_day(date)?),
            other => (other, date),
        };

        Ok((
            operator,
            Fragment::with_params(comparison_text(field, operator), vec![ParamValue::Date(date)]),
        ))
    }

    fn build_datetime(
        field: &FieldDefinition,
        operator: Operator,
        value: &str,
        timestamp: NaiveDateTime,
    ) -> Result<(Operator, Fragment)> {
        let span = span_for(value, timestamp);
        let end = timestamp
            .checked_add_signed(span)
            .ok_or_else(|| QueryError::not_supported(format!("date '{}' is out of range", value)))?;

        let (operator, timestamp) = match operator {
            Operator::Eq | Operator::Ne => {
                let attr = field.attribute_reference();
                let range = Fragment::with_params(
                    format!(
                        "{} >= ?{}{} < ?",
                        attr,
                        Connective::And.join_token(),
                        attr
                    ),
                    vec![ParamValue::Timestamp(timestamp), ParamValue::Timestamp(end)],
                );
                return Ok((Operator::Gte, range));
            }
            Operator::Gt => (Operator::Gte, end),
            Operator::Lte => (Operator::Lt, end),
            other => (other, timestamp),
        };

        Ok((
            operator,
            Fragment::with_params(
                comparison_text(field, operator),
                vec![ParamValue::Timestamp(timestamp)],
            ),
        ))
    }
}

fn span_for(value: &str, timestamp: NaiveDateTime) -> TimeDelta {
    if TemporalParser::is_minutes_ago(value) {
        TimeDelta::minutes(1)
    } else if timestamp.time() == NaiveTime::MIN {
        TimeDelta::days(1)
    } else {
        TimeDelta::hours(1)
    }
}

fn next_day(date: NaiveDate) -> Result<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| QueryError::not_supported(format!("date '{}' is out of range", date)))
}
