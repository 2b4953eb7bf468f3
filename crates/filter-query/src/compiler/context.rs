//! Per-compilation notification log.

use crate::ast::Operator;
use crate::schema::{FieldRegistry, TemporalParser};

use super::fragment::ParamValue;

/// A side effect recorded while compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A parameter bound to the next placeholder.
    Parameter(ParamValue),
    /// A field referenced by a generated test.
    Key(String),
    /// The target operator of a generated test.
    Operator(Operator),
}

/// Ordered, append-only log scoped to one compile call.
///
/// Also holds the temporal parser for the call, so every relative phrase in
/// one query resolves against the same instant.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    log: Vec<Notification>,
    temporal: Option<TemporalParser>,
}

impl CompileContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a field test: its key, operator and parameters, in that order.
    pub fn record_test(&mut self, key: &str, operator: Operator, params: &[ParamValue]) {
        self.log.push(Notification::Key(key.to_string()));
        self.log.push(Notification::Operator(operator));
        self.log
            .extend(params.iter().cloned().map(Notification::Parameter));
    }

    /// The temporal parser for this compilation, taken from `registry` on
    /// first use.
    pub fn temporal(&mut self, registry: &FieldRegistry) -> TemporalParser {
        *self.temporal.get_or_insert_with(|| registry.temporal())
    }

    /// All notifications in emission order.
    pub fn notifications(&self) -> &[Notification] {
        &self.log
    }

    /// Emitted parameters in emission order.
    pub fn parameters(&self) -> impl Iterator<Item = &ParamValue> {
        self.log.iter().filter_map(|n| match n {
            Notification::Parameter(value) => Some(value),
            _ => None,
        })
    }

    /// Number of emitted parameters.
    pub fn parameter_count(&self) -> usize {
        self.parameters().count()
    }
}
