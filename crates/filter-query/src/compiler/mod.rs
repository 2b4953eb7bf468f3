//! Search expression compiler.
//!
//! Walks a [`Node`] tree and produces a [`Fragment`] whose placeholders line
//! up with the parameters recorded in a [`CompileContext`]:
//!
//! - a leaf naming a boolean field tests that field for its `true` value
//! - any other leaf is an implicit keyword searched across default fields
//! - `op value` searches the default fields that accept `op`
//! - `field op value` generates exactly one test
//! - logical nodes join their compiled children
//!
//! Per-type behaviour lives in [`handlers`]; [`assemble`] turns the root
//! fragment into the final query string.

pub mod assembler;
mod context;
mod fragment;
pub mod handlers;

pub use assembler::assemble;
pub use context::{CompileContext, Notification};
pub use fragment::{Fragment, PLACEHOLDER, ParamValue};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::ast::{Connective, LeafNode, LogicalOperatorNode, Node, Operator, OperatorNode};
use crate::error::{QueryError, Result};
use crate::schema::{FieldDefinition, FieldRegistry, FieldType, TemporalParser};

use handlers::generic::parse_integer;
use handlers::{EnumeratedHandler, GenericHandler, PatternHandler, TemporalHandler, TestKind};

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("number pattern is valid"));

/// Compilation of one tree node.
pub trait Compile {
    /// Compiles the node, returning `None` when it produces no test.
    fn compile(&self, registry: &FieldRegistry, ctx: &mut CompileContext)
    -> Result<Option<Fragment>>;
}

impl Compile for Node {
    fn compile(
        &self,
        registry: &FieldRegistry,
        ctx: &mut CompileContext,
    ) -> Result<Option<Fragment>> {
        match self {
            Node::Leaf(leaf) => leaf.compile(registry, ctx),
            Node::Operator(op) => op.compile(registry, ctx),
            Node::Logical(logical) => logical.compile(registry, ctx),
        }
    }
}

impl Compile for LeafNode {
    fn compile(
        &self,
        registry: &FieldRegistry,
        ctx: &mut CompileContext,
    ) -> Result<Option<Fragment>> {
        let boolean_key = registry
            .field_by_name(&self.value)
            .and_then(|field| field.true_key().map(|key| (field, key)));

        if let Some((field, key)) = boolean_key {
            return EnumeratedHandler::build(field, Operator::Eq, key, ctx).map(Some);
        }

        implicit_search(registry, &self.value, None, ctx)
    }
}

impl Compile for OperatorNode {
    fn compile(
        &self,
        registry: &FieldRegistry,
        ctx: &mut CompileContext,
    ) -> Result<Option<Fragment>> {
        match self.children.as_slice() {
            [rhs] => {
                let rhs = rhs
                    .as_leaf()
                    .ok_or_else(|| QueryError::not_supported("value not a leaf"))?;
                implicit_search(registry, &rhs.value, Some(self.operator), ctx)
            }
            [lhs, rhs] => {
                let (Some(lhs), Some(rhs)) = (lhs.as_leaf(), rhs.as_leaf()) else {
                    return Err(QueryError::not_supported(
                        "field name and value must both be leaves",
                    ));
                };
                let field = registry.field_by_name(&lhs.value).ok_or_else(|| {
                    QueryError::not_supported(format!("field '{}' not recognized", lhs.value))
                })?;
                field_test(registry, field, self.operator, &rhs.value, ctx)
            }
            children => Err(QueryError::not_supported(format!(
                "operator '{}' takes one or two operands, got {}",
                self.operator.token(),
                children.len()
            ))),
        }
    }
}

impl Compile for LogicalOperatorNode {
    fn compile(
        &self,
        registry: &FieldRegistry,
        ctx: &mut CompileContext,
    ) -> Result<Option<Fragment>> {
        let mut compiled = Vec::with_capacity(self.children.len());
        for child in &self.children {
            if let Some(fragment) = child.compile(registry, ctx)? {
                compiled.push(fragment);
            }
        }

        Ok(match self.connective {
            Connective::Not => {
                Fragment::join(compiled, Connective::And.join_token()).map(Fragment::negate)
            }
            connective => Fragment::join(compiled, connective.join_token()),
        })
    }
}

/// Default fields an implicit `value` (optionally with `operator`) can match.
///
/// Textual fields qualify unless the operator is an ordering comparison;
/// numerical fields only for number-shaped values that fit an `i64`;
/// temporal fields only for values the registry's temporal parser accepts.
/// Enumerated fields never take part.
pub fn default_fields_for<'r>(
    registry: &'r FieldRegistry,
    value: &str,
    operator: Option<Operator>,
) -> Vec<&'r FieldDefinition> {
    candidate_fields(registry, &registry.temporal(), value, operator)
}

fn candidate_fields<'r>(
    registry: &'r FieldRegistry,
    temporal: &TemporalParser,
    value: &str,
    operator: Option<Operator>,
) -> Vec<&'r FieldDefinition> {
    let textual = operator.is_none_or(|op| {
        matches!(
            op,
            Operator::Eq | Operator::Ne | Operator::Like | Operator::Unlike
        )
    });
    let numerical = NUMBER.is_match(value) && parse_integer(value).is_some();
    let dated = temporal.parse(value).is_some();

    registry
        .default_fields()
        .filter(|field| !field.is_enumerated())
        .filter(|field| match field.field_type {
            FieldType::String | FieldType::Text => textual,
            FieldType::Integer | FieldType::Float | FieldType::Decimal => numerical,
            FieldType::Date | FieldType::Time | FieldType::Timestamp => dated,
        })
        .collect()
}

/// Searches `value` across the applicable default fields, joined with OR.
fn implicit_search(
    registry: &FieldRegistry,
    value: &str,
    operator: Option<Operator>,
    ctx: &mut CompileContext,
) -> Result<Option<Fragment>> {
    let temporal = ctx.temporal(registry);
    let mut tests = Vec::new();
    for field in candidate_fields(registry, &temporal, value, operator) {
        let op = operator.unwrap_or_else(|| field.default_operator());
        if let Some(fragment) = field_test(registry, field, op, value, ctx)? {
            tests.push(fragment);
        }
    }

    Ok(Fragment::join(tests, Connective::Or.join_token()))
}

/// Generates the test for one `field op value` comparison.
pub fn field_test(
    registry: &FieldRegistry,
    field: &FieldDefinition,
    operator: Operator,
    value: &str,
    ctx: &mut CompileContext,
) -> Result<Option<Fragment>> {
    PatternHandler::check(field, operator)?;

    let kind = TestKind::classify(field, operator);
    trace!(field = %field.name, %operator, ?kind, "field test");

    match kind {
        TestKind::Enumerated => EnumeratedHandler::build(field, operator, value, ctx).map(Some),
        TestKind::Temporal => {
            let temporal = ctx.temporal(registry);
            TemporalHandler::build(field, operator, value, &temporal, ctx)
        }
        TestKind::Pattern => PatternHandler::build(field, operator, value, ctx).map(Some),
        TestKind::Generic => GenericHandler::build(field, operator, value, ctx).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::schema::StoredValue;

    fn registry() -> FieldRegistry {
        FieldRegistry::builder()
            .register(FieldDefinition::new("name", FieldType::String))
            .unwrap()
            .register(FieldDefinition::new("comment", FieldType::Text))
            .unwrap()
            .register(FieldDefinition::new("memory", FieldType::Integer))
            .unwrap()
            .register(FieldDefinition::new("created", FieldType::Date))
            .unwrap()
            .register(FieldDefinition::new("secret", FieldType::String).only_explicit())
            .unwrap()
            .register(
                FieldDefinition::new("enabled", FieldType::Integer).with_values([
                    ("on", StoredValue::Bool(true)),
                    ("off", StoredValue::Bool(false)),
                ]),
            )
            .unwrap()
            .with_reference_time(
                NaiveDate::from_ymd_opt(2024, 3, 13)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            )
            .build()
    }

    fn names(fields: Vec<&FieldDefinition>) -> Vec<&str> {
        fields.into_iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_default_fields_for_word() {
        let registry = registry();
        assert_eq!(
            names(default_fields_for(&registry, "bob", None)),
            vec!["name", "comment"]
        );
    }

    #[test]
    fn test_default_fields_for_number() {
        let registry = registry();
        assert_eq!(
            names(default_fields_for(&registry, "-42.5", None)),
            vec!["name", "comment", "memory"]
        );
        assert_eq!(
            names(default_fields_for(&registry, "42", Some(Operator::Gt))),
            vec!["memory"]
        );
    }

    #[test]
    fn test_default_fields_for_date() {
        let registry = registry();
        assert_eq!(
            names(default_fields_for(&registry, "yesterday", Some(Operator::Lt))),
            vec!["created"]
        );
    }

    #[test]
    fn test_leaf_boolean_field() {
        let registry = registry();
        let mut ctx = CompileContext::new();
        let frag = Node::leaf("enabled")
            .compile(&registry, &mut ctx)
            .unwrap()
            .unwrap();

        assert_eq!(frag.text, "(enabled[]= > ?)");
        assert_eq!(frag.params, vec![ParamValue::Integer(0)]);
    }

    #[test]
    fn test_leaf_keyword_joins_with_or() {
        let registry = registry();
        let mut ctx = CompileContext::new();
        let frag = Node::leaf("bob")
            .compile(&registry, &mut ctx)
            .unwrap()
            .unwrap();

        assert_eq!(frag.text, "name[]= LIKE ? OR comment[]= LIKE ?");
        assert_eq!(frag.placeholder_count(), ctx.parameter_count());
    }

    #[test]
    fn test_unary_requires_leaf() {
        let registry = registry();
        let node = Node::unary(
            Operator::Gt,
            Node::logical(Connective::And, vec![Node::leaf("1")]),
        );
        let err = node
            .compile(&registry, &mut CompileContext::new())
            .unwrap_err();
        assert_eq!(err.reason(), "value not a leaf");
    }

    #[test]
    fn test_binary_unknown_field() {
        let registry = registry();
        let node = Node::binary(Node::leaf("foo"), Operator::Eq, Node::leaf("1"));
        let err = node
            .compile(&registry, &mut CompileContext::new())
            .unwrap_err();
        assert_eq!(err.reason(), "field 'foo' not recognized");
    }

    #[test]
    fn test_operator_arity() {
        let registry = registry();
        let node = Node::Operator(OperatorNode {
            operator: Operator::Eq,
            children: vec![],
        });
        assert!(node.compile(&registry, &mut CompileContext::new()).is_err());

        let node = Node::Operator(OperatorNode {
            operator: Operator::Eq,
            children: vec![Node::leaf("a"), Node::leaf("b"), Node::leaf("c")],
        });
        assert!(node.compile(&registry, &mut CompileContext::new()).is_err());
    }

    #[test]
    fn test_logical_drops_empty_children() {
        let registry = registry();
        let mut ctx = CompileContext::new();
        let node = Node::logical(
            Connective::And,
            vec![
                Node::unary(Operator::Gt, Node::leaf("someday")),
                Node::binary(Node::leaf("memory"), Operator::Gte, Node::leaf("512")),
            ],
        );
        let frag = node.compile(&registry, &mut ctx).unwrap().unwrap();
        assert_eq!(frag.text, "memory[]= >= ?");
    }

    #[test]
    fn test_logical_all_empty() {
        let registry = registry();
        let node = Node::logical(
            Connective::Or,
            vec![Node::unary(Operator::Lt, Node::leaf("someday"))],
        );
        assert!(
            node.compile(&registry, &mut CompileContext::new())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_not_wraps_child() {
        let registry = registry();
        let node = Node::logical(
            Connective::Not,
            vec![Node::binary(
                Node::leaf("name"),
                Operator::Eq,
                Node::leaf("bob"),
            )],
        );
        let frag = node
            .compile(&registry, &mut CompileContext::new())
            .unwrap()
            .unwrap();
        assert_eq!(frag.text, "NOT (name[]= = ?)");
    }

    #[test]
    fn test_pattern_on_date_field_rejected() {
        let registry = registry();
        let node = Node::binary(Node::leaf("created"), Operator::Like, Node::leaf("2024"));
        let err = node
            .compile(&registry, &mut CompileContext::new())
            .unwrap_err();
        assert!(err.reason().contains("only supported on textual fields"));
    }

    #[test]
    fn test_default_fields_for_out_of_range_number() {
        let registry = registry();
        assert_eq!(
            names(default_fields_for(&registry, "12345678901234567890", None)),
            vec!["name", "comment"]
        );
        assert!(default_fields_for(&registry, "12345678901234567890", Some(Operator::Gt)).is_empty());
    }

    #[test]
    fn test_binary_requires_leaves() {
        let registry = registry();
        let logical = || Node::logical(Connective::Or, vec![Node::leaf("a"), Node::leaf("b")]);

        for node in [
            Node::binary(logical(), Operator::Eq, Node::leaf("bob")),
            Node::binary(Node::leaf("name"), Operator::Eq, logical()),
        ] {
            let err = node
                .compile(&registry, &mut CompileContext::new())
                .unwrap_err();
            assert_eq!(err.reason(), "field name and value must both be leaves");
        }
    }
}
