//! Search expression tree.
//!
//! A parsed search phrase is a tree of three node kinds:
//!
//! - [`LeafNode`] - a bare value or field name
//! - [`OperatorNode`] - a comparison, either `op value` or `lhs op rhs`
//! - [`LogicalOperatorNode`] - `and` / `or` / `not` over child nodes
//!
//! Trees are immutable once built; the compiler only borrows them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operators understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Pattern match.
    Like,
    /// Negated pattern match.
    Unlike,
}

impl Operator {
    /// Parses a query-side operator token such as `>=` or `~`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" | "==" => Some(Operator::Eq),
            "!=" | "<>" => Some(Operator::Ne),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Gte),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Lte),
            "~" => Some(Operator::Like),
            "!~" => Some(Operator::Unlike),
            _ => None,
        }
    }

    /// The canonical token a user types for this operator.
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "~",
            Operator::Unlike => "!~",
        }
    }

    /// The literal inserted into compiled fragments.
    pub fn target_literal(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::Unlike => "NOT LIKE",
        }
    }

    /// Returns true for `like` / `unlike`.
    pub fn is_pattern(&self) -> bool {
        matches!(self, Operator::Like | Operator::Unlike)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Eq => write!(f, "eq"),
            Operator::Ne => write!(f, "ne"),
            Operator::Gt => write!(f, "gt"),
            Operator::Gte => write!(f, "gte"),
            Operator::Lt => write!(f, "lt"),
            Operator::Lte => write!(f, "lte"),
            Operator::Like => write!(f, "like"),
            Operator::Unlike => write!(f, "unlike"),
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eq" => Ok(Operator::Eq),
            "ne" => Ok(Operator::Ne),
            "gt" => Ok(Operator::Gt),
            "gte" => Ok(Operator::Gte),
            "lt" => Ok(Operator::Lt),
            "lte" => Ok(Operator::Lte),
            "like" => Ok(Operator::Like),
            "unlike" => Ok(Operator::Unlike),
            other => Operator::from_token(other).ok_or_else(|| format!("unknown operator: {}", s)),
        }
    }
}

/// Logical connectives joining sub-expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    /// All children must match.
    And,
    /// Any child may match.
    Or,
    /// The single child must not match.
    Not,
}

impl Connective {
    /// Token placed between compiled child fragments.
    ///
    /// `And` uses `&` because the host treats repeated `name[]` parameters as
    /// a conjunction.
    pub fn join_token(&self) -> &'static str {
        match self {
            Connective::And => "&",
            Connective::Or => " OR ",
            Connective::Not => "NOT ",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connective::And => write!(f, "and"),
            Connective::Or => write!(f, "or"),
            Connective::Not => write!(f, "not"),
        }
    }
}

/// A bare value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    /// The raw text.
    pub value: String,
}

/// A comparison node with one (`> yesterday`) or two (`created > yesterday`)
/// children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorNode {
    /// The comparison.
    pub operator: Operator,
    /// `[rhs]` or `[lhs, rhs]`.
    pub children: Vec<Node>,
}

/// A logical combination of child expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalOperatorNode {
    /// How the children combine.
    pub connective: Connective,
    /// Child expressions, in source order.
    pub children: Vec<Node>,
}

/// A node of the search expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A bare value.
    Leaf(LeafNode),
    /// A comparison.
    Operator(OperatorNode),
    /// A logical combination.
    Logical(LogicalOperatorNode),
}

impl Node {
    /// Creates a leaf node.
    pub fn leaf(value: impl Into<String>) -> Self {
        Node::Leaf(LeafNode {
            value: value.into(),
        })
    }

    /// Creates an implicit-field comparison such as `> yesterday`.
    pub fn unary(operator: Operator, rhs: Node) -> Self {
        Node::Operator(OperatorNode {
            operator,
            children: vec![rhs],
        })
    }

    /// Creates an explicit comparison such as `name = bob`.
    pub fn binary(lhs: Node, operator: Operator, rhs: Node) -> Self {
        Node::Operator(OperatorNode {
            operator,
            children: vec![lhs, rhs],
        })
    }

    /// Creates a logical node over the given children.
    pub fn logical(connective: Connective, children: Vec<Node>) -> Self {
        Node::Logical(LogicalOperatorNode {
            connective,
            children,
        })
    }

    /// Returns the leaf value, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }
}
