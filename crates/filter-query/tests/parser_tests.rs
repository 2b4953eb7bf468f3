//! Parser tests over realistic search phrases.

use filter_query::ast::{Connective, Node, Operator};
use filter_query::parser::parse;

#[test]
fn test_mixed_keyword_and_comparison() {
    let ast = parse(r#"web created > "3 days ago""#).unwrap().unwrap();
    assert_eq!(
        ast,
        Node::logical(
            Connective::And,
            vec![
                Node::leaf("web"),
                Node::binary(Node::leaf("created"), Operator::Gt, Node::leaf("3 days ago")),
            ]
        )
    );
}

#[test]
fn test_same_connective_is_flattened() {
    let ast = parse("a or b or c").unwrap().unwrap();
    assert_eq!(
        ast,
        Node::logical(
            Connective::Or,
            vec![Node::leaf("a"), Node::leaf("b"), Node::leaf("c")]
        )
    );
}

#[test]
fn test_nested_not() {
    let ast = parse("!(name = bob || name ~ al*)").unwrap().unwrap();
    assert_eq!(
        ast,
        Node::logical(
            Connective::Not,
            vec![Node::logical(
                Connective::Or,
                vec![
                    Node::binary(Node::leaf("name"), Operator::Eq, Node::leaf("bob")),
                    Node::binary(Node::leaf("name"), Operator::Like, Node::leaf("al*")),
                ]
            )]
        )
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    let upper = parse("a AND b").unwrap();
    let lower = parse("a and b").unwrap();
    let symbol = parse("a && b").unwrap();
    assert_eq!(upper, lower);
    assert_eq!(lower, symbol);
}

#[test]
fn test_error_positions() {
    let err = parse("name = bob )").unwrap_err();
    assert_eq!(err.position, 11);

    let err = parse("(name = bob").unwrap_err();
    assert_eq!(err.position, 11);
    assert_eq!(err.message, "expected closing parenthesis");
}
