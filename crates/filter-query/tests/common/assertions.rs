//! Assertion helpers for compiled queries.

use filter_query::ast::Node;
use filter_query::compiler::{Compile, CompileContext};
use filter_query::schema::FieldRegistry;
use filter_query::{QueryError, compile_str};

/// Asserts that `input` compiles to exactly `expected`.
pub fn assert_compiles(registry: &FieldRegistry, input: &str, expected: &str) {
    match compile_str(registry, input) {
        Ok(query) => assert_eq!(
            query, expected,
            "unexpected output for '{}': expected {}, got {}",
            input, expected, query
        ),
        Err(err) => panic!("'{}' failed to compile: {}", input, err),
    }
}

/// Asserts that `input` is rejected with a reason containing `fragment`.
pub fn assert_not_supported(registry: &FieldRegistry, input: &str, fragment: &str) {
    match compile_str(registry, input) {
        Ok(query) => panic!("'{}' compiled to {} but should be rejected", input, query),
        Err(QueryError::NotSupported(reason)) => assert!(
            reason.contains(fragment),
            "reason for '{}' should mention '{}', got '{}'",
            input,
            fragment,
            reason
        ),
    }
}

/// Compiles `ast` and asserts the fragment's placeholders match the
/// parameters recorded in the context. Returns the context for further checks.
pub fn assert_parity(registry: &FieldRegistry, ast: &Node) -> CompileContext {
    let mut ctx = CompileContext::new();
    let fragment = ast
        .compile(registry, &mut ctx)
        .expect("query should compile");
    let placeholders = fragment.as_ref().map_or(0, |f| f.placeholder_count());
    assert_eq!(
        placeholders,
        ctx.parameter_count(),
        "placeholder count {} differs from parameter count {}",
        placeholders,
        ctx.parameter_count()
    );
    ctx
}
