//! Final query string assembly.
//!
//! Substitutes parameters into the root fragment and rewrites the result so
//! it can be appended to a URL as-is.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fragment::{Fragment, PLACEHOLDER, ParamValue};

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Operator spellings rewritten before whitespace is collapsed.
const REWRITES: &[(&str, &str)] = &[(" = ", "+%3D+"), (">= ", ">%3D+"), ("<= ", "<%3D+")];

/// Builds the final `?`-prefixed query string.
///
/// `parameters` must line up one-to-one with the placeholders of `root`.
pub fn assemble(root: Option<&Fragment>, parameters: &[ParamValue]) -> String {
    let Some(root) = root.filter(|f| !f.is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    debug_assert_eq!(
        root.placeholder_count(),
        parameters.len(),
        "placeholder and parameter counts differ"
    );

    let substituted = substitute(&root.text, parameters);
    format!("{}{}", PLACEHOLDER, normalize(&substituted))
}

/// Replaces each `?` left to right with the next encoded parameter.
fn substitute(text: &str, parameters: &[ParamValue]) -> String {
    let mut params = parameters.iter();
    let mut out = String::with_capacity(text.len() + parameters.len() * 8);
    for c in text.chars() {
        if c != PLACEHOLDER {
            out.push(c);
        } else if let Some(param) = params.next() {
            out.push_str(&param.encoded());
        }
    }
    out
}

fn normalize(text: &str) -> String {
    let rewritten = REWRITES
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to));
    WHITESPACE.replace_all(&rewritten, "+").into_owned()
}
