//! Compiled query fragments and their bound parameters.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// Placeholder marking where a parameter is substituted.
pub const PLACEHOLDER: char = '?';

/// A parameter value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// String parameter.
    Text(String),
    /// Integer parameter.
    Integer(i64),
    /// Boolean parameter.
    Boolean(bool),
    /// Date parameter.
    Date(NaiveDate),
    /// Date and time parameter.
    Timestamp(NaiveDateTime),
}

impl ParamValue {
    /// Creates a text parameter.
    pub fn text(s: impl Into<String>) -> Self {
        ParamValue::Text(s.into())
    }

    /// The literal form of the value, before URL encoding.
    pub fn literal(&self) -> String {
        match self {
            ParamValue::Text(s) => s.clone(),
            ParamValue::Integer(i) => i.to_string(),
            ParamValue::Boolean(b) => b.to_string(),
            ParamValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            ParamValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// The literal form, percent-encoded for embedding in a query string.
    pub fn encoded(&self) -> String {
        url::form_urlencoded::byte_serialize(self.literal().as_bytes()).collect()
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal())
    }
}

/// Compiled text for one subtree, with one placeholder per parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Fragment text containing `?` placeholders.
    pub text: String,
    /// Parameters in placeholder order.
    pub params: Vec<ParamValue>,
}

impl Fragment {
    /// Creates a fragment without parameters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment with parameters.
    pub fn with_params(text: impl Into<String>, params: Vec<ParamValue>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }

    /// Number of `?` placeholders in the text.
    pub fn placeholder_count(&self) -> usize {
        self.text.matches(PLACEHOLDER).count()
    }

    /// Returns true if this fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Joins fragments with `token`, skipping empty ones.
    ///
    /// Returns `None` when nothing is left to join.
    pub fn join(fragments: impl IntoIterator<Item = Fragment>, token: &str) -> Option<Fragment> {
        let mut joined: Option<Fragment> = None;
        for fragment in fragments.into_iter().filter(|f| !f.is_empty()) {
            joined = Some(match joined {
                None => fragment,
                Some(mut acc) => {
                    acc.text.push_str(token);
                    acc.text.push_str(&fragment.text);
                    acc.params.extend(fragment.params);
                    acc
                }
            });
        }
        joined
    }

    /// Wraps the fragment as `NOT (...)`.
    pub fn negate(self) -> Self {
        Self {
            text: format!("NOT ({})", self.text),
            params: self.params,
        }
    }
}
