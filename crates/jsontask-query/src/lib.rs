#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # jsontask-query
//!
//! JSONPath queries over JSON documents.
//!
//! Thin wrappers around [`serde_json_path`] with three match policies:
//! [`select_one`] takes the first match if any, [`select_all`] returns every
//! match, and [`select_single`] insists on exactly one.
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//!
//! let doc = json!({"store": {"books": [
//!     {"title": "A", "price": 10},
//!     {"title": "B", "price": 60}
//! ]}});
//!
//! let expensive = jsontask_query::select_all(
//!     &doc,
//!     "$.store.books[?(@.price >= 50)].title",
//!     false,
//! ).unwrap();
//! assert_eq!(expensive, vec![&json!("B")]);
//! ```

use serde_json::Value;
use serde_json_path::JsonPath;
use thiserror::Error;
use tracing::trace;

/// Errors that can occur while evaluating a path query
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid path expression '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("path expression '{0}' matched nothing")]
    NoMatch(String),

    #[error("path expression '{0}' matched more than one value")]
    MultipleMatches(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn parse(query: &str) -> Result<JsonPath> {
    JsonPath::parse(query).map_err(|e| Error::InvalidPath {
        path: query.to_string(),
        message: e.to_string(),
    })
}

/// Evaluate `query` against `document` and return the first match, if any.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] when the expression does not parse.
pub fn select_one<'a>(document: &'a Value, query: &str) -> Result<Option<&'a Value>> {
    let path = parse(query)?;
    let found = path.query(document).first();
    trace!(query, matched = found.is_some(), "evaluated path query");
    Ok(found)
}

/// Evaluate `query` against `document` and return every match in document
/// order. With `error_when_not_matched`, an empty result is an error.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] when the expression does not parse, or
/// [`Error::NoMatch`] when nothing matched and the caller asked for that to
/// be fatal.
pub fn select_all<'a>(
    document: &'a Value,
    query: &str,
    error_when_not_matched: bool,
) -> Result<Vec<&'a Value>> {
    let path = parse(query)?;
    let matches = path.query(document).all();
    trace!(query, matches = matches.len(), "evaluated path query");
    if matches.is_empty() && error_when_not_matched {
        return Err(Error::NoMatch(query.to_string()));
    }
    Ok(matches)
}

/// Evaluate `query` against `document`, requiring exactly one match. With
/// `error_when_not_matched` unset, zero matches yield `None` instead of an
/// error; more than one match is always an error.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] when the expression does not parse,
/// [`Error::MultipleMatches`] on more than one match, or [`Error::NoMatch`]
/// on zero matches when the caller asked for that to be fatal.
pub fn select_single<'a>(
    document: &'a Value,
    query: &str,
    error_when_not_matched: bool,
) -> Result<Option<&'a Value>> {
    let matches = select_all(document, query, error_when_not_matched)?;
    match matches.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(single)),
        _ => Err(Error::MultipleMatches(query.to_string())),
    }
}
