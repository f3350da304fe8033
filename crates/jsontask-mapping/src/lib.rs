#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # jsontask-mapping
//!
//! Rule-driven field mapping between JSON documents.
//!
//! A mapping run takes a source object, an optional destination object and a
//! JSON rule list, and copies, defaults and transforms fields one rule at a
//! time. Source selectors are either literal keys or, when prefixed with the
//! query marker `?`, JSONPath expressions. Destination selectors suffixed
//! with `*` preserve an existing value instead of overwriting it. Doubling a
//! marker character escapes it.
//!
//! ## Example Usage
//!
//! ```rust
//! use jsontask_mapping::{map, MapOptions};
//! use serde_json::json;
//!
//! let source = json!({"firstname": "John", "lastname": "Doe"});
//! let rules = r#"[
//!     {"from": "firstname", "to": "givenname"},
//!     {"from": "lastname", "to": "surname", "trans": ["UCase"]}
//! ]"#;
//!
//! let result = map(&source, None, rules, &MapOptions::default()).unwrap();
//! assert_eq!(result["givenname"], json!("John"));
//! assert_eq!(result["surname"], json!("DOE"));
//! ```

pub mod marker;
pub mod merge;
pub mod resolve;
pub mod rule;
pub mod runtime;
pub mod transforms;

pub use rule::{MappingRule, RuleDefault};
pub use runtime::{MapOptions, PRESERVE_MARKER, QUERY_MARKER, map, map_in_place, map_into};
pub use transforms::{CustomTransform, TransformFn, TransformRegistry};

use thiserror::Error;

/// Errors that can occur during a mapping run
#[derive(Error, Debug)]
pub enum Error {
    #[error("source must be a JSON object")]
    SourceNotAnObject,

    #[error("destination must be a JSON object")]
    DestinationNotAnObject,

    #[error("map cannot be null or an empty string")]
    EmptyMap,

    #[error("invalid mapping rules: {0}")]
    RuleFormat(String),

    #[error("transformation '{name}' failed: {message}")]
    Transform { name: String, message: String },

    #[error(transparent)]
    Query(#[from] jsontask_query::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
