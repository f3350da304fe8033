#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # jsontask-convert
//!
//! Parse JSON and XML text into JSON trees.
//!
//! XML documents convert to the conventional JSON shape: attributes become
//! `@`-prefixed keys, mixed text lands under `#text`, CDATA sections under
//! `#cdata-section`, and repeated sibling elements collapse into arrays.
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//!
//! let tree = jsontask_convert::xml_to_tree(
//!     r#"<person id="1"><name>John</name></person>"#,
//! ).unwrap();
//! assert_eq!(tree, json!({"person": {"@id": "1", "name": "John"}}));
//! ```

pub mod xml;

pub use xml::{xml_bytes_to_tree, xml_to_tree};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while parsing input text
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed XML: {0}")]
    Xml(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse JSON text into a tree.
///
/// # Errors
///
/// Returns [`Error::Json`] when the text is not well-formed JSON.
pub fn json_to_tree(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Parse raw JSON bytes into a tree.
///
/// # Errors
///
/// Returns [`Error::Json`] when the bytes are not well-formed UTF-8 JSON.
pub fn json_bytes_to_tree(bytes: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(bytes)?)
}
