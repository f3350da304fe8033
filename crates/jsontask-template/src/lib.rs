#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # jsontask-template
//!
//! Render text templates from JSON trees.
//!
//! Templates are Handlebars documents. The angle-bracket mode accepts
//! `[[name]]` placeholders instead of `{{name}}`, which keeps templates that
//! themselves produce JSON free of brace escaping.
//!
//! ## Example Usage
//!
//! ```rust
//! use jsontask_template::{RenderOptions, render};
//! use serde_json::json;
//!
//! let data = json!({"name": "John", "town": "Kungsbacka"});
//! let output = render(
//!     &data,
//!     "Hello [[name]] from [[town]]!",
//!     &[],
//!     &RenderOptions { use_angle_brackets: true },
//! ).unwrap();
//! assert_eq!(output, "Hello John from Kungsbacka!");
//! ```

pub mod brackets;

pub use brackets::angle_to_curly;

use handlebars::Handlebars;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while rendering a template
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid template partial '{name}': {message}")]
    Partial { name: String, message: String },

    #[error("template rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Options controlling a render run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Accept `[[name]]` placeholders instead of `{{name}}`, in the template
    /// and in every partial.
    pub use_angle_brackets: bool,
}

/// A named template fragment the main template can include with
/// `{{> name}}`.
#[derive(Debug, Clone)]
pub struct TemplatePartial {
    /// Name the template refers to the partial by.
    pub name: String,
    /// The partial's template text.
    pub template: String,
}

/// Render `template` with `data` as the root context.
///
/// # Errors
///
/// Returns [`Error::Partial`] when a partial does not parse and
/// [`Error::Render`] when the template itself does not parse or render.
pub fn render(
    data: &Value,
    template: &str,
    partials: &[TemplatePartial],
    options: &RenderOptions,
) -> Result<String> {
    let mut registry = Handlebars::new();
    for partial in partials {
        let text = if options.use_angle_brackets {
            angle_to_curly(&partial.template)
        } else {
            partial.template.clone()
        };
        registry
            .register_partial(&partial.name, text)
            .map_err(|e| Error::Partial {
                name: partial.name.clone(),
                message: e.to_string(),
            })?;
    }
    let template = if options.use_angle_brackets {
        angle_to_curly(template)
    } else {
        template.to_string()
    };
    debug!(partials = partials.len(), "rendering template");
    registry
        .render_template(&template, data)
        .map_err(|e| Error::Render(e.to_string()))
}
