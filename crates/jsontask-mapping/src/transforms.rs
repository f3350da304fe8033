//! Transformations applied to resolved values before the destination write.
//!
//! A transformation is a named pure function from one JSON value to another.
//! Lookup is case-insensitive and unknown names are pass-through, so a rule
//! listing a transformation this registry does not know leaves the value
//! unchanged rather than failing.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

/// Type alias for a transformation function.
pub type TransformFn = Arc<dyn Fn(Value) -> crate::Result<Value> + Send + Sync>;

/// A caller-supplied transformation, overlaid on the built-ins for one
/// mapping invocation. A custom entry may shadow a built-in by name.
#[derive(Clone)]
pub struct CustomTransform {
    /// Name the rule list refers to the transformation by.
    pub name: String,
    /// The transformation itself.
    pub function: TransformFn,
}

impl CustomTransform {
    /// Create a custom transformation.
    pub fn new(
        name: impl Into<String>,
        function: impl Fn(Value) -> crate::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            function: Arc::new(function),
        }
    }
}

impl std::fmt::Debug for CustomTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomTransform")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Name-indexed transformation table, keyed case-insensitively.
#[derive(Clone)]
pub struct TransformRegistry {
    entries: HashMap<String, TransformFn>,
}

impl TransformRegistry {
    /// Create a registry pre-populated with the built-in transformations
    /// (`Trim`, `LCase`, `UCase`, `SweSsn`, `SweOrgNum`).
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
        };
        registry.register("Trim", Arc::new(trim));
        registry.register("LCase", Arc::new(lower_case));
        registry.register("UCase", Arc::new(upper_case));
        registry.register("SweSsn", Arc::new(swedish_ssn));
        registry.register("SweOrgNum", Arc::new(swedish_org_number));
        registry
    }

    /// Register a transformation under `name`, replacing any previous entry
    /// with the same (case-insensitive) name.
    pub fn register(&mut self, name: impl AsRef<str>, function: TransformFn) {
        self.entries
            .insert(name.as_ref().to_lowercase(), function);
    }

    /// Whether a transformation is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    /// Apply the transformation registered under `name` to `input`.
    /// Unknown names return the input unchanged.
    ///
    /// # Errors
    ///
    /// Propagates any error from the transformation function itself.
    pub fn apply(&self, name: &str, input: Value) -> crate::Result<Value> {
        match self.entries.get(&name.to_lowercase()) {
            Some(function) => function(input).map_err(|e| match e {
                crate::Error::Transform { message, .. } => crate::Error::Transform {
                    name: name.to_string(),
                    message,
                },
                other => other,
            }),
            None => Ok(input),
        }
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TransformRegistry")
            .field("entries", &names)
            .finish()
    }
}

/// Strip leading and trailing whitespace from a string leaf.
fn trim(input: Value) -> crate::Result<Value> {
    match input {
        Value::String(s) => Ok(Value::String(s.trim().to_string())),
        other => Ok(other),
    }
}

/// Lower-case a string leaf.
fn lower_case(input: Value) -> crate::Result<Value> {
    match input {
        Value::String(s) => Ok(Value::String(s.to_lowercase())),
        other => Ok(other),
    }
}

/// Upper-case a string leaf.
fn upper_case(input: Value) -> crate::Result<Value> {
    match input {
        Value::String(s) => Ok(Value::String(s.to_uppercase())),
        other => Ok(other),
    }
}

/// The four recognized personal/organization number shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberShape {
    /// 10 digits, no dash: `NNNNNNNNNN`
    Short,
    /// 12 digits, no dash: `NNNNNNNNNNNN`
    Long,
    /// 6 digits, dash, 4 digits: `NNNNNN-NNNN`
    DashedShort,
    /// 8 digits, dash, 4 digits: `NNNNNNNN-NNNN`
    DashedLong,
}

static NUMBER_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<short>\d{10})|(?P<long>\d{12})|(?P<dshort>\d{6}-\d{4})|(?P<dlong>\d{8}-\d{4}))$",
    )
    .expect("number shape pattern is valid")
});

fn classify_number(text: &str) -> Option<NumberShape> {
    let caps = NUMBER_SHAPE_RE.captures(text)?;
    if caps.name("short").is_some() {
        Some(NumberShape::Short)
    } else if caps.name("long").is_some() {
        Some(NumberShape::Long)
    } else if caps.name("dshort").is_some() {
        Some(NumberShape::DashedShort)
    } else {
        Some(NumberShape::DashedLong)
    }
}

/// Render a scalar leaf as text. Numbers use their JSON rendering so that
/// personal numbers supplied as JSON numbers still normalize.
fn scalar_text(input: &Value) -> Option<String> {
    match input {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalize a Swedish personal number to its dashed form.
///
/// 10 digits become `NNNNNN-NNNN`, 12 digits become `NNNNNNNN-NNNN`,
/// already-dashed forms and everything unrecognized pass through.
fn swedish_ssn(input: Value) -> crate::Result<Value> {
    let Some(text) = scalar_text(&input) else {
        return Ok(input);
    };
    match classify_number(&text) {
        Some(NumberShape::Short) => Ok(Value::String(format!("{}-{}", &text[..6], &text[6..]))),
        Some(NumberShape::Long) => Ok(Value::String(format!("{}-{}", &text[..8], &text[8..]))),
        Some(NumberShape::DashedShort | NumberShape::DashedLong) => Ok(Value::String(text)),
        None => Ok(input),
    }
}

/// Normalize a Swedish organization number to its dashed, century-prefixed
/// form. 10-digit and 6+4-dashed forms gain a `16` century prefix.
fn swedish_org_number(input: Value) -> crate::Result<Value> {
    let Some(text) = scalar_text(&input) else {
        return Ok(input);
    };
    match classify_number(&text) {
        Some(NumberShape::Short) => Ok(Value::String(format!("16{}-{}", &text[..6], &text[6..]))),
        Some(NumberShape::Long) => Ok(Value::String(format!("{}-{}", &text[..8], &text[8..]))),
        Some(NumberShape::DashedShort) => Ok(Value::String(format!("16{text}"))),
        Some(NumberShape::DashedLong) => Ok(Value::String(text)),
        None => Ok(input),
    }
}
