//! Mapping orchestration: rule compilation and the per-rule apply loop.
//!
//! All rules compile before any destination write, so a malformed rule list
//! never leaves a partially mapped destination behind.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::marker::consume_trailing_marker;
use crate::merge::{contains_key_ignore_case, write_field};
use crate::resolve::SourceSelector;
use crate::rule::{MappingRule, RuleDefault, parse_rules};
use crate::transforms::{CustomTransform, TransformRegistry};

/// Trailing destination marker: keep an existing destination value.
pub const PRESERVE_MARKER: char = '*';

/// Leading source marker: treat the selector as a path query.
pub const QUERY_MARKER: char = '?';

/// Options controlling a mapping run.
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    /// Unwrap single-key `#cdata-section` objects from resolved values
    /// before transformations run.
    pub unpack_cdata_section: bool,

    /// Transformations overlaid on the built-ins for this run. A custom
    /// entry may shadow a built-in by name.
    pub custom_transforms: Vec<CustomTransform>,
}

/// A rule with its markers consumed and its source selector compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Where to read from.
    pub source: SourceSelector,
    /// Destination key, preserve marker removed.
    pub to: String,
    /// Whether an existing destination value wins over this rule.
    pub preserve: bool,
    /// Fallback when the source does not resolve.
    pub default: RuleDefault,
    /// Transformation names, applied in order.
    pub transformations: Vec<String>,
}

impl CompiledRule {
    /// Compile a deserialized rule: default `to` to `from`, consume the
    /// preserve marker and parse the source selector.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RuleFormat`] when the source selector or the
    /// destination normalizes to an empty string.
    pub fn new(rule: &MappingRule) -> crate::Result<Self> {
        let raw_to = match rule.to.as_deref() {
            Some(to) if !to.is_empty() => to.to_string(),
            _ => rule.from.clone(),
        };
        let (preserve, to) = consume_trailing_marker(&raw_to, PRESERVE_MARKER);
        if to.is_empty() {
            return Err(crate::Error::RuleFormat(format!(
                "rule for '{}' has an empty destination",
                rule.from
            )));
        }
        Ok(Self {
            source: SourceSelector::parse(&rule.from)?,
            to,
            preserve,
            default: rule.default.clone(),
            transformations: rule.transformations.clone(),
        })
    }
}

fn compile(map_spec: &str) -> crate::Result<Vec<CompiledRule>> {
    if map_spec.trim().is_empty() {
        return Err(crate::Error::EmptyMap);
    }
    let rules = parse_rules(map_spec)?;
    debug!(rules = rules.len(), "compiled mapping rules");
    rules.iter().map(CompiledRule::new).collect()
}

fn build_registry(options: &MapOptions) -> TransformRegistry {
    let mut registry = TransformRegistry::with_builtins();
    for custom in &options.custom_transforms {
        registry.register(&custom.name, custom.function.clone());
    }
    registry
}

/// Map fields from `source` into a fresh copy of `destination` (or an empty
/// object when no destination is given) and return the result.
///
/// # Errors
///
/// Fails when the rule list is empty or malformed, when either document is
/// not a JSON object, or when a query or transformation fails.
pub fn map(
    source: &Value,
    destination: Option<Value>,
    map_spec: &str,
    options: &MapOptions,
) -> crate::Result<Value> {
    let mut destination = destination.unwrap_or_else(|| Value::Object(Map::new()));
    map_into(source, &mut destination, map_spec, options)?;
    Ok(destination)
}

/// Map fields from `source` into an existing `destination` object.
///
/// # Errors
///
/// Same conditions as [`map`].
pub fn map_into(
    source: &Value,
    destination: &mut Value,
    map_spec: &str,
    options: &MapOptions,
) -> crate::Result<()> {
    let rules = compile(map_spec)?;
    if !source.is_object() {
        return Err(crate::Error::SourceNotAnObject);
    }
    let Some(dest_map) = destination.as_object_mut() else {
        return Err(crate::Error::DestinationNotAnObject);
    };
    let registry = build_registry(options);
    for rule in &rules {
        if rule.preserve && contains_key_ignore_case(dest_map, &rule.to) {
            trace!(to = %rule.to, "destination key exists, preserving");
            continue;
        }
        let resolved = rule.source.resolve(source)?;
        write_field(dest_map, rule, resolved, &registry, options)?;
    }
    Ok(())
}

/// Map a document onto itself: each rule resolves against the document as it
/// stands, so later rules see the writes of earlier ones.
///
/// # Errors
///
/// Same conditions as [`map`].
pub fn map_in_place(
    document: &mut Value,
    map_spec: &str,
    options: &MapOptions,
) -> crate::Result<()> {
    let rules = compile(map_spec)?;
    if !document.is_object() {
        return Err(crate::Error::SourceNotAnObject);
    }
    let registry = build_registry(options);
    for rule in &rules {
        let preserved = document
            .as_object()
            .is_some_and(|map| rule.preserve && contains_key_ignore_case(map, &rule.to));
        if preserved {
            trace!(to = %rule.to, "destination key exists, preserving");
            continue;
        }
        let resolved = rule.source.resolve(document)?;
        if let Some(map) = document.as_object_mut() {
            write_field(map, rule, resolved, &registry, options)?;
        }
    }
    Ok(())
}
