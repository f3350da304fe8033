//! Destination writes: defaults, CDATA unwrapping and transform application.

use serde_json::{Map, Value};
use tracing::trace;

use crate::runtime::{CompiledRule, MapOptions};
use crate::transforms::TransformRegistry;

/// Key XML-derived trees use for character data sections.
pub const CDATA_SECTION_KEY: &str = "#cdata-section";

/// Case-insensitive key presence check, used for the preserve marker.
#[must_use]
pub fn contains_key_ignore_case(map: &Map<String, Value>, key: &str) -> bool {
    let needle = key.to_lowercase();
    map.keys().any(|k| k.to_lowercase() == needle)
}

/// Apply one rule's outcome to the destination object.
///
/// A resolved object carrying a `#cdata-section` child is optionally reduced
/// to that child, then the value runs through the rule's transformations in
/// order and is written. When nothing resolved, a present default is written
/// verbatim (no unwrapping, no transformations); an absent default means no
/// write at all.
pub fn write_field(
    destination: &mut Map<String, Value>,
    rule: &CompiledRule,
    resolved: Option<Value>,
    registry: &TransformRegistry,
    options: &MapOptions,
) -> crate::Result<()> {
    let Some(mut value) = resolved else {
        match rule.default.value() {
            Some(default) => {
                trace!(to = %rule.to, "source not found, writing default");
                destination.insert(rule.to.clone(), default.clone());
            }
            None => {
                trace!(to = %rule.to, "source not found, no default, skipping");
            }
        }
        return Ok(());
    };

    if options.unpack_cdata_section {
        value = unwrap_cdata(value);
    }
    for name in &rule.transformations {
        value = registry.apply(name, value)?;
    }
    destination.insert(rule.to.clone(), value);
    Ok(())
}

/// Replace an object holding a `#cdata-section` child with that child's
/// value. Sibling keys (XML attributes, typically) are discarded; the
/// character data is what the rule maps.
fn unwrap_cdata(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove(CDATA_SECTION_KEY) {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    }
}
