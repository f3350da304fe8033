//! Mapping rule model
//!
//! A rule list is a JSON array of objects:
//!
//! ```json
//! [
//!     {"from": "Firstname", "to": "first"},
//!     {"from": "NewUser", "to": "new", "def": false},
//!     {"from": "Description", "to": "desc", "trans": ["Trim"]}
//! ]
//! ```
//!
//! `from` is required and may be a literal key, a `?`-marked path query, or a
//! comma-separated list of fallback selectors. `to` defaults to `from` when
//! missing or empty. `def` supplies a value when the source does not resolve;
//! an explicit `"def": null` is distinct from no `def` at all.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One field mapping rule, as deserialized from the rule list.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingRule {
    /// Where to read from.
    pub from: String,

    /// Where to write to. Defaults to `from` when missing or empty.
    #[serde(default)]
    pub to: Option<String>,

    /// Value written when the source cannot be resolved.
    #[serde(default, rename = "def")]
    pub default: RuleDefault,

    /// Transformation names applied in order before the write.
    #[serde(default, rename = "trans")]
    pub transformations: Vec<String>,
}

/// Default value for a rule, tracking presence independently from the value
/// so that `"def": null` (and `false`, and `0`) remain meaningful defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RuleDefault {
    /// No `def` entry in the rule.
    #[default]
    Absent,
    /// A `def` entry, holding any JSON value including `null`.
    Present(Value),
}

impl RuleDefault {
    /// Whether the rule carries a default at all.
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, RuleDefault::Present(_))
    }

    /// The default value, if one is present.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            RuleDefault::Absent => None,
            RuleDefault::Present(value) => Some(value),
        }
    }
}

impl<'de> Deserialize<'de> for RuleDefault {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Any present value, null included, is a default.
        Value::deserialize(deserializer).map(RuleDefault::Present)
    }
}

/// Deserialize a rule list from its textual JSON form.
///
/// # Errors
///
/// Returns [`crate::Error::RuleFormat`] when the text is not a well-formed
/// rule array or a rule is missing its `from` selector.
pub fn parse_rules(map_spec: &str) -> crate::Result<Vec<MappingRule>> {
    serde_json::from_str(map_spec).map_err(|e| crate::Error::RuleFormat(e.to_string()))
}
