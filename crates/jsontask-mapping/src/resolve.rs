//! Source selector parsing and value resolution.
//!
//! A rule's `from` field compiles into a [`SourceSelector`]: one or more
//! alternatives tried in order against the source document. An alternative is
//! either a literal top-level key or, when prefixed with the query marker, a
//! JSONPath expression. A top-level comma in `from` splits it into fallback
//! alternatives, each trimmed and marker-parsed independently; commas inside
//! brackets, parentheses or quotes belong to a query expression (union
//! selectors, filters) and do not split.

use serde_json::Value;

use crate::marker::consume_leading_marker;
use crate::runtime::QUERY_MARKER;

/// A compiled `from` selector: alternatives tried in order, first hit wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSelector {
    alternatives: Vec<SourceRef>,
}

/// One way of locating a value in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// Direct lookup of a top-level object key.
    Key(String),
    /// A JSONPath query, rooted at the source document.
    Query(String),
}

impl SourceSelector {
    /// Compile a raw `from` string into a selector.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RuleFormat`] when any alternative normalizes
    /// to an empty string.
    pub fn parse(from: &str) -> crate::Result<Self> {
        let alternatives = split_alternatives(from)
            .into_iter()
            .map(|alt| parse_alternative(alt.trim(), from))
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(Self { alternatives })
    }

    /// The compiled alternatives, in trial order.
    #[must_use]
    pub fn alternatives(&self) -> &[SourceRef] {
        &self.alternatives
    }

    /// Resolve this selector against `source`, returning the first value any
    /// alternative locates. Direct key lookups only match when the source is
    /// an object; queries run against the document as a whole.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Query`] when a query alternative is not a
    /// valid JSONPath expression.
    pub fn resolve(&self, source: &Value) -> crate::Result<Option<Value>> {
        for alternative in &self.alternatives {
            let found = match alternative {
                SourceRef::Key(key) => source.as_object().and_then(|map| map.get(key)),
                SourceRef::Query(query) => jsontask_query::select_one(source, query)?,
            };
            if let Some(value) = found {
                return Ok(Some(value.clone()));
            }
        }
        Ok(None)
    }
}

/// Split a `from` string on top-level commas. Commas nested in brackets or
/// parentheses, or inside a quoted string, are query syntax and stay put.
fn split_alternatives(from: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in from.char_indices() {
        match c {
            '\'' | '"' => match quote {
                Some(open) if open == c => quote = None,
                Some(_) => {}
                None => quote = Some(c),
            },
            '[' | '(' if quote.is_none() => depth += 1,
            ']' | ')' if quote.is_none() => depth = depth.saturating_sub(1),
            ',' if quote.is_none() && depth == 0 => {
                parts.push(&from[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&from[start..]);
    parts
}

fn parse_alternative(alt: &str, whole_from: &str) -> crate::Result<SourceRef> {
    let (is_query, normalized) = consume_leading_marker(alt, QUERY_MARKER);
    if normalized.is_empty() {
        return Err(crate::Error::RuleFormat(format!(
            "selector '{whole_from}' contains an empty source reference"
        )));
    }
    if is_query {
        Ok(SourceRef::Query(root_query(&normalized)))
    } else {
        Ok(SourceRef::Key(normalized))
    }
}

/// Restore the JSONPath root that selector authors habitually leave off:
/// `$`-rooted expressions pass through, a leading `.` or `[` gets `$`
/// prepended, anything else gets `$.`.
fn root_query(query: &str) -> String {
    if query.starts_with('$') {
        query.to_string()
    } else if query.starts_with('.') || query.starts_with('[') {
        format!("${query}")
    } else {
        format!("$.{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_key_is_a_direct_lookup() {
        let selector = SourceSelector::parse("firstname").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[SourceRef::Key("firstname".into())]
        );
    }

    #[test]
    fn query_marker_switches_to_query_mode() {
        let selector = SourceSelector::parse("?$.nested.prop").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[SourceRef::Query("$.nested.prop".into())]
        );
    }

    #[test]
    fn bare_queries_regain_their_root() {
        let selector = SourceSelector::parse("?nested.prop").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[SourceRef::Query("$.nested.prop".into())]
        );

        let selector = SourceSelector::parse("?.nested.prop").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[SourceRef::Query("$.nested.prop".into())]
        );

        let selector = SourceSelector::parse("?[0]").unwrap();
        assert_eq!(selector.alternatives(), &[SourceRef::Query("$[0]".into())]);
    }

    #[test]
    fn doubled_marker_escapes_to_a_literal_key() {
        let selector = SourceSelector::parse("??propWithQuestionMark").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[SourceRef::Key("?propWithQuestionMark".into())]
        );
    }

    #[test]
    fn comma_splits_into_fallback_alternatives() {
        let selector = SourceSelector::parse("first_name, firstname, given_name").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[
                SourceRef::Key("first_name".into()),
                SourceRef::Key("firstname".into()),
                SourceRef::Key("given_name".into()),
            ]
        );
    }

    #[test]
    fn fallback_alternatives_may_mix_keys_and_queries() {
        let selector = SourceSelector::parse("name, ?$.person.name").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[
                SourceRef::Key("name".into()),
                SourceRef::Query("$.person.name".into()),
            ]
        );
    }

    #[test]
    fn union_commas_do_not_split_a_query() {
        let selector = SourceSelector::parse("?$.items[0,1]").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[SourceRef::Query("$.items[0,1]".into())]
        );
    }

    #[test]
    fn filter_commas_do_not_split_a_query() {
        let selector = SourceSelector::parse(r"?$.items[?(@.tag == 'a,b')].v").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[SourceRef::Query("$.items[?(@.tag == 'a,b')].v".into())]
        );
    }

    #[test]
    fn fallback_list_splits_around_bracketed_commas() {
        let selector = SourceSelector::parse("name, ?$.items[0,1].name").unwrap();
        assert_eq!(
            selector.alternatives(),
            &[
                SourceRef::Key("name".into()),
                SourceRef::Query("$.items[0,1].name".into()),
            ]
        );
    }

    #[test]
    fn union_query_resolves_to_its_first_match() {
        let source = json!({"items": ["zero", "one", "two"]});
        let selector = SourceSelector::parse("?$.items[1,2]").unwrap();
        assert_eq!(selector.resolve(&source).unwrap(), Some(json!("one")));
    }

    #[test]
    fn empty_alternative_is_a_rule_format_error() {
        assert!(matches!(
            SourceSelector::parse("").unwrap_err(),
            crate::Error::RuleFormat(_)
        ));
        assert!(matches!(
            SourceSelector::parse("a, , b").unwrap_err(),
            crate::Error::RuleFormat(_)
        ));
        assert!(matches!(
            SourceSelector::parse("?").unwrap_err(),
            crate::Error::RuleFormat(_)
        ));
    }

    #[test]
    fn resolves_direct_keys() {
        let source = json!({"firstname": "John"});
        let selector = SourceSelector::parse("firstname").unwrap();
        assert_eq!(selector.resolve(&source).unwrap(), Some(json!("John")));

        let selector = SourceSelector::parse("missing").unwrap();
        assert_eq!(selector.resolve(&source).unwrap(), None);
    }

    #[test]
    fn resolves_queries_against_nested_data() {
        let source = json!({"nestedObject": {"prop": "nested value"}});
        let selector = SourceSelector::parse("?$.nestedObject.prop").unwrap();
        assert_eq!(
            selector.resolve(&source).unwrap(),
            Some(json!("nested value"))
        );
    }

    #[test]
    fn first_resolving_fallback_wins() {
        let source = json!({"firstname": "John", "given_name": "Jack"});
        let selector = SourceSelector::parse("first_name, firstname, given_name").unwrap();
        assert_eq!(selector.resolve(&source).unwrap(), Some(json!("John")));
    }

    #[test]
    fn direct_lookup_treats_dotted_names_as_literal_keys() {
        let source = json!({"a.b": "literal", "a": {"b": "nested"}});
        let selector = SourceSelector::parse("a.b").unwrap();
        assert_eq!(selector.resolve(&source).unwrap(), Some(json!("literal")));
    }

    #[test]
    fn non_object_source_yields_not_found_for_direct_lookups() {
        let selector = SourceSelector::parse("key").unwrap();
        assert_eq!(selector.resolve(&json!([1, 2, 3])).unwrap(), None);
        assert_eq!(selector.resolve(&json!("scalar")).unwrap(), None);
    }

    #[test]
    fn invalid_query_is_an_error() {
        let selector = SourceSelector::parse("?$.[").unwrap();
        assert!(matches!(
            selector.resolve(&json!({})).unwrap_err(),
            crate::Error::Query(_)
        ));
    }
}
