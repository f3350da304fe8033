//! Escape-aware marker detection for selector strings.
//!
//! A selector can carry a single control character at one end: a trailing `*`
//! marks a destination as preserve-only, a leading `?` marks a source as a
//! path query. Doubling the marker character escapes it, so `"value**"` means
//! the literal key `"value*"` while `"value*"` means key `"value"` plus the
//! marker. Detection counts the maximal marker run at the relevant end: an
//! odd run carries one semantic marker, an even run is all escaped pairs.

/// Consume a trailing marker character from `input`.
///
/// Returns whether the string was marked together with the normalized string
/// (escaped pairs collapsed, the semantic marker removed).
///
/// With `marker = '*'`:
/// - `"value*"` is marked, normalized to `"value"`
/// - `"value**"` is not marked, normalized to `"value*"`
/// - `"value***"` is marked, normalized to `"value*"`
/// - `"value****"` is not marked, normalized to `"value**"`
#[must_use]
pub fn consume_trailing_marker(input: &str, marker: char) -> (bool, String) {
    let run = input.chars().rev().take_while(|&c| c == marker).count();
    if run == 0 {
        return (false, input.to_string());
    }
    let marked = run % 2 == 1;
    let dropped = if marked { run.div_ceil(2) } else { run / 2 };
    let keep = input.chars().count() - dropped;
    (marked, input.chars().take(keep).collect())
}

/// Consume a leading marker character from `input`.
///
/// Mirror image of [`consume_trailing_marker`], operating on a prefix run
/// with the same parity and doubling rule.
#[must_use]
pub fn consume_leading_marker(input: &str, marker: char) -> (bool, String) {
    let run = input.chars().take_while(|&c| c == marker).count();
    if run == 0 {
        return (false, input.to_string());
    }
    let marked = run % 2 == 1;
    let dropped = if marked { run.div_ceil(2) } else { run / 2 };
    (marked, input.chars().skip(dropped).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_marker_examples() {
        assert_eq!(consume_trailing_marker("value", '*'), (false, "value".into()));
        assert_eq!(consume_trailing_marker("value*", '*'), (true, "value".into()));
        assert_eq!(consume_trailing_marker("value**", '*'), (false, "value*".into()));
        assert_eq!(consume_trailing_marker("value***", '*'), (true, "value*".into()));
        assert_eq!(consume_trailing_marker("value****", '*'), (false, "value**".into()));
    }

    #[test]
    fn leading_marker_examples() {
        assert_eq!(consume_leading_marker("value", '?'), (false, "value".into()));
        assert_eq!(consume_leading_marker("?value", '?'), (true, "value".into()));
        assert_eq!(consume_leading_marker("??value", '?'), (false, "?value".into()));
        assert_eq!(consume_leading_marker("???value", '?'), (true, "?value".into()));
        assert_eq!(consume_leading_marker("????value", '?'), (false, "??value".into()));
    }

    #[test]
    fn empty_string_is_not_marked() {
        assert_eq!(consume_trailing_marker("", '*'), (false, String::new()));
        assert_eq!(consume_leading_marker("", '?'), (false, String::new()));
    }

    #[test]
    fn marker_only_strings() {
        assert_eq!(consume_trailing_marker("*", '*'), (true, String::new()));
        assert_eq!(consume_trailing_marker("**", '*'), (false, "*".into()));
        assert_eq!(consume_leading_marker("?", '?'), (true, String::new()));
        assert_eq!(consume_leading_marker("??", '?'), (false, "?".into()));
    }

    #[test]
    fn run_parity_property() {
        // Marked iff the run length is odd; normalized length drops
        // ceil(k/2) when marked and k/2 when not.
        for k in 0..=6usize {
            let input = format!("base{}", "*".repeat(k));
            let (marked, normalized) = consume_trailing_marker(&input, '*');
            assert_eq!(marked, k % 2 == 1, "run of {k}");
            let expected_len = input.len() - if marked { k.div_ceil(2) } else { k / 2 };
            assert_eq!(normalized.len(), expected_len, "run of {k}");

            let input = format!("{}base", "?".repeat(k));
            let (marked, normalized) = consume_leading_marker(&input, '?');
            assert_eq!(marked, k % 2 == 1, "run of {k}");
            let expected_len = input.len() - if marked { k.div_ceil(2) } else { k / 2 };
            assert_eq!(normalized.len(), expected_len, "run of {k}");
        }
    }

    #[test]
    fn markers_at_the_wrong_end_are_data() {
        assert_eq!(consume_trailing_marker("*value", '*'), (false, "*value".into()));
        assert_eq!(consume_leading_marker("value?", '?'), (false, "value?".into()));
    }
}
