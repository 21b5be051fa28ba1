//! Micro-parser for `execute` directives.
//!
//! Directives look like
//! `AddFormat name=pdftex engine=pdftex options="-etex pdfetex.ini"`.
//! Arguments are `key=value` tokens; a quoted span carries values that
//! contain whitespace.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<key>\S*)=(?P<value>\S+)").expect("valid key=value pattern"));

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Collects the `key=value` arguments of a directive.
///
/// Values containing a quote character belong to a quoted span and are left
/// out; use [`first_quoted`] for those. A repeated key keeps its last value.
pub fn key_values(directive: &str) -> HashMap<String, String> {
    KEY_VALUE
        .captures_iter(directive)
        .filter(|caps| !caps["value"].contains(is_quote))
        .map(|caps| (caps["key"].to_string(), caps["value"].to_string()))
        .collect()
}

/// Returns the contents of the first quoted span.
///
/// The span opens on an unescaped `'` or `"` and closes on the next
/// unescaped occurrence of the same character. Escapes inside the span are
/// kept verbatim.
pub fn first_quoted(directive: &str) -> Option<&str> {
    let chars: Vec<(usize, char)> = directive.char_indices().collect();
    let escaped = |i: usize| i > 0 && chars[i - 1].1 == '\\';

    for (open, &(start, quote)) in chars.iter().enumerate() {
        if !is_quote(quote) || escaped(open) {
            continue;
        }
        let close = (open + 1..chars.len()).find(|&j| chars[j].1 == quote && !escaped(j));
        if let Some(close) = close {
            return Some(&directive[start + 1..chars[close].0]);
        }
    }
    None
}

/// Looks up `key` in parsed arguments, falling back to `default`.
pub fn field<'a>(args: &'a HashMap<String, String>, key: &str, default: &'a str) -> &'a str {
    args.get(key).map(String::as_str).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values_skips_quoted_values() {
        let args = key_values(
            r#"AddFormat name=pdftex engine=pdftex options="-etex -translate-file=cp227.tcx" patterns=language.def"#,
        );
        assert_eq!(args.get("name").map(String::as_str), Some("pdftex"));
        assert_eq!(args.get("patterns").map(String::as_str), Some("language.def"));
        assert!(!args.contains_key("options"));
        // The tail of the quoted span still looks like key=value.
        assert_eq!(args.get("-translate-file").map(String::as_str), None);
    }

    #[test]
    fn test_key_values_greedy_key() {
        let args = key_values("AddHyphen a=b=c");
        assert_eq!(args.get("a=b").map(String::as_str), Some("c"));
    }

    #[test]
    fn test_first_quoted_single_and_double() {
        assert_eq!(first_quoted("options='-etex'"), Some("-etex"));
        assert_eq!(first_quoted(r#"options="a b" other='c'"#), Some("a b"));
        assert_eq!(first_quoted("options=''"), Some(""));
        assert_eq!(first_quoted("no quotes here"), None);
    }

    #[test]
    fn test_first_quoted_respects_escapes() {
        assert_eq!(
            first_quoted(r#"options="say \"hi\" now""#),
            Some(r#"say \"hi\" now"#)
        );
        assert_eq!(first_quoted(r#"x=\"a "inner""#), Some("inner"));
    }

    #[test]
    fn test_first_quoted_skips_unterminated_opening() {
        assert_eq!(first_quoted(r#"it's "quoted""#), Some("quoted"));
    }

    #[test]
    fn test_field_default() {
        let args = key_values("AddHyphen name=german");
        assert_eq!(field(&args, "name", "-"), "german");
        assert_eq!(field(&args, "file", "-"), "-");
    }
}
