//! Shared parsing of `AddHyphen` directives.

use crate::harvest::directive::{field, key_values};
use crate::model::PackageRecord;
use tracing::debug;

const MARKER: &str = "AddHyphen";

/// Arguments of one `AddHyphen` directive; absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HyphenDirective {
    pub name: String,
    pub file: String,
    /// UTF-8 pattern and exception files. Neither registry format has a
    /// column for them; they only show up in debug output.
    file_patterns: String,
    file_exceptions: String,
    pub lefthyphenmin: String,
    pub righthyphenmin: String,
    pub synonyms: Vec<String>,
}

impl HyphenDirective {
    pub fn parse(directive: &str) -> Self {
        let args = key_values(directive);
        let get = |key: &str| field(&args, key, "").to_string();
        Self {
            name: get("name"),
            file: get("file"),
            file_patterns: get("file_patterns"),
            file_exceptions: get("file_exceptions"),
            lefthyphenmin: get("lefthyphenmin"),
            righthyphenmin: get("righthyphenmin"),
            synonyms: field(&args, "synonyms", "")
                .split(',')
                .filter(|synonym| !synonym.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Hyphenation directives of `record`, in `execute` order.
pub fn hyphen_directives(record: &PackageRecord) -> Vec<HyphenDirective> {
    record
        .executes()
        .filter(|entry| entry.contains(MARKER))
        .map(HyphenDirective::parse)
        .inspect(|entry| {
            debug!(
                package = %record.name,
                language = %entry.name,
                patterns = %entry.file_patterns,
                exceptions = %entry.file_exceptions,
                "Hyphenation entry"
            )
        })
        .collect()
}

/// Comment line heading the entries contributed by `record`.
pub fn origin_comment(record: &PackageRecord) -> String {
    format!("% from {}:\n", record.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_directive() {
        let parsed = HyphenDirective::parse(
            "AddHyphen name=german file=loadhyph-de-1901.tex lefthyphenmin=2 righthyphenmin=2 file_patterns=hyph-de-1901.pat.txt file_exceptions=",
        );
        assert_eq!(parsed.name, "german");
        assert_eq!(parsed.file, "loadhyph-de-1901.tex");
        assert_eq!(parsed.file_patterns, "hyph-de-1901.pat.txt");
        // `file_exceptions=` has no value and does not match.
        assert_eq!(parsed.file_exceptions, "");
        assert!(parsed.synonyms.is_empty());
    }

    #[test]
    fn test_directives_keep_execute_order() {
        let record = PackageRecord {
            name: "hyphen-german".to_string(),
            attributes: crate::harvest::database::parse_block(
                "name hyphen-german\n\
                 execute AddHyphen name=german file=loadhyph-de-1901.tex file_patterns=hyph-de-1901.pat.txt\n\
                 execute AddFormat name=ignored engine=tex\n\
                 execute AddHyphen name=ngerman file=loadhyph-de-1996.tex file_exceptions=hyph-de-1996.hyp.txt",
            ),
        };

        let entries = hyphen_directives(&record);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "german");
        assert_eq!(entries[0].file_patterns, "hyph-de-1901.pat.txt");
        assert_eq!(entries[1].name, "ngerman");
        assert_eq!(entries[1].file_exceptions, "hyph-de-1996.hyp.txt");
        assert_eq!(origin_comment(&record), "% from hyphen-german:\n");
    }

    #[test]
    fn test_parse_synonyms() {
        let parsed = HyphenDirective::parse("AddHyphen name=english synonyms=USenglish,american");
        assert_eq!(parsed.synonyms, vec!["USenglish", "american"]);
    }
}
