//! Parser for the TeX Live package database (`texlive.tlpdb`).
//!
//! The database is a sequence of blank-line separated blocks, one per
//! package. Each line of a block is `key value...`; a key repeated within a
//! block becomes a list. Lines starting with whitespace (file listings) have
//! an empty key and are skipped.

use indexmap::IndexMap;
use tracing::debug;

use crate::harvest::traits::DatabaseError;
use crate::model::{AttributeValue, PackageDatabase, PackageRecord};

/// Parses one block into its key/value mapping.
///
/// The first occurrence of a key stores a plain string, later occurrences
/// promote it to a list. This is the only place the block format is parsed;
/// every consumer works on the returned attributes.
pub fn parse_block(block: &str) -> IndexMap<String, AttributeValue> {
    let mut attributes: IndexMap<String, AttributeValue> = IndexMap::new();

    for line in block.lines() {
        let (key, value) = match line.find(char::is_whitespace) {
            Some(split) => (&line[..split], line[split..].trim()),
            None => (line, ""),
        };
        if key.is_empty() {
            continue;
        }

        match attributes.get_mut(key) {
            Some(existing) => existing.push(value.to_string()),
            None => {
                attributes.insert(key.to_string(), AttributeValue::Single(value.to_string()));
            }
        }
    }

    attributes
}

/// Splits the database text into its non-empty blocks.
fn blocks(text: &str) -> impl Iterator<Item = String> + '_ {
    let mut current: Vec<&str> = Vec::new();
    let mut lines = text.lines();
    std::iter::from_fn(move || loop {
        match lines.next() {
            Some(line) if line.trim().is_empty() => {
                if !current.is_empty() {
                    return Some(std::mem::take(&mut current).join("\n"));
                }
            }
            Some(line) => current.push(line),
            None if !current.is_empty() => return Some(std::mem::take(&mut current).join("\n")),
            None => return None,
        }
    })
}

/// Parses the whole database.
///
/// Blocks whose name contains `.` (architecture-specific binaries and
/// `00texlive.*` configuration entries) are not packages and are dropped.
///
/// # Errors
///
/// Returns [`DatabaseError::MissingName`] for the first block without a
/// `name` key. Nothing is returned for the rest of the database.
pub fn parse_database(text: &str) -> Result<PackageDatabase, DatabaseError> {
    let mut database = PackageDatabase::new();
    let mut skipped = 0usize;

    for (index, block) in blocks(text).enumerate() {
        let attributes = parse_block(&block);
        let name = attributes
            .get("name")
            .and_then(AttributeValue::first)
            .ok_or(DatabaseError::MissingName { block: index + 1 })?
            .to_string();

        if name.contains('.') {
            skipped += 1;
            continue;
        }
        database.insert(name.clone(), PackageRecord { name, attributes });
    }

    debug!(packages = database.len(), skipped, "Parsed package database");
    Ok(database)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
name 00texlive.config
category Config
depend minrelease/2016

name amsfonts
category Package
revision 61937
runfiles size=1234
 texmf-dist/fonts/map/dvips/amsfonts/cmother.map
execute addMap cmother.map
execute addMixedMap cm.map

name amsfonts.x86_64-linux
category Package
revision 100

name scheme-minimal
category Scheme
revision 13822
depend collection-basic
";

    /// Writes a record back in block form.
    fn render_block(attributes: &IndexMap<String, AttributeValue>) -> String {
        let mut out = String::new();
        for (key, value) in attributes {
            for entry in value.iter() {
                out.push_str(&format!("{} {}\n", key, entry));
            }
        }
        out
    }

    #[test]
    fn test_parse_block_groups_repeated_keys() {
        let attributes = parse_block("name foo\ndepend a\ndepend b\ndepend c\nrevision 7");
        assert_eq!(attributes["name"], AttributeValue::Single("foo".into()));
        assert_eq!(
            attributes["depend"],
            AttributeValue::Multi(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(attributes["revision"], AttributeValue::Single("7".into()));
    }

    #[test]
    fn test_parse_block_trims_values_and_skips_indented_lines() {
        let attributes = parse_block("name foo\nshortdesc   Some text here  \n doc/file.pdf\nempty");
        assert_eq!(
            attributes["shortdesc"],
            AttributeValue::Single("Some text here".into())
        );
        assert_eq!(attributes["empty"], AttributeValue::Single(String::new()));
        assert_eq!(attributes.len(), 3);
    }

    #[test]
    fn test_block_round_trip_preserves_grouping() {
        let block = "name foo\nexecute addMap a.map\ncategory Package\nexecute addMap b.map\n";
        let attributes = parse_block(block);
        assert_eq!(
            render_block(&attributes),
            "name foo\nexecute addMap a.map\nexecute addMap b.map\ncategory Package\n"
        );
        assert_eq!(parse_block(&render_block(&attributes)), attributes);
    }

    #[test]
    fn test_parse_database_drops_dotted_names() {
        let database = parse_database(SAMPLE).unwrap();
        let names: Vec<&str> = database.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["amsfonts", "scheme-minimal"]);
        assert_eq!(database["amsfonts"].revision(), Some("61937"));
        assert_eq!(
            database["amsfonts"].executes().collect::<Vec<_>>(),
            vec!["addMap cmother.map", "addMixedMap cm.map"]
        );
    }

    #[test]
    fn test_parse_database_handles_trailing_block_without_blank_line() {
        let database = parse_database("name a\n\nname b").unwrap();
        assert!(database.contains_key("a"));
        assert!(database.contains_key("b"));
    }

    #[test]
    fn test_parse_database_rejects_block_without_name() {
        let result = parse_database("name a\n\ncategory Package\nrevision 1\n");
        assert_eq!(result, Err(DatabaseError::MissingName { block: 2 }));
    }

    #[test]
    fn test_parse_database_ignores_extra_blank_lines() {
        let database = parse_database("\n\nname a\n\n\n\nname b\n\n").unwrap();
        assert_eq!(database.len(), 2);
    }
}
