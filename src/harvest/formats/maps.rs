//! `<package>.maps`: every font map directive, sorted across the whole file.

use crate::harvest::traits::{FileGenerator, GenerateError};
use crate::model::ResolvedPackageSet;

/// Map kinds in match priority.
const MAP_KINDS: [&str; 3] = ["MixedMap", "Map", "KanjiMap"];

/// Strips the `add` prefix of a map directive.
///
/// `addMixedMap foo.map` becomes `MixedMap foo.map`. Returns `None` for
/// entries without a map directive or with nothing after the kind.
pub fn map_line(directive: &str) -> Option<&str> {
    MAP_KINDS.iter().find_map(|kind| {
        let start = directive.find(&format!("add{}", kind))? + "add".len();
        let line = directive[start..].lines().next()?;
        (line.len() > kind.len()).then_some(line)
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MapsGenerator;

impl FileGenerator for MapsGenerator {
    fn file_name(&self, package: &str) -> String {
        format!("{}.maps", package)
    }

    fn render(&self, packages: &ResolvedPackageSet) -> Result<String, GenerateError> {
        let mut lines: Vec<&str> = packages
            .iter()
            .flat_map(|record| record.executes())
            .filter_map(map_line)
            .collect();
        lines.sort_unstable();

        Ok(lines.iter().map(|line| format!("{}\n", line)).collect())
    }

    fn stage_name(&self) -> &'static str {
        "maps"
    }
}
