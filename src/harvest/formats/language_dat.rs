//! `language.dat`: pattern file registry for non e-TeX formats.

use super::hyphen::{hyphen_directives, origin_comment};
use crate::harvest::traits::{FileGenerator, GenerateError};
use crate::model::ResolvedPackageSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageDatGenerator;

impl FileGenerator for LanguageDatGenerator {
    fn file_name(&self, package: &str) -> String {
        format!("{}-language.dat", package)
    }

    fn render(&self, packages: &ResolvedPackageSet) -> Result<String, GenerateError> {
        let mut out = String::new();
        for record in packages.iter() {
            let entries = hyphen_directives(record);
            if entries.is_empty() {
                continue;
            }
            out.push_str(&origin_comment(record));
            for entry in &entries {
                out.push_str(&format!("{} {}\n", entry.name, entry.file));
                for synonym in &entry.synonyms {
                    out.push_str(&format!("={}\n", synonym));
                }
            }
        }
        Ok(out)
    }

    fn stage_name(&self) -> &'static str {
        "language.dat"
    }
}
