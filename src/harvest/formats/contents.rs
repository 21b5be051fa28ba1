//! `CONTENTS`: provenance listing of the bundled packages.

use crate::config::ensure_trailing_slash;
use crate::harvest::traits::{FileGenerator, GenerateError};
use crate::model::ResolvedPackageSet;

pub const CONTENTS_FILE: &str = "CONTENTS";

/// Lists every package with the TeX Live revision it was taken from.
#[derive(Debug, Clone)]
pub struct ContentsManifest {
    mirror_url: String,
}

impl ContentsManifest {
    pub fn new(mirror_url: &str) -> Self {
        Self {
            mirror_url: ensure_trailing_slash(mirror_url),
        }
    }

    fn header(&self) -> String {
        format!(
            "# These are the CTAN packages bundled in this package.\n\
             # They were downloaded from {}archive/\n\
             # The svn revision number (on the TeXLive repository)\n\
             # on which each package is based is given in the 2nd column.\n\n",
            self.mirror_url
        )
    }
}

impl FileGenerator for ContentsManifest {
    fn file_name(&self, _package: &str) -> String {
        CONTENTS_FILE.to_string()
    }

    fn render(&self, packages: &ResolvedPackageSet) -> Result<String, GenerateError> {
        let mut out = self.header();
        for record in packages.iter() {
            let revision = record
                .revision()
                .ok_or_else(|| GenerateError::MissingAttribute {
                    package: record.name.clone(),
                    attribute: "revision".to_string(),
                })?;
            out.push_str(&format!("{} {}\n", record.name, revision));
        }
        Ok(out)
    }

    fn stage_name(&self) -> &'static str {
        "contents"
    }
}
