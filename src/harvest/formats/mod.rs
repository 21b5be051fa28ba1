//! Generators for the files derived from a resolved scheme.
//!
//! - `fmts` - format definitions (`AddFormat`)
//! - `maps` - font maps (`addMap`, `addMixedMap`, `addKanjiMap`), globally sorted
//! - `language_def` / `language_dat` - hyphenation registries (`AddHyphen`)
//! - `contents` - the `CONTENTS` provenance listing

pub mod contents;
pub mod fmts;
mod hyphen;
pub mod language_dat;
pub mod language_def;
pub mod maps;

pub use contents::{ContentsManifest, CONTENTS_FILE};
pub use fmts::FormatsGenerator;
pub use hyphen::HyphenDirective;
pub use language_dat::LanguageDatGenerator;
pub use language_def::LanguageDefGenerator;
pub use maps::MapsGenerator;

use crate::harvest::traits::FileGenerator;

/// The generators published next to every bundle.
pub fn release_generators() -> Vec<Box<dyn FileGenerator>> {
    vec![
        Box::new(FormatsGenerator),
        Box::new(MapsGenerator),
        Box::new(LanguageDefGenerator),
        Box::new(LanguageDatGenerator),
    ]
}
