//! `language.def`: `\addlanguage` entries for e-TeX based formats.

use super::hyphen::{hyphen_directives, origin_comment, HyphenDirective};
use crate::harvest::traits::{FileGenerator, GenerateError};
use crate::model::ResolvedPackageSet;

fn addlanguage(name: &str, entry: &HyphenDirective) -> String {
    format!(
        "\\addlanguage{{{}}}{{{}}}{{}}{{{}}}{{{}}}\n",
        name, entry.file, entry.lefthyphenmin, entry.righthyphenmin
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageDefGenerator;

impl FileGenerator for LanguageDefGenerator {
    fn file_name(&self, package: &str) -> String {
        format!("{}-language.def", package)
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
                out.push_str(&addlanguage(&entry.name, entry));
                for synonym in &entry.synonyms {
                    out.push_str(&addlanguage(synonym, entry));
                }
            }
        }
        Ok(out)
    }

    fn stage_name(&self) -> &'static str {
        "language.def"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::database::parse_database;
    use crate::harvest::resolver::resolve_packages;

    #[test]
    fn test_synonyms_repeat_the_entry() {
        let db = parse_database(
            "name scheme-x\ndepend hyphen-english\ndepend other\n\n\
             name hyphen-english\nexecute AddHyphen name=english file=hyphen.tex lefthyphenmin=2 righthyphenmin=3 synonyms=USenglish,american\n\n\
             name other\nexecute addMap x.map\n",
        )
        .unwrap();
        let resolved = resolve_packages("scheme-x", &db).unwrap();

        assert_eq!(
            LanguageDefGenerator.render(&resolved).unwrap(),
            "% from hyphen-english:\n\
             \\addlanguage{english}{hyphen.tex}{}{2}{3}\n\
             \\addlanguage{USenglish}{hyphen.tex}{}{2}{3}\n\
             \\addlanguage{american}{hyphen.tex}{}{2}{3}\n"
        );
    }

    #[test]
    fn test_one_comment_per_package() {
        let db = parse_database(
            "name scheme-x\ndepend hyphen-greek\ndepend hyphen-base\n\n\
             name hyphen-base\nexecute AddHyphen name=nohyphenation file=zerohyph.tex\n\n\
             name hyphen-greek\nexecute AddHyphen name=monogreek file=a.tex lefthyphenmin=1 righthyphenmin=1\nexecute AddHyphen name=polygreek file=b.tex lefthyphenmin=1 righthyphenmin=1\n",
        )
        .unwrap();
        let resolved = resolve_packages("scheme-x", &db).unwrap();

        assert_eq!(
            LanguageDefGenerator.render(&resolved).unwrap(),
            "% from hyphen-base:\n\
             \\addlanguage{nohyphenation}{zerohyph.tex}{}{}{}\n\
             % from hyphen-greek:\n\
             \\addlanguage{monogreek}{a.tex}{}{1}{1}\n\
             \\addlanguage{polygreek}{b.tex}{}{1}{1}\n"
        );
    }
}
