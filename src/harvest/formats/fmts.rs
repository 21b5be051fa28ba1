//! `<package>.fmts`: one line per `AddFormat` directive.

use crate::harvest::directive::{field, first_quoted, key_values};
use crate::harvest::traits::{FileGenerator, GenerateError};
use crate::model::ResolvedPackageSet;

const MARKER: &str = "AddFormat";
const MISSING: &str = "-";

/// Renders a single `AddFormat` directive as `name engine patterns options`.
pub fn format_line(directive: &str) -> String {
    let mut args = key_values(directive);
    if let Some(options) = first_quoted(directive) {
        args.insert("options".to_string(), options.to_string());
    }
    format!(
        "{} {} {} {}\n",
        field(&args, "name", MISSING),
        field(&args, "engine", MISSING),
        field(&args, "patterns", MISSING),
        field(&args, "options", MISSING),
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatsGenerator;

impl FileGenerator for FormatsGenerator {
    fn file_name(&self, package: &str) -> String {
        format!("{}.fmts", package)
    }

    fn render(&self, packages: &ResolvedPackageSet) -> Result<String, GenerateError> {
        Ok(packages
            .iter()
            .flat_map(|record| record.executes())
            .filter(|entry| entry.contains(MARKER))
            .map(format_line)
            .collect())
    }

    fn stage_name(&self) -> &'static str {
        "fmts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::database::parse_database;
    use crate::harvest::resolver::resolve_packages;

    #[test]
    fn test_format_line_with_single_quoted_options() {
        assert_eq!(
            format_line("AddFormat name=pdftex engine=pdftex patterns=pdftex.ini options='-etex'"),
            "pdftex pdftex pdftex.ini -etex\n"
        );
    }

    #[test]
    fn test_format_line_defaults_missing_fields() {
        assert_eq!(format_line("AddFormat name=tex engine=tex"), "tex tex - -\n");
        assert_eq!(format_line("AddFormat"), "- - - -\n");
    }

    #[test]
    fn test_format_line_with_real_tlpdb_entry() {
        let entry = r#"AddFormat name=pdflatex engine=pdftex patterns=language.dat  options="-etex -translate-file=cp227.tcx *pdflatex.ini" fmttriggers=atbegshi,babel"#;
        assert_eq!(
            format_line(entry),
            "pdflatex pdftex language.dat -etex -translate-file=cp227.tcx *pdflatex.ini\n"
        );
    }

    #[test]
    fn test_render_keeps_package_order() {
        let db = parse_database(
            "name scheme-x\ndepend zpkg\ndepend apkg\n\n\
             name zpkg\nexecute AddFormat name=zz engine=e\n\n\
             name apkg\nexecute addMap a.map\nexecute AddFormat name=bb engine=e\nexecute AddFormat name=aa engine=e\n",
        )
        .unwrap();
        let resolved = resolve_packages("scheme-x", &db).unwrap();
        assert_eq!(
            FormatsGenerator.render(&resolved).unwrap(),
            "bb e - -\naa e - -\nzz e - -\n"
        );
        assert_eq!(FormatsGenerator.file_name("texlive-core"), "texlive-core.fmts");
    }
}
