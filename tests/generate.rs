//! End-to-end generation over a fixture database.

use tlpdb_harvester::harvest::formats::{
    ContentsManifest, FormatsGenerator, LanguageDatGenerator, LanguageDefGenerator, MapsGenerator,
};
use tlpdb_harvester::harvest::{parse_database, resolve, resolve_packages, FileGenerator};
use tlpdb_harvester::PackageCollection;

const FIXTURE: &str = include_str!("fixtures/sample.tlpdb");

fn resolved() -> tlpdb_harvester::ResolvedPackageSet {
    let database = parse_database(FIXTURE).expect("fixture parses");
    resolve_packages(PackageCollection::TexliveBasic.scheme(), &database).expect("scheme resolves")
}

#[test]
fn test_resolution_of_fixture_scheme() {
    let database = parse_database(FIXTURE).unwrap();
    assert!(!database.contains_key("00texlive.config"));
    assert!(!database.contains_key("tex.x86_64-linux"));

    let flat = resolve("scheme-basic", &database).unwrap();
    assert_eq!(
        flat,
        vec![
            "amsfonts",
            "hyphen-base",
            "tex",
            "tex.x86_64-linux",
            "hyphen-english",
            "latex",
            "pdftex",
            "dvipdfmx",
        ]
    );

    let resolved = resolved();
    assert_eq!(
        resolved.names().collect::<Vec<_>>(),
        vec![
            "amsfonts",
            "dvipdfmx",
            "hyphen-base",
            "hyphen-english",
            "latex",
            "pdftex",
            "tex",
        ]
    );
}

#[test]
fn test_fmts_follow_package_order() {
    assert_eq!(
        FormatsGenerator.render(&resolved()).unwrap(),
        "latex pdftex language.dat -etex -translate-file=cp227.tcx *latex.ini\n\
         dvilualatex luatex language.dat,language.dat.lua dvilualatex.ini\n\
         pdftex pdftex language.def -translate-file=cp227.tcx *pdfetex.ini\n\
         tex tex - tex.ini\n"
    );
}

#[test]
fn test_maps_are_sorted() {
    assert_eq!(
        MapsGenerator.render(&resolved()).unwrap(),
        "KanjiMap otf-@kanjiEmbed@.map\n\
         Map cmother.map\n\
         Map dummy-space.map\n\
         MixedMap cm.map\n\
         MixedMap cmextra.map\n"
    );
}

#[test]
fn test_language_def() {
    assert_eq!(
        LanguageDefGenerator.render(&resolved()).unwrap(),
        "% from hyphen-base:\n\
         \\addlanguage{nohyphenation}{zerohyph.tex}{}{1}{1}\n\
         % from hyphen-english:\n\
         \\addlanguage{english}{hyphen.tex}{}{2}{3}\n\
         \\addlanguage{usenglish}{hyphen.tex}{}{2}{3}\n\
         \\addlanguage{USenglish}{hyphen.tex}{}{2}{3}\n\
         \\addlanguage{american}{hyphen.tex}{}{2}{3}\n\
         \\addlanguage{ukenglish}{loadhyph-en-gb.tex}{}{2}{3}\n\
         \\addlanguage{british}{loadhyph-en-gb.tex}{}{2}{3}\n\
         \\addlanguage{UKenglish}{loadhyph-en-gb.tex}{}{2}{3}\n"
    );
}

#[test]
fn test_language_dat() {
    assert_eq!(
        LanguageDatGenerator.render(&resolved()).unwrap(),
        "% from hyphen-base:\n\
         nohyphenation zerohyph.tex\n\
         % from hyphen-english:\n\
         english hyphen.tex\n\
         =usenglish\n\
         =USenglish\n\
         =american\n\
         ukenglish loadhyph-en-gb.tex\n\
         =british\n\
         =UKenglish\n"
    );
}

#[test]
fn test_contents_lists_revisions() {
    let contents = ContentsManifest::new("https://mirror.example/tlnet/")
        .render(&resolved())
        .unwrap();
    let rows: Vec<&str> = contents.lines().skip(5).collect();
    assert_eq!(
        rows,
        vec![
            "amsfonts 61937",
            "dvipdfmx 66203",
            "hyphen-base 66413",
            "hyphen-english 58609",
            "latex 65161",
            "pdftex 66243",
            "tex 66186",
        ]
    );
}
