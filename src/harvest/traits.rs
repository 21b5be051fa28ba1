//! Core traits and error types for the harvest engine.
//!
//! - Output generation via [`FileGenerator`]
//! - Errors for database parsing, scheme resolution and file generation

use thiserror::Error;

use crate::model::ResolvedPackageSet;

// ============================================================================
// Generator Trait
// ============================================================================

/// Produces one derived file from a resolved package set.
///
/// Generators are read-only consumers of the same [`ResolvedPackageSet`] and
/// may run in any order.
///
/// # Examples
///
/// ```ignore
/// let fmts = FormatsGenerator.render(&resolved)?;
/// std::fs::write(dir.join(FormatsGenerator.file_name("texlive-core")), fmts)?;
/// ```
pub trait FileGenerator: Send + Sync {
    /// Name of the generated file for the bundle `package`.
    fn file_name(&self, package: &str) -> String;

    /// Renders the full file contents.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] when a package lacks an attribute the
    /// output cannot do without. Unparseable directives are skipped, never
    /// reported.
    fn render(&self, packages: &ResolvedPackageSet) -> Result<String, GenerateError>;

    /// Returns a human-readable name for logging.
    fn stage_name(&self) -> &'static str;
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while parsing the package database.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DatabaseError {
    /// A block has no `name` key
    #[error("Malformed database: block {block} has no name")]
    MissingName { block: usize },
}

/// Errors raised while resolving a scheme.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// A package was referenced but is absent from the database
    #[error("Package '{0}' not found in database")]
    UnknownPackage(String),
}

/// Errors raised while generating output files.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// A package lacks an attribute required by the output
    #[error("Package '{package}' has no '{attribute}' attribute")]
    MissingAttribute { package: String, attribute: String },

    /// Writing the generated file failed
    #[error("I/O error while writing output: {0}")]
    Io(#[from] std::io::Error),
}
