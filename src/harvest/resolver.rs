//! Scheme resolution over the package database.
//!
//! Dependencies whose name contains `collection` or `scheme` are expanded
//! recursively; every other name is a leaf. A single-valued `depend` is
//! always a leaf, even when it names a collection, matching how the tlpdb
//! encodes one-dependency packages.

use indexmap::IndexSet;
use tracing::debug;

use crate::harvest::traits::ResolveError;
use crate::model::{AttributeValue, PackageDatabase, ResolvedPackageSet};

/// State shared by every level of one resolution.
#[derive(Debug, Default)]
struct TraversalContext {
    /// Collections and schemes already expanded
    visited_collections: IndexSet<String>,
    /// Flat dependency list in first-seen order
    resolved: IndexSet<String>,
}

fn is_collection(name: &str) -> bool {
    name.contains("collection") || name.contains("scheme")
}

fn expand(
    name: &str,
    database: &PackageDatabase,
    ctx: &mut TraversalContext,
) -> Result<(), ResolveError> {
    let record = database
        .get(name)
        .ok_or_else(|| ResolveError::UnknownPackage(name.to_string()))?;

    match record.get("depend") {
        None => {}
        Some(AttributeValue::Single(dep)) => {
            ctx.resolved.insert(dep.clone());
        }
        Some(AttributeValue::Multi(deps)) => {
            for dep in deps {
                if is_collection(dep) {
                    if ctx.visited_collections.insert(dep.clone()) {
                        expand(dep, database, ctx)?;
                    }
                } else {
                    ctx.resolved.insert(dep.clone());
                }
            }
        }
    }

    Ok(())
}

/// Computes the flat dependency list of `root`.
///
/// The list is in first-seen order and unsorted. Plain dependency names are
/// not checked against the database here.
///
/// # Errors
///
/// Returns [`ResolveError::UnknownPackage`] when `root` or an expanded
/// collection is missing from the database.
pub fn resolve(root: &str, database: &PackageDatabase) -> Result<Vec<String>, ResolveError> {
    let mut ctx = TraversalContext::default();
    expand(root, database, &mut ctx)?;
    debug!(
        root,
        collections = ctx.visited_collections.len(),
        dependencies = ctx.resolved.len(),
        "Resolved scheme"
    );
    Ok(ctx.resolved.into_iter().collect())
}

/// Resolves `root` and collects the records of every required package.
///
/// Names containing `.` are dropped; the result is sorted by name.
///
/// # Errors
///
/// Returns [`ResolveError::UnknownPackage`] if any remaining name is absent
/// from the database.
pub fn resolve_packages(
    root: &str,
    database: &PackageDatabase,
) -> Result<ResolvedPackageSet, ResolveError> {
    let mut names = resolve(root, database)?;
    names.sort();

    let mut resolved = ResolvedPackageSet::default();
    for name in names.into_iter().filter(|name| !name.contains('.')) {
        let record = database
            .get(&name)
            .ok_or_else(|| ResolveError::UnknownPackage(name.clone()))?;
        resolved.packages.insert(name, record.clone());
    }
    Ok(resolved)
}
