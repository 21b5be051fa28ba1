//! Harvest module - scheme resolution and release pipeline.
//!
//! This module provides the core of the harvester:
//! - **Database**: tlpdb parsing via [`database::parse_database`]
//! - **Resolver**: scheme expansion via [`resolver::resolve_packages`]
//! - **Formats**: derived files via the [`FileGenerator`] implementations
//! - **Pipeline**: async release executor via [`pipeline::HarvestPipeline`]

pub mod database;
pub mod directive;
pub mod formats;
pub mod pipeline;
pub mod resolver;
pub mod traits;

// Re-export commonly used types
pub use traits::{DatabaseError, FileGenerator, GenerateError, ResolveError};

pub use database::{parse_block, parse_database};
pub use resolver::{resolve, resolve_packages};

pub use pipeline::{HarvestPipeline, HarvestReport, HarvestStats, PipelineError, StagingArea};
