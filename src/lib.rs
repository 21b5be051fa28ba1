pub mod archive;
pub mod checksum;
pub mod config;
pub mod executor;
pub mod harvest;
pub mod mirror;
pub mod model;
pub mod traits;
pub mod upload;

// Re-export common types for convenience
pub use config::*;
pub use executor::*;
pub use model::*;
pub use traits::*;
