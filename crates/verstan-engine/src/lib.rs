pub mod context;
pub mod io;
pub mod metadata;
pub mod model;
pub mod morphology;
pub mod phonetic;
pub mod pipeline;
pub mod query;
pub mod scansion;
pub mod segment;
pub mod stats;
pub mod tools;

// Re-export key types for easier usage
pub use context::*;
pub use io::*;
pub use model::*;
pub use pipeline::*;
pub use tools::*;
