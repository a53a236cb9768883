//! Flowlink Graph - snapshot loading, lookup index, and reference resolution

pub mod index;
pub mod resolver;
pub mod shape;
pub mod snapshot;

pub use index::{Entry, LookupIndex, Row};
pub use resolver::{ResolutionPath, Resolver};
pub use shape::Shape;
pub use snapshot::Snapshot;
