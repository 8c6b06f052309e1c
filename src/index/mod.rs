//! Index building and snapshot persistence.

pub mod build;
pub mod snapshot;
pub mod types;

pub use build::build_index;
pub use snapshot::SnapshotStore;
pub use types::{BookIndex, IndexStats};
