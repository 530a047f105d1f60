//! Content index over local files.
//!
//! The index is built by walking the configured source roots and answers two
//! questions while torrents are matched:
//!
//! - which local file has this size and (normalized) name, and
//! - which local directory holds exactly this set of `(relative path, size)`
//!   pairs (only when the directory index is enabled).
//!
//! A rebuild replaces both maps in one step; a failed scan leaves the previous
//! maps untouched. `IndexStore` persists an index between runs.

mod content_index;
mod error;
mod normalize;
mod scan;
mod store;
mod types;

pub use content_index::ContentIndex;
pub use error::IndexError;
pub use normalize::NormalizeRules;
pub use store::IndexStore;
pub use types::{DirectoryListing, DirectorySignature, IndexKey, IndexStats};
