//! Session controller: one seeding decision per torrent descriptor.
//!
//! A session owns the content index, the client connection and the set of
//! info-hashes the client is known to seed. For each descriptor it decides
//! one `Status`:
//!
//! - `AlreadySeeding` when the info-hash is in the seeded set
//! - `FolderExistNotSeeding` when the destination folder is already on disk
//! - `MissingFiles` when too much content is absent from the index
//! - `Ok` after the content was linked and the client accepted the torrent
//!
//! No filesystem write or client call happens before the `Ok` path is
//! chosen, and links always exist before the client is told about them.

mod controller;
mod error;
mod seeded;
mod types;

pub use controller::{inspect_descriptor, SessionController};
pub use error::SessionError;
pub use seeded::SeededSet;
pub use types::{BatchEntry, MatchReport, SessionOutcome, SessionSettings, Status};
