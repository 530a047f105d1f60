pub mod config;
pub mod descriptor;
pub mod index;
pub mod linker;
pub mod matcher;
pub mod session;
pub mod testing;
pub mod torrent_client;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use descriptor::{decode, DeclaredFile, DescriptorError, TorrentDescriptor, TorrentLayout};
pub use index::{ContentIndex, DirectorySignature, IndexError, IndexStore, NormalizeRules};
pub use linker::{FsLinker, LinkType, LinkerError};
pub use matcher::{FileMatch, MatchMode, MatchResult, Matcher};
pub use session::{SessionController, SessionError, SessionOutcome, SessionSettings, Status};
pub use torrent_client::{QBittorrentClient, TorrentClient, TorrentClientError};
