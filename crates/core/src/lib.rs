mod apply;
mod batch;
mod config;
mod date_parser;
mod devices;
mod exif_reader;
mod identity;
mod metadata;
mod prompt;
mod rules;
mod sanitize;
mod video_probe;

#[cfg(test)]
mod test_support;

pub use apply::{RenameExecutor, RenameOutcome};
pub use batch::{
    collect_media_files, process_folder, BatchEntry, BatchOptions, BatchOutcome, BatchReport,
    BatchStats, RenameStatus,
};
pub use config::{app_paths, load_config, save_config, AppConfig, AppPaths};
pub use date_parser::{parse_first, DatePattern, CANONICAL_FORMAT};
pub use devices::Device;
pub use identity::{IdentityResolver, IdentityTable, SessionState, KNOWN_IDENTITIES};
pub use metadata::{
    FileMetadata, MediaFile, MediaKind, MetadataError, MetadataProvider, PhotoTags,
    SystemMetadataProvider,
};
pub use prompt::{Cancelled, Confirmation, Prompter};
pub use rules::{NamingRule, Proposal, RuleError, RuleKind, RuleSelection, RuleSettings};
pub use sanitize::{canonical_identity, is_already_handled};
pub use video_probe::ProbeReport;
