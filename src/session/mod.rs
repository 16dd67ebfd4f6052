pub mod counter;
pub mod metadata;
pub mod store;

pub use counter::{SessionCounter, SessionId};
pub use metadata::{
    EntryParseError, LABEL_TAXONOMY, MetadataRecord, parse_entries,
};
pub use store::DatasetStore;
