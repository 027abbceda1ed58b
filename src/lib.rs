pub mod dirs;
pub mod extract;
pub mod structs;
pub mod tools;
pub mod walker;
pub mod wav;

pub use extract::{ExtractConfig, ExtractError, Extractor, RunSummary};
pub use structs::{AudioFile, Container, Event, MetadataDocument, SoundBank};
pub use walker::{BankWalker, ConversionRequest, ConversionSink, StorageKind, WalkStats};
