use serde::{Deserialize, Deserializer};

/// A parsed json metadata file, only the `SoundBanksInfo` part is of interest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataDocument {
    #[serde(rename = "SoundBanksInfo", default)]
    pub sound_banks_info: Option<SoundBanksInfo>,
}

impl MetadataDocument {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// the banks of this document, `None` if this isn't a soundbank info document
    pub fn sound_banks(&self) -> Option<&[SoundBank]> {
        self.sound_banks_info
            .as_ref()
            .map(|info| info.sound_banks.as_slice())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SoundBanksInfo {
    #[serde(default)]
    pub sound_banks: Vec<SoundBank>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SoundBank {
    pub short_name: String,
    /// path of the bank payload, relative to the input directory
    #[serde(default)]
    pub path: Option<String>,
    #[serde(flatten)]
    pub contents: Container,
}

impl SoundBank {
    /// returns the payload path if it points to a bank file that has to be unpacked
    pub fn container_payload(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| {
            std::path::Path::new(p)
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(BANK_EXTENSION))
        })
    }
}

/// The relations shared by banks and events.
///
/// Events can include other events, so this is a tree of containers
/// with audio files as leaves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Container {
    #[serde(rename = "IncludedEvents", default)]
    pub events: Vec<Event>,
    #[serde(rename = "ReferencedStreamedFiles", default)]
    pub streamed_files: Vec<AudioFile>,
    #[serde(rename = "IncludedMemoryFiles", default)]
    pub memory_files: Vec<AudioFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub contents: Container,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AudioFile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// output name, can contain subdirectories
    pub short_name: String,
    /// only present on prefetched memory files, the full file is streamed
    #[serde(default)]
    pub prefetch_size: Option<serde_json::Value>,
}

impl AudioFile {
    pub fn is_prefetch(&self) -> bool {
        self.prefetch_size.is_some()
    }

    /// name of the wem file holding the data of this entry
    pub fn source_file_name(&self) -> String {
        format!("{}.{}", self.id, AUDIO_EXTENSION)
    }
}

pub const AUDIO_EXTENSION: &str = "wem";
pub const BANK_EXTENSION: &str = "bnk";
pub const METADATA_EXTENSION: &str = "json";

// ids are strings in newer SoundbanksInfo files, but numbers in some older ones
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Num(u64),
    }
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Str(s) => s,
        RawId::Num(n) => n.to_string(),
    })
}
