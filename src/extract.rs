use std::{
    collections::HashSet,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use log::{info, warn};
use thiserror::Error;

use crate::{
    dirs::{create_dir, is_valid_name, output_path, remove_dir, reset_dir, DirError},
    structs::{MetadataDocument, SoundBank, METADATA_EXTENSION},
    tools::Unpacker,
    walker::{BankWalker, ConversionSink, WalkStats},
};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Dir(#[from] DirError),
    #[error("Error reading input directory {path:?}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("could not read: {0}")]
    Io(#[from] io::Error),
    #[error("malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// directory with the json metadata, streamed wems and bank payloads
    pub input_dir: PathBuf,
    /// gets one subdirectory per bank
    pub output_dir: PathBuf,
    /// holds the unpacked payload of the current bank
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub banks: usize,
    pub files: WalkStats,
    pub skipped_documents: usize,
    pub duplicate_banks: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done. Converted {} files ({} disk, {} mem) from {} banks, {} events visited.",
            self.files.converted(),
            self.files.streamed,
            self.files.memory,
            self.banks,
            self.files.events
        )?;
        if self.skipped_documents > 0 {
            write!(f, " Skipped {} json files.", self.skipped_documents)?;
        }
        if self.duplicate_banks > 0 {
            write!(f, " Skipped {} duplicate banks.", self.duplicate_banks)?;
        }
        if self.files.failed_outputs > 0 {
            write!(f, " {} outputs missing or unreadable.", self.files.failed_outputs)?;
        }
        Ok(())
    }
}

/// Everything that lives for the whole run: counters and the names of processed banks
#[derive(Debug, Default)]
pub struct ExtractionContext {
    pub summary: RunSummary,
    claimed_banks: HashSet<String>,
}

impl ExtractionContext {
    /// returns false if a bank with that name was already processed
    pub fn claim_bank(&mut self, name: &str) -> bool {
        self.claimed_banks.insert(name.to_owned())
    }
}

/// sorted list of all metadata files in the directory
pub fn metadata_documents(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == METADATA_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

pub fn read_document(path: &Path) -> Result<MetadataDocument, DocumentError> {
    let bytes = fs::read(path)?;
    Ok(MetadataDocument::from_slice(&bytes)?)
}

pub struct Extractor<'a, C: ?Sized, U: ?Sized> {
    config: &'a ExtractConfig,
    converter: &'a mut C,
    unpacker: &'a mut U,
    context: ExtractionContext,
}

impl<'a, C, U> Extractor<'a, C, U>
where
    C: ConversionSink + ?Sized,
    U: Unpacker + ?Sized,
{
    pub fn new(config: &'a ExtractConfig, converter: &'a mut C, unpacker: &'a mut U) -> Self {
        Extractor {
            config,
            converter,
            unpacker,
            context: ExtractionContext::default(),
        }
    }

    /// Processes every metadata document of the input directory.
    ///
    /// Only fails on problems with the directory structure, everything else is
    /// logged and skipped.
    pub fn run(mut self) -> Result<RunSummary, ExtractError> {
        let input_dir = &self.config.input_dir;
        let documents =
            metadata_documents(input_dir).map_err(|source| ExtractError::ReadInput {
                path: input_dir.clone(),
                source,
            })?;
        create_dir(&self.config.output_dir)?;
        for path in documents {
            self.process_document(&path)?;
        }
        remove_dir(&self.config.scratch_dir)?;
        Ok(self.context.summary)
    }

    pub fn process_document(&mut self, path: &Path) -> Result<(), ExtractError> {
        let doc = match read_document(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("json file {path:?} skipped, {e}");
                self.context.summary.skipped_documents += 1;
                return Ok(());
            }
        };
        let Some(banks) = doc.sound_banks() else {
            info!("Non SoundBanksInfo json file skipped: {path:?}");
            self.context.summary.skipped_documents += 1;
            return Ok(());
        };
        let doc_name = path.file_name().unwrap_or(path.as_os_str());
        for bank in banks {
            info!("Bank: {} in {}", bank.short_name, doc_name.to_string_lossy());
            self.process_bank(bank)?;
        }
        Ok(())
    }

    pub fn process_bank(&mut self, bank: &SoundBank) -> Result<(), ExtractError> {
        let name = &bank.short_name;
        if !is_valid_name(name) {
            warn!("Bank name {name:?} can't be used as a directory, skipping");
            return Ok(());
        }
        let bank_out_dir = output_path(&self.config.output_dir, name);
        if !self.context.claim_bank(name) || bank_out_dir.is_dir() {
            warn!("Duplicate bank {name}, skipping");
            self.context.summary.duplicate_banks += 1;
            return Ok(());
        }
        create_dir(&bank_out_dir)?;
        self.context.summary.banks += 1;

        let scratch_dir = &self.config.scratch_dir;
        reset_dir(scratch_dir)?;
        if let Some(payload) = bank.container_payload() {
            let payload = self.config.input_dir.join(payload);
            info!("unpacking {payload:?}");
            self.unpacker.unpack(&payload, scratch_dir);
        }

        let mut walker = BankWalker::new(
            &self.config.input_dir,
            scratch_dir,
            &bank_out_dir,
            &mut *self.converter,
        );
        if let Err(e) = walker.walk(&bank.contents) {
            remove_dir(scratch_dir)?;
            return Err(e.into());
        }
        let stats = walker.into_stats();
        info!(
            "{name}: {} disk, {} mem, {} events",
            stats.streamed, stats.memory, stats.events
        );
        self.context.summary.files += stats;

        // the next bank must not see this one's files
        reset_dir(scratch_dir)?;
        Ok(())
    }
}
