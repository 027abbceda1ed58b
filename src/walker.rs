use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::{
    dirs::{create_dir, is_valid_name, output_path, DirError},
    structs::{AudioFile, Container},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// standalone wem in the input directory
    Streamed,
    /// unpacked from the bank payload into the scratch directory
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub kind: StorageKind,
}

/// Receives every resolved audio file of a bank, in traversal order.
///
/// The destination's parent directory already exists when this is called.
/// Returns whether the conversion produced usable output; that is only used for reporting.
pub trait ConversionSink {
    fn convert(&mut self, request: &ConversionRequest) -> bool;
}

impl<F: FnMut(&ConversionRequest) -> bool> ConversionSink for F {
    fn convert(&mut self, request: &ConversionRequest) -> bool {
        self(request)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub streamed: usize,
    pub memory: usize,
    pub events: usize,
    /// conversions that didn't leave a readable wav behind
    pub failed_outputs: usize,
}

impl WalkStats {
    pub fn converted(&self) -> usize {
        self.streamed + self.memory
    }
}

impl std::ops::AddAssign for WalkStats {
    fn add_assign(&mut self, rhs: Self) {
        self.streamed += rhs.streamed;
        self.memory += rhs.memory;
        self.events += rhs.events;
        self.failed_outputs += rhs.failed_outputs;
    }
}

// a name without any path segment would make the bank directory itself the output
fn has_output_name(file: &AudioFile) -> bool {
    if is_valid_name(&file.short_name) {
        true
    } else {
        warn!(
            "{} has no usable output name {:?}, skipping",
            file.id, file.short_name
        );
        false
    }
}

/// Resolves all audio files of one bank.
///
/// Per container, included events are walked first (depth first), then the
/// streamed files, then the memory files.
pub struct BankWalker<'a, S: ?Sized> {
    input_dir: &'a Path,
    scratch_dir: &'a Path,
    bank_out_dir: &'a Path,
    sink: &'a mut S,
    stats: WalkStats,
}

impl<'a, S: ConversionSink + ?Sized> BankWalker<'a, S> {
    pub fn new(
        input_dir: &'a Path,
        scratch_dir: &'a Path,
        bank_out_dir: &'a Path,
        sink: &'a mut S,
    ) -> Self {
        BankWalker {
            input_dir,
            scratch_dir,
            bank_out_dir,
            sink,
            stats: WalkStats::default(),
        }
    }

    /// walks the container and everything below it
    ///
    /// only fails if an output directory can't be created
    pub fn walk(&mut self, container: &Container) -> Result<(), DirError> {
        for event in &container.events {
            self.stats.events += 1;
            debug!("event {}", event.name.as_deref().unwrap_or("<unnamed>"));
            self.walk(&event.contents)?;
        }
        for file in &container.streamed_files {
            if !has_output_name(file) {
                continue;
            }
            let source = self.input_dir.join(file.source_file_name());
            self.emit(file, source, StorageKind::Streamed)?;
            self.stats.streamed += 1;
        }
        for file in &container.memory_files {
            // prefetched files are only the start of a streamed file, which is handled there
            if file.is_prefetch() {
                debug!("skipping prefetch {} ({})", file.short_name, file.id);
                continue;
            }
            if !has_output_name(file) {
                continue;
            }
            let source = self.scratch_dir.join(file.source_file_name());
            self.emit(file, source, StorageKind::Memory)?;
            self.stats.memory += 1;
        }
        Ok(())
    }

    fn emit(
        &mut self,
        file: &AudioFile,
        source: PathBuf,
        kind: StorageKind,
    ) -> Result<(), DirError> {
        let dest = output_path(self.bank_out_dir, &file.short_name);
        if let Some(parent) = dest.parent() {
            create_dir(parent)?;
        }
        info!("output: {}", file.short_name);
        let request = ConversionRequest { source, dest, kind };
        if !self.sink.convert(&request) {
            self.stats.failed_outputs += 1;
        }
        Ok(())
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    pub fn into_stats(self) -> WalkStats {
        self.stats
    }
}
