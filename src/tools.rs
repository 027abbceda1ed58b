//! External programs doing the actual unpacking and decoding.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, warn};

use crate::{
    walker::{ConversionRequest, ConversionSink},
    wav::{check_output, OutputCheck},
};

pub const DEFAULT_CONVERTER: &str = "vgmstream-cli";
pub const DEFAULT_UNPACKER: &str = "bnkextr";

/// Finds the executable for a tool.
///
/// An existing path is made absolute, otherwise the name is looked up in `PATH`.
/// Returns `None` if neither works.
pub fn find_tool(name_or_path: &Path) -> Option<PathBuf> {
    if name_or_path.is_file() {
        // the unpacker doesn't run in the current directory
        return name_or_path.canonicalize().ok();
    }
    which::which(name_or_path).ok()
}

/// like [`find_tool`], but falls back to the given name with a warning
pub fn resolve_tool(name_or_path: &Path) -> PathBuf {
    find_tool(name_or_path).unwrap_or_else(|| {
        warn!("{name_or_path:?} not found, every invocation of it will fail");
        name_or_path.to_owned()
    })
}

fn run(tool: &mut Command) {
    let program = tool.get_program().to_owned();
    match tool.status() {
        Ok(status) if status.success() => {}
        Ok(status) => debug!("{program:?} exited with {status}"),
        Err(e) => warn!("could not run {program:?}: {e}"),
    }
}

/// Extracts the memory files of a bank into a directory.
pub trait Unpacker {
    /// `dest_dir` is empty and has to contain a `<id>.wem` for each memory file afterwards
    fn unpack(&mut self, payload: &Path, dest_dir: &Path);
}

/// Runs `<program> <payload>` inside the destination directory, like bnkextr expects.
#[derive(Debug, Clone)]
pub struct ToolUnpacker {
    program: PathBuf,
}

impl ToolUnpacker {
    pub fn new(program: PathBuf) -> Self {
        ToolUnpacker { program }
    }
}

impl Unpacker for ToolUnpacker {
    fn unpack(&mut self, payload: &Path, dest_dir: &Path) {
        // relative paths would be resolved against dest_dir
        let payload = match payload.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                warn!("bank payload {payload:?} can't be used: {e}");
                payload.to_owned()
            }
        };
        run(Command::new(&self.program).arg(&payload).current_dir(dest_dir));
    }
}

/// Runs `<program> -o <dest> <source>` for every request, like vgmstream-cli expects.
///
/// The exit status is ignored, the written file is checked instead.
#[derive(Debug, Clone)]
pub struct ToolConverter {
    program: PathBuf,
}

impl ToolConverter {
    pub fn new(program: PathBuf) -> Self {
        ToolConverter { program }
    }
}

impl ConversionSink for ToolConverter {
    fn convert(&mut self, request: &ConversionRequest) -> bool {
        if !request.source.is_file() {
            warn!("source {:?} doesn't exist", request.source);
        }
        run(Command::new(&self.program)
            .arg("-o")
            .arg(&request.dest)
            .arg(&request.source));
        match check_output(&request.dest) {
            OutputCheck::Wav(format) => {
                debug!(
                    "wrote {:?}: {} channels, {} Hz",
                    request.dest, format.channels, format.sample_rate
                );
                true
            }
            OutputCheck::Missing => {
                warn!("no output written to {:?}", request.dest);
                false
            }
            OutputCheck::Invalid(e) => {
                warn!("output {:?} is not a wav file: {e}", request.dest);
                false
            }
        }
    }
}
