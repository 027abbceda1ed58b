use std::path::PathBuf;

use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use env_logger::Env;
use log::info;
use soundbank::{
    dirs::{overlapping, remove_dir, reset_dir, resolve_dir},
    tools::{resolve_tool, ToolConverter, ToolUnpacker, DEFAULT_CONVERTER, DEFAULT_UNPACKER},
    ExtractConfig, Extractor,
};

#[derive(Parser)]
#[command(version)]
/// Extracts and decodes all audio of the Wwise soundbanks in a directory
pub struct Args {
    #[arg(value_parser = existing_dir)]
    /// Directory with the SoundbanksInfo json files, streamed wem files and bnk files
    input_dir: PathBuf,
    #[arg(short, long, default_value = "out")]
    /// Output directory, gets one subdirectory per bank
    output: PathBuf,
    #[arg(short, long, default_value = "tmp")]
    /// Scratch directory for unpacked bank contents
    scratch: PathBuf,
    #[arg(long, default_value = DEFAULT_CONVERTER)]
    /// Converter executable, called as `<converter> -o <output> <input>`
    converter: PathBuf,
    #[arg(long, default_value = DEFAULT_UNPACKER)]
    /// Bank unpacker executable, called as `<unpacker> <bank>` inside the scratch directory
    unpacker: PathBuf,
    #[arg(long)]
    /// Keep the existing output directory, banks already in there are skipped
    no_clean: bool,
}

fn existing_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !path.is_dir() {
        return Err(format!("{s} is not a directory"));
    }
    // the unpacker runs in the scratch directory, so this has to work from anywhere
    path.canonicalize().map_err(|e| e.to_string())
}

/// Resolves the output and scratch directories.
///
/// Both get wiped, so neither may overlap the input or the other one.
fn work_dirs(args: &Args) -> Result<(PathBuf, PathBuf), String> {
    let output = resolve_dir(&args.output)
        .map_err(|e| format!("invalid output directory {:?}: {e}", args.output))?;
    let scratch = resolve_dir(&args.scratch)
        .map_err(|e| format!("invalid scratch directory {:?}: {e}", args.scratch))?;
    for (kind, dir) in [("output", &output), ("scratch", &scratch)] {
        if overlapping(dir, &args.input_dir) {
            return Err(format!(
                "the {kind} directory {dir:?} overlaps the input directory {:?}",
                args.input_dir
            ));
        }
    }
    if overlapping(&output, &scratch) {
        return Err("the output and scratch directories must be separate".into());
    }
    Ok((output, scratch))
}

fn main() -> anyhow::Result<()> {
    let env = Env::new().default_filter_or("info");
    env_logger::init_from_env(env);
    let args = Args::parse();
    let (output, scratch) = match work_dirs(&args) {
        Ok(dirs) => dirs,
        Err(msg) => Args::command()
            .error(ErrorKind::ArgumentConflict, msg)
            .exit(),
    };

    if !args.no_clean {
        reset_dir(&output).context("error cleaning output directory")?;
    }
    remove_dir(&scratch).context("error cleaning scratch directory")?;

    let mut converter = ToolConverter::new(resolve_tool(&args.converter));
    let mut unpacker = ToolUnpacker::new(resolve_tool(&args.unpacker));
    let config = ExtractConfig {
        input_dir: args.input_dir,
        output_dir: output,
        scratch_dir: scratch,
    };
    info!("extracting {:?} to {:?}", config.input_dir, config.output_dir);
    let summary = Extractor::new(&config, &mut converter, &mut unpacker)
        .run()
        .context("extraction failed")?;
    println!("{summary}");
    Ok(())
}
