use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirError {
    #[error("Cannot create directory {0:?} because a file with the same name exists")]
    FileInTheWay(PathBuf),
    #[error("Error creating directory {path:?}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error removing {path:?}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// creates the directory and all its parents if they don't exist yet
pub fn create_dir(path: &Path) -> Result<(), DirError> {
    if path.is_dir() {
        return Ok(());
    }
    // some ancestor (or the path itself) might be a file
    if let Some(file) = path.ancestors().find(|p| p.is_file()) {
        return Err(DirError::FileInTheWay(file.to_owned()));
    }
    fs::create_dir_all(path).map_err(|source| DirError::Create {
        path: path.to_owned(),
        source,
    })
}

/// removes the directory with everything in it, does nothing if it doesn't exist
pub fn remove_dir(path: &Path) -> Result<(), DirError> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(DirError::Remove {
            path: path.to_owned(),
            source: e,
        }),
        _ => Ok(()),
    }
}

/// makes sure the directory exists and is empty
pub fn reset_dir(path: &Path) -> Result<(), DirError> {
    if path.is_file() {
        return Err(DirError::FileInTheWay(path.to_owned()));
    }
    remove_dir(path)?;
    create_dir(path)
}

/// Absolute form of a directory that doesn't have to exist yet.
///
/// The longest existing part is canonicalized, the rest is appended as is.
pub fn resolve_dir(path: &Path) -> io::Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_owned()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut existing = path.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = existing.canonicalize()?;
    resolved.extend(missing.into_iter().rev());
    Ok(resolved)
}

/// true if one of the directories is the other or inside it, both have to be resolved
pub fn overlapping(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// Appends a name from the metadata to `base`.
///
/// Names can contain subdirectories, separated by either `/` or `\`.
/// Empty, `.` and `..` segments are dropped so the result always stays inside `base`.
pub fn output_path(base: &Path, name: &str) -> PathBuf {
    let mut tmp = base.to_owned();
    tmp.extend(name_segments(name));
    tmp
}

/// true if the name has at least one usable path segment
pub fn is_valid_name(name: &str) -> bool {
    name_segments(name).next().is_some()
}

fn name_segments(name: &str) -> impl Iterator<Item = &str> {
    name.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
}

#[cfg(test)]
mod test {
    use std::{fs, path::Path};

    use super::{
        create_dir, is_valid_name, output_path, overlapping, reset_dir, resolve_dir, DirError,
    };

    #[test]
    pub fn output_path_splits_both_separators() {
        let base = Path::new("out/Music");
        assert_eq!(
            output_path(base, "foo/bar.wav"),
            Path::new("out/Music/foo/bar.wav")
        );
        assert_eq!(
            output_path(base, "Theme\\Loops\\a.wav"),
            Path::new("out/Music/Theme/Loops/a.wav")
        );
        assert_eq!(output_path(base, "plain.wav"), Path::new("out/Music/plain.wav"));
    }

    #[test]
    pub fn output_path_stays_inside_base() {
        let base = Path::new("out/Music");
        assert_eq!(
            output_path(base, "../../etc/./x.wav"),
            Path::new("out/Music/etc/x.wav")
        );
        assert_eq!(output_path(base, "/abs.wav"), Path::new("out/Music/abs.wav"));
        assert!(!is_valid_name("../."));
        assert!(!is_valid_name(""));
        assert!(is_valid_name("Music"));
    }

    #[test]
    pub fn create_dir_reports_file_in_the_way() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        fs::write(&file, b"").unwrap();

        assert!(matches!(create_dir(&file), Err(DirError::FileInTheWay(p)) if p == file));
        let nested = file.join("sub");
        assert!(matches!(create_dir(&nested), Err(DirError::FileInTheWay(p)) if p == file));

        let fine = tmp.path().join("a").join("b");
        create_dir(&fine).unwrap();
        assert!(fine.is_dir());
        // existing directories are fine too
        create_dir(&fine).unwrap();
    }

    #[test]
    pub fn reset_dir_empties() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = tmp.path().join("scratch");
        create_dir(&scratch.join("nested")).unwrap();
        fs::write(scratch.join("1.wem"), b"data").unwrap();

        reset_dir(&scratch).unwrap();
        assert!(scratch.is_dir());
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[test]
    pub fn resolve_missing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().canonicalize().unwrap();
        assert_eq!(resolve_dir(tmp.path()).unwrap(), base);
        assert_eq!(
            resolve_dir(&tmp.path().join("./out/tmp")).unwrap(),
            base.join("out").join("tmp")
        );
        assert!(!base.join("out").exists());
        assert!(resolve_dir(Path::new("relative")).unwrap().is_absolute());
    }

    #[test]
    pub fn overlapping_dirs() {
        let game = Path::new("/data/game");
        assert!(overlapping(game, game));
        assert!(overlapping(Path::new("/data"), game));
        assert!(overlapping(&game.join("out"), game));
        assert!(!overlapping(Path::new("/data/out"), game));
        // components, not text
        assert!(!overlapping(Path::new("/data/game2"), game));
    }
}
