use crate::MkTorrentError;
use conv::ValueFrom;
use log::{debug, warn};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// names of files that some platforms drop into directories on their own
const HOUSEKEEPING_FILES: [&str; 2] = ["Thumbs.db", "desktop.ini"];

pub(crate) fn u64_to_usize(src: u64) -> Result<usize, MkTorrentError> {
    usize::value_from(src).map_err(|_| {
        MkTorrentError::FailedNumericConv(Cow::Owned(format!("[{}] does not fit into usize.", src)))
    })
}

pub(crate) fn usize_to_u64(src: usize) -> Result<u64, MkTorrentError> {
    u64::value_from(src).map_err(|_| {
        MkTorrentError::FailedNumericConv(Cow::Owned(format!("[{}] does not fit into u64.", src)))
    })
}

// raw bytes of a path component
//
// on non-unix platforms the component has to be valid unicode
pub(crate) fn os_str_to_bytes(src: &OsStr) -> Result<Vec<u8>, MkTorrentError> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Ok(src.as_bytes().to_vec())
    }

    #[cfg(not(unix))]
    {
        match src.to_str() {
            Some(s) => Ok(s.as_bytes().to_vec()),
            None => Err(MkTorrentError::TorrentBuilderFailure(Cow::Owned(format!(
                "path component [{:?}] is not valid unicode.",
                src
            )))),
        }
    }
}

pub(crate) fn last_component<P>(path: P) -> Result<Vec<u8>, MkTorrentError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match path.file_name() {
        Some(s) => os_str_to_bytes(s),
        None => Err(MkTorrentError::TorrentBuilderFailure(Cow::Owned(format!(
            "[{}] has no last component.",
            path.display()
        )))),
    }
}

// hidden entries (.DS_Store, .git, ...) and well-known housekeeping
// files are never shared
pub(crate) fn is_housekeeping(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.')
        || HOUSEKEEPING_FILES
            .iter()
            .any(|f| f.eq_ignore_ascii_case(&name))
}

// this method is recursive, i.e. entries in subdirectories
// are also returned
//
// housekeeping entries and symlinked directories are ignored,
// symlinked files are followed
//
// returned vec is sorted by path
pub(crate) fn list_dir<P>(path: P) -> Result<Vec<(PathBuf, u64)>, MkTorrentError>
where
    P: AsRef<Path>,
{
    let mut entries = Vec::new();
    walk_dir(path.as_ref(), &mut entries)?;
    entries.sort_by(|(p1, _), (p2, _)| p1.cmp(p2));
    Ok(entries)
}

fn walk_dir(path: &Path, entries: &mut Vec<(PathBuf, u64)>) -> Result<(), MkTorrentError> {
    for entry in path.read_dir()? {
        let entry = entry?;
        let path = entry.path();

        if is_housekeeping(&entry.file_name()) {
            debug!("skipping housekeeping entry [{}]", path.display());
            continue;
        }

        let is_symlink = entry.file_type()?.is_symlink();
        let metadata = path.metadata()?;

        if metadata.is_dir() {
            if is_symlink {
                warn!("skipping symlinked directory [{}]", path.display());
            } else {
                walk_dir(&path, entries)?;
            }
        } else if metadata.is_file() {
            entries.push((path, metadata.len()));
        } else {
            debug!("skipping special file [{}]", path.display());
        }
    }

    Ok(())
}

// Write to `path` through a temporary sibling file that is renamed into
// place once `write` succeeds. A failed write leaves no file behind.
pub(crate) fn write_atomically<P, F>(path: P, write: F) -> Result<(), MkTorrentError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<&fs::File>) -> Result<(), MkTorrentError>,
{
    let path = path.as_ref();
    let file_name = path.file_name().ok_or_else(|| {
        MkTorrentError::TorrentBuilderFailure(Cow::Owned(format!(
            "[{}] is not a valid output file path.",
            path.display()
        )))
    })?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    let tmp_path = path.with_file_name(tmp_name);

    let result = (|| -> Result<(), MkTorrentError> {
        let file = fs::File::create(&tmp_path)?;
        {
            let mut writer = BufWriter::new(&file);
            write(&mut writer)?;
            writer.flush()?;
        }
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        // the temporary file may or may not exist at this point
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

#[cfg(test)]
pub(crate) mod test_util {
    use rand::Rng;
    use std::fs;
    use std::path::{Path, PathBuf};

    // a fresh, empty scratch directory under the system temp dir
    pub(crate) fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mktorrent-unit-{}",
            rand::thread_rng().gen::<u64>()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub(crate) fn write_file<P>(root: P, relative: &str, content: &[u8]) -> PathBuf
    where
        P: AsRef<Path>,
    {
        let path = root.as_ref().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}
