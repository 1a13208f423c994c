use super::*;
use crate::util;
use log::{debug, info};
use std::borrow::Cow;
use std::path::{Component, Path};

/// A file to be shared, as found under the manifest's root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileEntry {
    /// Where the file can be opened.
    pub path: PathBuf,
    /// Path segments relative to the root. For a single-file root this is
    /// the file's own name.
    pub segments: Vec<Vec<u8>>,
    /// File size in bytes at the time the manifest was built.
    pub length: u64,
}

/// The ordered list of files whose concatenated content is split into pieces.
///
/// The order of `entries` decides which bytes end up in which piece, so it is
/// deterministic: entries are sorted by their relative path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Manifest {
    /// Canonicalized root path. Symlinks are resolved.
    pub root: PathBuf,
    /// Last component of the root path as given, not of its canonical form.
    pub name: Vec<u8>,
    pub is_directory: bool,
    pub entries: Vec<FileEntry>,
}

impl Manifest {
    /// Build a manifest from `root`, which can be a file or a directory.
    ///
    /// A directory is walked recursively. Hidden entries and platform
    /// housekeeping files are skipped. Fails if `root` can not be accessed
    /// or if a directory holds no files at all.
    pub fn build<P>(root: P) -> Result<Manifest, MkTorrentError>
    where
        P: AsRef<Path>,
    {
        let given = root.as_ref();
        let root = given.canonicalize()?;
        // the name is the one the caller used, e.g. a symlink's own name.
        // paths like `.` have no last component until canonicalized
        let name = match given.file_name() {
            Some(_) => util::last_component(given)?,
            None => util::last_component(&root)?,
        };

        let manifest = if root.metadata()?.is_dir() {
            let entries = util::list_dir(&root)?
                .into_iter()
                .map(|(path, length)| {
                    let segments = relative_segments(&root, &path)?;
                    Ok(FileEntry {
                        path,
                        segments,
                        length,
                    })
                })
                .collect::<Result<Vec<_>, MkTorrentError>>()?;

            if entries.is_empty() {
                return Err(MkTorrentError::TorrentBuilderFailure(Cow::Owned(format!(
                    "[{}] contains no files.",
                    root.display()
                ))));
            }

            Manifest {
                root,
                name,
                is_directory: true,
                entries,
            }
        } else {
            let length = root.metadata()?.len();
            Manifest {
                entries: vec![FileEntry {
                    path: root.clone(),
                    segments: vec![name.clone()],
                    length,
                }],
                root,
                name,
                is_directory: false,
            }
        };

        for entry in &manifest.entries {
            debug!(
                "manifest entry [{}], {} bytes",
                entry.path.display(),
                entry.length
            );
        }
        info!(
            "found {} file(s), {} bytes in total, under [{}]",
            manifest.entries.len(),
            manifest.total_length(),
            manifest.root.display()
        );

        Ok(manifest)
    }

    /// Sum of all entries' lengths.
    pub fn total_length(&self) -> u64 {
        self.entries.iter().map(|entry| entry.length).sum()
    }

    /// Number of pieces of `piece_length` bytes the content is split into.
    /// The last piece may be shorter. Empty content has no pieces.
    pub fn piece_count(&self, piece_length: u64) -> u64 {
        let total_length = self.total_length();
        if total_length == 0 {
            0
        } else {
            (total_length - 1) / piece_length + 1
        }
    }
}

fn relative_segments(root: &Path, path: &Path) -> Result<Vec<Vec<u8>>, MkTorrentError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        MkTorrentError::TorrentBuilderFailure(Cow::Owned(format!(
            "[{}] is not under [{}].",
            path.display(),
            root.display()
        )))
    })?;

    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(s) => Some(util::os_str_to_bytes(s)),
            _ => None,
        })
        .collect()
}
