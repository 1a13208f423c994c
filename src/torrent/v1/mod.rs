//! Module for `.torrent` files ([v1](http://bittorrent.org/beps/bep_0003.html))
//! related creation/encoding.

use crate::MkTorrentError;
use itertools::Itertools;
use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
use sha1::{Digest, Sha1};
use std::fmt;
use std::path::PathBuf;

mod assemble;
mod build;
mod hash;
mod manifest;
mod write;

pub use self::assemble::{assemble, Metadata};
pub use self::hash::{
    sha1_piece, PieceHasher, DEFAULT_NUM_THREADS, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_READ_BUFFER_SIZE,
};
pub use self::manifest::{FileEntry, Manifest};

/// Length of a SHA1 piece hash in bytes.
pub const PIECE_STRING_LENGTH: usize = 20;
/// Smallest piece length accepted by [`TorrentBuilder`](struct.TorrentBuilder.html) (32 KiB).
pub const MIN_PIECE_LENGTH: u64 = 32 * 1024;
/// Largest piece length accepted by [`TorrentBuilder`](struct.TorrentBuilder.html) (16 MiB).
pub const MAX_PIECE_LENGTH: u64 = 16 * 1024 * 1024;

/// Corresponds to the `announce-list` in [BEP 12](http://bittorrent.org/beps/bep_0012.html).
pub type AnnounceList = Vec<Vec<String>>;
/// A piece in `pieces`--the hash of a torrent block.
pub type Piece = Vec<u8>;

/// A file contained in a multi-file torrent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct File {
    /// File size in bytes.
    pub length: u64,
    /// File path segments, relative to [`Torrent`](struct.Torrent.html)'s `name` field.
    /// Segments are raw bytes and need not be valid UTF-8.
    pub path: Vec<Vec<u8>>,
}

/// Everything that goes into a *.torrent* file.
///
/// Modeled after the specifications
/// in [BEP 3](http://bittorrent.org/beps/bep_0003.html),
/// [BEP 12](http://bittorrent.org/beps/bep_0012.html), and
/// [BEP 27](http://bittorrent.org/beps/bep_0027.html).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Torrent {
    /// URL of the torrent's tracker.
    pub announce: String,
    /// Announce list as defined in [BEP 12](http://bittorrent.org/beps/bep_0012.html).
    pub announce_list: Option<AnnounceList>,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Name and version of the program that created the torrent.
    pub created_by: Option<String>,
    /// Creation time in seconds since the Unix epoch.
    pub creation_date: Option<u64>,
    /// Total torrent size in bytes (i.e. sum of all files' sizes).
    pub length: u64,
    /// If the torrent uses the single-file layout then `files` is `None`.
    pub files: Option<Vec<File>>,
    /// If the torrent contains only 1 file then `name` is the file name.
    /// Otherwise it's the suggested root directory's name.
    pub name: Vec<u8>,
    /// Block size in bytes.
    pub piece_length: u64,
    /// Hashes of each block, in stream order.
    pub pieces: Vec<Piece>,
    /// Whether `private = 1` is set in `info`.
    pub private: bool,
}

/// Builder for creating `Torrent`s from files.
///
/// Required fields: `announce`, `path`, and `piece_length`.
/// They are set when calling the constructor [`new()`].
///
/// Optional fields can be set by calling the corresponding methods
/// (e.g. [`set_comment()`]). Fields can be updated in the same way.
///
/// # Notes
/// **Hidden files/dirs and platform housekeeping files
/// (e.g. `.DS_Store`, `Thumbs.db`) are ignored.**
///
/// [`new()`]: #method.new
/// [`set_comment()`]: #method.set_comment
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TorrentBuilder {
    announce: String,
    announce_list: Option<AnnounceList>,
    name: Option<String>,
    path: PathBuf,
    piece_length: u64,
    comment: Option<String>,
    created_by: Option<String>,
    creation_date: Option<u64>,
    is_private: bool,
    num_threads: usize,
}

impl Torrent {
    /// Calculate the `Torrent`'s info hash as defined in
    /// [BEP 3](http://bittorrent.org/beps/bep_0003.html).
    ///
    /// The hash is the lowercase hex SHA1 of the canonical encoding
    /// of the `info` dict. It is not cached.
    pub fn info_hash(&self) -> String {
        let hash = Sha1::digest(self.construct_info().encode());
        format!("{:02x}", hash.iter().format(""))
    }

    /// Calculate the `Torrent`'s magnet link as defined in
    /// [BEP 9](http://bittorrent.org/beps/bep_0009.html).
    ///
    /// The `dn` parameter is set to `self.name`.
    ///
    /// Either `self.announce` or all trackers in `self.announce_list` will be used,
    /// since clients that understand `announce-list` ignore `announce`.
    pub fn magnet_link(&self) -> String {
        let trackers = match self.announce_list {
            Some(ref list) => list.iter().flatten().collect::<Vec<_>>(),
            None => vec![&self.announce],
        };

        format!(
            "magnet:?xt=urn:btih:{}&dn={}{}",
            self.info_hash(),
            percent_encode(&self.name, NON_ALPHANUMERIC),
            trackers.iter().format_with("", |url, f| f(&format_args!(
                "&tr={}",
                percent_encode(url.as_bytes(), NON_ALPHANUMERIC)
            ))),
        )
    }

    /// Number of pieces.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{}\n\
             -size: {} bytes",
            self.path
                .iter()
                .format_with("/", |s, f| f(&String::from_utf8_lossy(s))),
            self.length
        )?;
        writeln!(f, "========================================")
    }
}

impl fmt::Display for Torrent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}.torrent", String::from_utf8_lossy(&self.name))?;
        writeln!(f, "-announce: {}", self.announce)?;
        if let Some(ref tiers) = self.announce_list {
            writeln!(
                f,
                "-announce-list: [{}]",
                tiers.iter().format_with(", ", |tier, f| {
                    f(&format_args!("[{}]", itertools::join(tier, ", ")))
                })
            )?;
        }
        if let Some(ref comment) = self.comment {
            writeln!(f, "-comment: {}", comment)?;
        }
        if let Some(ref created_by) = self.created_by {
            writeln!(f, "-created by: {}", created_by)?;
        }
        if let Some(creation_date) = self.creation_date {
            writeln!(f, "-creation date: {}", creation_date)?;
        }
        writeln!(f, "-size: {} bytes", self.length)?;
        writeln!(f, "-piece length: {} bytes", self.piece_length)?;
        writeln!(f, "-private: {}", self.private)?;

        if let Some(ref files) = self.files {
            writeln!(f, "-files:")?;
            for (counter, file) in files.iter().enumerate() {
                writeln!(f, "[{}] {}", counter + 1, file)?;
            }
        }

        writeln!(
            f,
            "-pieces: [{}]",
            self.pieces.iter().format_with(", ", |piece, f| {
                f(&format_args!("[{:02x}]", piece.iter().format("")))
            }),
        )
    }
}

#[cfg(test)]
mod torrent_tests {
    use super::*;

    fn sample() -> Torrent {
        Torrent {
            announce: "url".to_owned(),
            announce_list: None,
            comment: None,
            created_by: None,
            creation_date: None,
            length: 4,
            files: None,
            name: b"sample".to_vec(),
            piece_length: 2,
            pieces: vec![vec![1, 2], vec![3, 4]],
            private: false,
        }
    }

    #[test]
    fn info_hash_ok() {
        assert_eq!(
            sample().info_hash(),
            "074f42efaf8267f137f114f722d4e7d1dcbfbda5".to_owned(),
        );
    }

    #[test]
    fn info_hash_ignores_non_info_fields() {
        let torrent = Torrent {
            announce: "other".to_owned(),
            comment: Some("comment".to_owned()),
            creation_date: Some(1),
            ..sample()
        };

        assert_eq!(torrent.info_hash(), sample().info_hash());
    }

    #[test]
    fn magnet_link_ok() {
        assert_eq!(
            sample().magnet_link(),
            "magnet:?xt=urn:btih:074f42efaf8267f137f114f722d4e7d1dcbfbda5\
             &dn=sample&tr=url"
                .to_owned()
        );
    }

    #[test]
    fn magnet_link_with_announce_list() {
        let torrent = Torrent {
            announce_list: Some(vec![
                vec!["url1".to_owned()],
                vec!["url2".to_owned(), "url3".to_owned()],
            ]),
            ..sample()
        };

        assert_eq!(
            torrent.magnet_link(),
            "magnet:?xt=urn:btih:074f42efaf8267f137f114f722d4e7d1dcbfbda5\
             &dn=sample&tr=url1&tr=url2&tr=url3"
                .to_owned()
        );
    }

    #[test]
    fn magnet_link_percent_encodes() {
        let torrent = Torrent {
            announce: "udp://t.org:80".to_owned(),
            ..sample()
        };

        assert!(torrent
            .magnet_link()
            .ends_with("&dn=sample&tr=udp%3A%2F%2Ft%2Eorg%3A80"));
    }

    #[test]
    fn display_ok() {
        let torrent = Torrent {
            files: Some(vec![File {
                length: 4,
                path: vec![b"dir".to_vec(), b"file".to_vec()],
            }]),
            ..sample()
        };
        let shown = torrent.to_string();

        assert!(shown.starts_with("sample.torrent\n-announce: url\n"));
        assert!(shown.contains("[1] dir/file\n-size: 4 bytes\n"));
        assert!(shown.ends_with("-pieces: [[0102], [0304]]\n"));
    }
}
