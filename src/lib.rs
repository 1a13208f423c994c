//! [`mktorrent`] is a library for creating *.torrent* files from a file or a directory.
//! It is dual-licensed under [Apache 2.0] and [MIT].
//!
//! # *Quick Start*
//! Create a torrent ([v1]) from files in a directory and save the *.torrent* file.
//!
//! ```no_run
//! use mktorrent::torrent::v1::TorrentBuilder;
//!
//! let torrent = TorrentBuilder::new("udp://tracker.example.org:6969/announce", "dir/", 1048576)
//!     .set_comment("sample".to_owned())
//!     .build()
//!     .unwrap();
//! println!("Info hash: {}", torrent.info_hash());
//! torrent.write_into_file("sample.torrent").unwrap();
//! ```
//!
//! # *Overview*
//! Creating a torrent is a pipeline of three stages:
//! - a [`Manifest`] is built from the root path. Its file order is the order in
//!   which bytes are fed to the hasher, so it is sorted and stable across runs.
//! - the [`PieceHasher`] reads every file of the manifest in order, treating them as
//!   one byte stream, and cuts that stream into pieces of `piece length` bytes. Pieces
//!   may span several files. Each piece is hashed by a pool of worker threads and the
//!   hashes are reassembled in piece order.
//! - the manifest, the pieces, and the caller's metadata are assembled into a
//!   [`Torrent`], which is encoded with the canonical bencode writer ([`BencodeElem`]).
//!
//! [`TorrentBuilder`] drives all three stages.
//!
//! # *Correctness*
//! Bencode output is canonical: dictionary keys are always sorted by their raw bytes,
//! integers have no leading zeros, and byte strings are length-prefixed raw bytes.
//! Encoding the same torrent twice always yields identical bytes, which matters because
//! the encoded `info` dictionary is what the info hash is computed over.
//!
//! # *Implemented BEPs*
//! NOTE: Only the encoding/creation aspects are implemented.
//! - [BEP 3]
//! - [BEP 9] \(magnet links only)
//! - [BEP 12]
//! - [BEP 27]
//!
//! [`mktorrent`]: index.html
//! [Apache 2.0]: https://www.apache.org/licenses/LICENSE-2.0
//! [MIT]: https://opensource.org/licenses/MIT
//! [v1]: http://bittorrent.org/beps/bep_0003.html
//! [`Manifest`]: torrent/v1/struct.Manifest.html
//! [`PieceHasher`]: torrent/v1/struct.PieceHasher.html
//! [`Torrent`]: torrent/v1/struct.Torrent.html
//! [`TorrentBuilder`]: torrent/v1/struct.TorrentBuilder.html
//! [`BencodeElem`]: bencode/enum.BencodeElem.html
//! [BEP 3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP 9]: http://bittorrent.org/beps/bep_0009.html
//! [BEP 12]: http://bittorrent.org/beps/bep_0012.html
//! [BEP 27]: http://bittorrent.org/beps/bep_0027.html

use std::borrow::Cow;
use std::path::PathBuf;
use thiserror::Error;

pub(crate) mod util;
#[macro_use]
pub mod bencode;
pub mod torrent;

/// Custom error.
#[derive(Debug, Error)]
pub enum MkTorrentError {
    /// `TorrentBuilder` was given an invalid setting (e.g. a piece length that is
    /// not a power of 2, or an empty announce url), or the input path holds nothing
    /// to share. Always reported before any piece is hashed.
    #[error("failed to build torrent: {0}")]
    TorrentBuilderFailure(Cow<'static, str>),

    /// IO error occurred while accessing the input path or writing the output.
    #[error("IO error occurred: {0}")]
    Io(#[from] std::io::Error),

    /// A file could not be read while its pieces were being hashed.
    /// `offset` is the position within the file at which reading failed.
    #[error("failed to read [{}] at offset {offset}: {source}", .path.display())]
    Read {
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// A hashing worker failed, or the hashed pieces could not be reassembled.
    #[error("failed to hash pieces: {0}")]
    Hashing(Cow<'static, str>),

    /// Conversion between numeric types (e.g. `u64 -> usize`) has failed.
    #[error("numeric conversion failed: {0}")]
    FailedNumericConv(Cow<'static, str>),
}
