use super::*;

/// Caller-supplied fields of a torrent, i.e. everything that is not
/// derived from the files themselves.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Metadata {
    pub announce: String,
    pub announce_list: Option<AnnounceList>,
    /// Overrides the manifest's name if set.
    pub name: Option<Vec<u8>>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub creation_date: Option<u64>,
    pub private: bool,
}

/// Put together a `Torrent` from a manifest, its piece hashes, and `metadata`.
///
/// The single-file layout is used only when the manifest's root is a file.
/// A directory holding a single file still gets a `files` list.
///
/// No validation is done here: `pieces` is expected to come from
/// [`PieceHasher`](struct.PieceHasher.html) run over the same manifest
/// with the same `piece_length`.
pub fn assemble(
    manifest: Manifest,
    pieces: Vec<Piece>,
    piece_length: u64,
    metadata: Metadata,
) -> Torrent {
    let length = manifest.total_length();
    let is_single_file = !manifest.is_directory
        && manifest.entries.len() == 1
        && manifest.entries[0].segments.len() == 1;

    let files = if is_single_file {
        None
    } else {
        Some(
            manifest
                .entries
                .into_iter()
                .map(|entry| File {
                    length: entry.length,
                    path: entry.segments,
                })
                .collect(),
        )
    };

    Torrent {
        announce: metadata.announce,
        announce_list: metadata.announce_list,
        comment: metadata.comment,
        created_by: metadata.created_by,
        creation_date: metadata.creation_date,
        length,
        files,
        name: metadata.name.unwrap_or(manifest.name),
        piece_length,
        pieces,
        private: metadata.private,
    }
}
