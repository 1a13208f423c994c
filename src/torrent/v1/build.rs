use super::*;
use log::info;
use std::borrow::Cow;
use std::path::Path;

impl TorrentBuilder {
    /// Create a new `TorrentBuilder` with required fields set.
    ///
    /// The caller has to ensure that the inputs are valid, as this method
    /// does not validate its inputs. If they turn out
    /// to be invalid, calling [`build()`] later will fail.
    ///
    /// # Notes
    /// - A valid `piece_length` is a power of `2` between
    ///   [`MIN_PIECE_LENGTH`] and [`MAX_PIECE_LENGTH`].
    ///
    /// [`build()`]: #method.build
    /// [`MIN_PIECE_LENGTH`]: constant.MIN_PIECE_LENGTH.html
    /// [`MAX_PIECE_LENGTH`]: constant.MAX_PIECE_LENGTH.html
    pub fn new<S, P>(announce: S, path: P, piece_length: u64) -> TorrentBuilder
    where
        S: Into<String>,
        P: AsRef<Path>,
    {
        TorrentBuilder {
            announce: announce.into(),
            path: path.as_ref().to_path_buf(),
            piece_length,
            num_threads: DEFAULT_NUM_THREADS,
            ..Default::default()
        }
    }

    /// Build a `Torrent` from this `TorrentBuilder`.
    ///
    /// If `name` is not set, then the [last component] of `path`
    /// will be used as the `Torrent`'s `name` field.
    ///
    /// All settings are validated before any file is read. `build()` does
    /// not provide comprehensive validation though: an empty `announce`
    /// is detected, but an announce url that does not parse is not.
    ///
    /// Fails if `path` holds no data to share (e.g. an empty directory).
    ///
    /// [last component]: https://doc.rust-lang.org/std/path/struct.Path.html#method.file_name
    pub fn build(self) -> Result<Torrent, MkTorrentError> {
        // delegate validation to other methods
        self.validate_announce()?;
        self.validate_announce_list()?;
        self.validate_name()?;
        self.validate_optional_strings()?;
        self.validate_path()?;
        self.validate_piece_length()?;

        let manifest = Manifest::build(&self.path)?;
        if manifest.total_length() == 0 {
            return Err(MkTorrentError::TorrentBuilderFailure(Cow::Owned(format!(
                "[{}] contains no data.",
                self.path.display()
            ))));
        }

        let pieces = PieceHasher::new(self.piece_length)
            .set_num_threads(self.num_threads)
            .hash_pieces(&manifest)?;

        let torrent = assemble(
            manifest,
            pieces,
            self.piece_length,
            Metadata {
                announce: self.announce,
                announce_list: self.announce_list,
                name: self.name.map(String::into_bytes),
                comment: self.comment,
                created_by: self.created_by,
                creation_date: self.creation_date,
                private: self.is_private,
            },
        );
        info!(
            "built torrent [{}] with {} piece(s)",
            String::from_utf8_lossy(&torrent.name),
            torrent.pieces.len()
        );
        Ok(torrent)
    }

    /// Set the `announce` field of the `Torrent` to be built.
    ///
    /// Calling this method multiple times will simply override previous settings.
    pub fn set_announce(self, announce: String) -> TorrentBuilder {
        TorrentBuilder { announce, ..self }
    }

    /// Set the `announce_list` field of the `Torrent` to be built.
    ///
    /// Calling this method multiple times will simply override previous settings.
    ///
    /// If `announce_list` turns out to be invalid (e.g. it has an empty tier),
    /// calling [`build()`] later will fail.
    ///
    /// [`build()`]: #method.build
    pub fn set_announce_list(self, announce_list: AnnounceList) -> TorrentBuilder {
        TorrentBuilder {
            announce_list: Some(announce_list),
            ..self
        }
    }

    /// Set the `name` field of the `Torrent` to be built.
    ///
    /// Calling this method multiple times will simply override previous settings.
    pub fn set_name(self, name: String) -> TorrentBuilder {
        TorrentBuilder {
            name: Some(name),
            ..self
        }
    }

    /// Set the path to the file(s) from which the `Torrent` will be built.
    ///
    /// Calling this method multiple times will simply override previous settings.
    pub fn set_path<P>(self, path: P) -> TorrentBuilder
    where
        P: AsRef<Path>,
    {
        TorrentBuilder {
            path: path.as_ref().to_path_buf(),
            ..self
        }
    }

    /// Set the `piece_length` field of the `Torrent` to be built.
    ///
    /// Calling this method multiple times will simply override previous settings.
    ///
    /// NOTE: **A valid `piece_length` is a power of `2` between
    /// [`MIN_PIECE_LENGTH`] and [`MAX_PIECE_LENGTH`].**
    ///
    /// [`MIN_PIECE_LENGTH`]: constant.MIN_PIECE_LENGTH.html
    /// [`MAX_PIECE_LENGTH`]: constant.MAX_PIECE_LENGTH.html
    pub fn set_piece_length(self, piece_length: u64) -> TorrentBuilder {
        TorrentBuilder {
            piece_length,
            ..self
        }
    }

    /// Set the `comment` field of the `Torrent` to be built.
    pub fn set_comment(self, comment: String) -> TorrentBuilder {
        TorrentBuilder {
            comment: Some(comment),
            ..self
        }
    }

    /// Set the `created by` field of the `Torrent` to be built.
    pub fn set_created_by(self, created_by: String) -> TorrentBuilder {
        TorrentBuilder {
            created_by: Some(created_by),
            ..self
        }
    }

    /// Set the `creation date` field (seconds since the Unix epoch)
    /// of the `Torrent` to be built.
    pub fn set_creation_date(self, creation_date: u64) -> TorrentBuilder {
        TorrentBuilder {
            creation_date: Some(creation_date),
            ..self
        }
    }

    /// Make the `Torrent` private or public, as defined in [BEP 27].
    ///
    /// Calling this method multiple times will simply override previous settings.
    ///
    /// [BEP 27]: http://bittorrent.org/beps/bep_0027.html
    pub fn set_privacy(self, is_private: bool) -> TorrentBuilder {
        TorrentBuilder { is_private, ..self }
    }

    /// Change the number of threads used when hashing pieces.
    ///
    /// Defaults to [`DEFAULT_NUM_THREADS`]. If set to 0, the number of
    /// threads used will be equal to the number of physical cores.
    ///
    /// [`DEFAULT_NUM_THREADS`]: constant.DEFAULT_NUM_THREADS.html
    pub fn set_num_threads(self, num_threads: usize) -> TorrentBuilder {
        TorrentBuilder {
            num_threads,
            ..self
        }
    }

    fn validate_announce(&self) -> Result<(), MkTorrentError> {
        if self.announce.is_empty() {
            Err(MkTorrentError::TorrentBuilderFailure(Cow::Borrowed(
                "TorrentBuilder has `announce` but its length is 0.",
            )))
        } else {
            Ok(())
        }
    }

    fn validate_announce_list(&self) -> Result<(), MkTorrentError> {
        if let Some(ref announce_list) = self.announce_list {
            if announce_list.is_empty() {
                return Err(MkTorrentError::TorrentBuilderFailure(Cow::Borrowed(
                    "TorrentBuilder has `announce_list` but it's empty.",
                )));
            }

            for tier in announce_list {
                if tier.is_empty() {
                    return Err(MkTorrentError::TorrentBuilderFailure(Cow::Borrowed(
                        "TorrentBuilder has `announce_list` but \
                         one of its tiers is empty.",
                    )));
                } else if tier.iter().any(|url| url.is_empty()) {
                    return Err(MkTorrentError::TorrentBuilderFailure(Cow::Borrowed(
                        "TorrentBuilder has `announce_list` but \
                         one of its tiers contains a 0-length url.",
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_name(&self) -> Result<(), MkTorrentError> {
        match self.name {
            Some(ref name) if name.is_empty() => Err(MkTorrentError::TorrentBuilderFailure(
                Cow::Borrowed("TorrentBuilder has `name` but its length is 0."),
            )),
            _ => Ok(()),
        }
    }

    fn validate_optional_strings(&self) -> Result<(), MkTorrentError> {
        if self.comment.as_ref().map_or(false, String::is_empty) {
            Err(MkTorrentError::TorrentBuilderFailure(Cow::Borrowed(
                "TorrentBuilder has `comment` but its length is 0.",
            )))
        } else if self.created_by.as_ref().map_or(false, String::is_empty) {
            Err(MkTorrentError::TorrentBuilderFailure(Cow::Borrowed(
                "TorrentBuilder has `created_by` but its length is 0.",
            )))
        } else {
            Ok(())
        }
    }

    fn validate_path(&self) -> Result<(), MkTorrentError> {
        if self.path.exists() {
            Ok(())
        } else {
            Err(MkTorrentError::TorrentBuilderFailure(Cow::Owned(format!(
                "TorrentBuilder has `path` [{}] but it does not point to anything.",
                self.path.display()
            ))))
        }
    }

    fn validate_piece_length(&self) -> Result<(), MkTorrentError> {
        if !self.piece_length.is_power_of_two() {
            Err(MkTorrentError::TorrentBuilderFailure(Cow::Owned(format!(
                "TorrentBuilder has `piece_length` {} that is not a power of 2.",
                self.piece_length
            ))))
        } else if self.piece_length < MIN_PIECE_LENGTH || self.piece_length > MAX_PIECE_LENGTH {
            Err(MkTorrentError::TorrentBuilderFailure(Cow::Owned(format!(
                "TorrentBuilder has `piece_length` {} outside of [{}, {}].",
                self.piece_length, MIN_PIECE_LENGTH, MAX_PIECE_LENGTH
            ))))
        } else {
            Ok(())
        }
    }
}
