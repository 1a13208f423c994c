use super::*;
use crate::bencode::{BencodeElem, Dictionary};
use crate::util;
use log::info;
use std::io::Write;
use std::path::Path;

impl File {
    fn to_bencode_elem(&self) -> BencodeElem {
        BencodeElem::dictionary(vec![
            ("length", BencodeElem::Integer(self.length)),
            (
                "path",
                BencodeElem::List(self.path.iter().cloned().map(BencodeElem::Bytes).collect()),
            ),
        ])
    }
}

impl Torrent {
    /// Construct the `info` dict based on the fields of `self`.
    ///
    /// The info hash is computed over the encoding of this dict. It is
    /// constructed each time this method is called (i.e. the return value
    /// is not cached).
    ///
    /// `length` is only present in the single-file layout, `files` only in
    /// the multi-file layout. `private` is only present if set.
    pub fn construct_info(&self) -> BencodeElem {
        let mut info = Dictionary::new();

        if let Some(ref files) = self.files {
            info.insert(
                b"files".to_vec(),
                BencodeElem::List(files.iter().map(File::to_bencode_elem).collect()),
            );
        } else {
            info.insert(b"length".to_vec(), BencodeElem::Integer(self.length));
        }

        info.insert(b"name".to_vec(), BencodeElem::Bytes(self.name.clone()));
        info.insert(
            b"piece length".to_vec(),
            BencodeElem::Integer(self.piece_length),
        );
        info.insert(b"pieces".to_vec(), BencodeElem::Bytes(self.pieces.concat()));

        if self.private {
            info.insert(b"private".to_vec(), BencodeElem::Integer(1));
        }

        BencodeElem::Dictionary(info)
    }

    /// Convert `self` into the top-level bencode dictionary of a *.torrent* file.
    pub fn to_bencode_elem(&self) -> BencodeElem {
        let mut result = Dictionary::new();

        result.insert(
            b"announce".to_vec(),
            BencodeElem::from(self.announce.as_str()),
        );

        if let Some(ref list) = self.announce_list {
            result.insert(
                b"announce-list".to_vec(),
                BencodeElem::List(
                    list.iter()
                        .map(|tier| {
                            BencodeElem::List(
                                tier.iter()
                                    .map(|url| BencodeElem::from(url.as_str()))
                                    .collect(),
                            )
                        })
                        .collect(),
                ),
            );
        }

        if let Some(ref comment) = self.comment {
            result.insert(b"comment".to_vec(), BencodeElem::from(comment.as_str()));
        }
        if let Some(ref created_by) = self.created_by {
            result.insert(
                b"created by".to_vec(),
                BencodeElem::from(created_by.as_str()),
            );
        }
        if let Some(creation_date) = self.creation_date {
            result.insert(
                b"creation date".to_vec(),
                BencodeElem::Integer(creation_date),
            );
        }

        result.insert(b"info".to_vec(), self.construct_info());

        BencodeElem::Dictionary(result)
    }

    /// Encode `self` as bencode and write the result to `dst`.
    pub fn write_into<W>(&self, dst: &mut W) -> Result<(), MkTorrentError>
    where
        W: Write,
    {
        self.to_bencode_elem().write_into(dst)
    }

    /// Encode `self` as bencode and write the result to `path`.
    ///
    /// `path` must be the path to a file. The encoding is written to a
    /// temporary file next to `path` which then replaces `path`, so
    /// a failure never leaves a partial *.torrent* file behind.
    pub fn write_into_file<P>(&self, path: P) -> Result<(), MkTorrentError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        util::write_atomically(path, |dst| self.write_into(dst))?;
        info!(
            "wrote [{}] ({} piece(s), info hash {})",
            path.display(),
            self.pieces.len(),
            self.info_hash()
        );
        Ok(())
    }

    /// Encode `self` as bencode and return the result in a `Vec`.
    pub fn encode(&self) -> Vec<u8> {
        self.to_bencode_elem().encode()
    }
}


#[cfg(test)]
mod torrent_write_tests {
    use super::*;
    use crate::util::test_util::*;
    use std::fs;

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
    fn construct_info_single_file() {
        assert_eq!(
            sample().construct_info(),
            bencode_elem!({
                ("length", 4_u64),
                ("name", "sample"),
                ("piece length", 2_u64),
                ("pieces", (1, 2, 3, 4)),
            }),
        );
    }

    #[test]
    fn construct_info_multi_file() {
        let torrent = Torrent {
            length: 6,
            files: Some(vec![
                File {
                    length: 3,
                    path: vec![b"a.txt".to_vec()],
                },
                File {
                    length: 3,
                    path: vec![b"sub".to_vec(), b"b.txt".to_vec()],
                },
            ]),
            name: b"dir".to_vec(),
            piece_length: 4,
            private: true,
            ..sample()
        };

        assert_eq!(
            torrent.construct_info().encode(),
            b"d5:filesld6:lengthi3e4:pathl5:a.txteed6:lengthi3e4:pathl3:sub5:b.txteee\
              4:name3:dir12:piece lengthi4e6:pieces4:\x01\x02\x03\x047:privatei1ee"
                .to_vec()
        );
        assert_eq!(
            torrent.info_hash(),
            "c5ed04ab8b43750f591d4d8dd05baa440b5f77fe".to_owned()
        );
    }

    #[test]
    fn write_ok() {
        let mut result = Vec::new();
        sample().write_into(&mut result).unwrap();

        assert_eq!(
            result,
            bencode_elem!({
                ("announce", "url"),
                ("info", {
                    ("length", 4_u64),
                    ("name", "sample"),
                    ("piece length", 2_u64),
                    ("pieces", (1, 2, 3, 4)),
                })
            })
            .encode()
        );
    }

    #[test]
    fn write_with_optional_fields() {
        let torrent = Torrent {
            announce_list: Some(vec![
                vec!["url1".to_owned(), "url2".to_owned()],
                vec!["url3".to_owned()],
            ]),
            comment: Some("no comment".to_owned()),
            created_by: Some("mktorrent".to_owned()),
            creation_date: Some(1523448537),
            ..sample()
        };

        assert_eq!(
            torrent.encode(),
            bencode_elem!({
                ("announce", "url"),
                ("announce-list", [["url1", "url2"], ["url3"]]),
                ("comment", "no comment"),
                ("created by", "mktorrent"),
                ("creation date", 1523448537_u64),
                ("info", {
                    ("length", 4_u64),
                    ("name", "sample"),
                    ("piece length", 2_u64),
                    ("pieces", (1, 2, 3, 4)),
                })
            })
            .encode()
        );
    }

    #[test]
    fn encode_is_deterministic() {
        assert_eq!(sample().encode(), sample().encode());
    }

    #[test]
    fn write_into_file_ok() {
        let root = scratch_dir();
        let path = root.join("sample.torrent");

        sample().write_into_file(&path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), sample().encode());
    }

    #[test]
    fn write_into_file_missing_dir() {
        let root = scratch_dir();
        let path = root.join("missing/sample.torrent");

        match sample().write_into_file(&path) {
            Err(MkTorrentError::Io(_)) => (),
            _ => panic!(),
        }
        assert!(!path.exists());
    }
}
