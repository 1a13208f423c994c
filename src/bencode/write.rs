//! Module for bencode-related encoding.

use super::*;
use crate::util;
use crate::MkTorrentError;
use std::hash::BuildHasher;
use std::io::Write;
use std::path::Path;

/// Encode `bytes` and write the result to `dst`.
///
/// The length prefix is the number of bytes, not characters.
pub fn write_bytes<W>(bytes: &[u8], dst: &mut W) -> Result<(), MkTorrentError>
where
    W: Write,
{
    dst.write_all(bytes.len().to_string().as_bytes())?;
    dst.write_all(&[STRING_DELIMITER])?;
    dst.write_all(bytes)?;
    Ok(())
}

/// Encode `int` and write the result to `dst`.
pub fn write_integer<W>(int: u64, dst: &mut W) -> Result<(), MkTorrentError>
where
    W: Write,
{
    dst.write_all(&[INTEGER_PREFIX])?;
    dst.write_all(int.to_string().as_bytes())?;
    dst.write_all(&[INTEGER_POSTFIX])?;
    Ok(())
}

/// Encode `list` and write the result to `dst`.
pub fn write_list<W>(list: &[BencodeElem], dst: &mut W) -> Result<(), MkTorrentError>
where
    W: Write,
{
    dst.write_all(&[LIST_PREFIX])?;
    for item in list {
        item.write_into(dst)?;
    }
    dst.write_all(&[LIST_POSTFIX])?;
    Ok(())
}

/// Encode `dict` and write the result to `dst`.
///
/// Pairs are always written in ascending order of the raw key bytes,
/// regardless of the map's iteration order.
pub fn write_dictionary<W, S>(
    dict: &HashMap<Vec<u8>, BencodeElem, S>,
    dst: &mut W,
) -> Result<(), MkTorrentError>
where
    W: Write,
    S: BuildHasher,
{
    // "Keys must be strings and appear in sorted order
    // (sorted as raw strings, not alphanumerics)."
    let mut sorted = dict.iter().collect::<Vec<(&Vec<u8>, &BencodeElem)>>();
    sorted.sort_by(|&(k1, _), &(k2, _)| k1.cmp(k2));

    dst.write_all(&[DICTIONARY_PREFIX])?;
    for (key, val) in sorted {
        write_bytes(key, dst)?;
        val.write_into(dst)?;
    }
    dst.write_all(&[DICTIONARY_POSTFIX])?;
    Ok(())
}

/// Encode `bytes` and return the result in a `Vec`.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(bytes.len() + 8);
    write_bytes(bytes, &mut encoded).expect("Write to vec failed!");
    encoded
}

/// Encode `int` and return the result in a `Vec`.
pub fn encode_integer(int: u64) -> Vec<u8> {
    let mut encoded = Vec::new();
    write_integer(int, &mut encoded).expect("Write to vec failed!");
    encoded
}

/// Encode `list` and return the result in a `Vec`.
pub fn encode_list(list: &[BencodeElem]) -> Vec<u8> {
    let mut encoded = Vec::new();
    write_list(list, &mut encoded).expect("Write to vec failed!");
    encoded
}

/// Encode `dict` and return the result in a `Vec`.
pub fn encode_dictionary<S>(dict: &HashMap<Vec<u8>, BencodeElem, S>) -> Vec<u8>
where
    S: BuildHasher,
{
    let mut encoded = Vec::new();
    write_dictionary(dict, &mut encoded).expect("Write to vec failed!");
    encoded
}

impl BencodeElem {
    /// Encode `self` and write the result to `dst`.
    pub fn write_into<W>(&self, dst: &mut W) -> Result<(), MkTorrentError>
    where
        W: Write,
    {
        match *self {
            BencodeElem::Bytes(ref bytes) => write_bytes(bytes, dst),
            BencodeElem::Integer(int) => write_integer(int, dst),
            BencodeElem::List(ref list) => write_list(list, dst),
            BencodeElem::Dictionary(ref dict) => write_dictionary(dict, dst),
        }
    }

    /// Encode `self` and write the result to `path`.
    ///
    /// `path` must be the path to a file. The file is replaced only
    /// once the whole encoding has been written, so a failure never
    /// leaves a partially written file at `path`.
    pub fn write_into_file<P>(&self, path: P) -> Result<(), MkTorrentError>
    where
        P: AsRef<Path>,
    {
        util::write_atomically(path, |dst| self.write_into(dst))
    }

    /// Encode `self` and return the result in a `Vec`.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            BencodeElem::Bytes(ref bytes) => encode_bytes(bytes),
            BencodeElem::Integer(int) => encode_integer(int),
            BencodeElem::List(ref list) => encode_list(list),
            BencodeElem::Dictionary(ref dict) => encode_dictionary(dict),
        }
    }
}
