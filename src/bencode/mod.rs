//! Module for the bencode data model and its canonical encoding.

use itertools::Itertools;
use std::collections::HashMap;
use std::convert::From;
use std::fmt;

#[cfg(test)]
#[macro_use]
mod macros;
pub mod write;

const DICTIONARY_PREFIX: u8 = b'd';
const DICTIONARY_POSTFIX: u8 = b'e';
const LIST_PREFIX: u8 = b'l';
const LIST_POSTFIX: u8 = b'e';
const INTEGER_PREFIX: u8 = b'i';
const INTEGER_POSTFIX: u8 = b'e';
const STRING_DELIMITER: u8 = b':';

/// Corresponds to a bencode dictionary. Keys are raw byte strings.
///
/// The map's iteration order is never relied upon: keys are sorted
/// every time a dictionary is encoded.
pub type Dictionary = HashMap<Vec<u8>, BencodeElem>;

/// A bencode value.
///
/// Integers are unsigned, so a negative integer cannot be constructed.
/// Dictionary keys are unique since they live in a map.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BencodeElem {
    /// A byte string. It is not required to be valid UTF-8.
    Bytes(Vec<u8>),
    Integer(u64),
    List(Vec<BencodeElem>),
    Dictionary(Dictionary),
}

impl BencodeElem {
    /// Build a dictionary from `(key, value)` pairs.
    ///
    /// If a key appears more than once, the last value wins.
    pub fn dictionary<I, K>(pairs: I) -> BencodeElem
    where
        I: IntoIterator<Item = (K, BencodeElem)>,
        K: Into<Vec<u8>>,
    {
        BencodeElem::Dictionary(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<u8> for BencodeElem {
    fn from(val: u8) -> BencodeElem {
        BencodeElem::Integer(u64::from(val))
    }
}

impl From<u16> for BencodeElem {
    fn from(val: u16) -> BencodeElem {
        BencodeElem::Integer(u64::from(val))
    }
}

impl From<u32> for BencodeElem {
    fn from(val: u32) -> BencodeElem {
        BencodeElem::Integer(u64::from(val))
    }
}

impl From<u64> for BencodeElem {
    fn from(val: u64) -> BencodeElem {
        BencodeElem::Integer(val)
    }
}

impl From<bool> for BencodeElem {
    fn from(val: bool) -> BencodeElem {
        BencodeElem::Integer(u64::from(val))
    }
}

impl<'a> From<&'a str> for BencodeElem {
    fn from(val: &'a str) -> BencodeElem {
        BencodeElem::Bytes(val.as_bytes().to_vec())
    }
}

impl From<String> for BencodeElem {
    fn from(val: String) -> BencodeElem {
        BencodeElem::Bytes(val.into_bytes())
    }
}

impl<'a> From<&'a [u8]> for BencodeElem {
    fn from(val: &'a [u8]) -> BencodeElem {
        BencodeElem::Bytes(val.to_vec())
    }
}

impl From<Vec<u8>> for BencodeElem {
    fn from(val: Vec<u8>) -> BencodeElem {
        BencodeElem::Bytes(val)
    }
}

impl From<Vec<BencodeElem>> for BencodeElem {
    fn from(val: Vec<BencodeElem>) -> BencodeElem {
        BencodeElem::List(val)
    }
}

impl fmt::Display for BencodeElem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BencodeElem::Bytes(ref bytes) => match std::str::from_utf8(bytes) {
                Ok(string) => write!(f, "\"{}\"", string),
                Err(_) => write!(f, "[{:#04x}]", bytes.iter().format(", ")),
            },
            BencodeElem::Integer(ref int) => write!(f, "{}", int),
            BencodeElem::List(ref list) => write!(f, "[{}]", itertools::join(list, ", ")),
            BencodeElem::Dictionary(ref dict) => write!(
                f,
                "{{ {} }}",
                dict.iter()
                    .sorted_by(|&(k1, _), &(k2, _)| k1.cmp(k2))
                    .format_with(", ", |(k, v), f| f(&format_args!(
                        "(\"{}\", {})",
                        String::from_utf8_lossy(k),
                        v
                    )))
            ),
        }
    }
}

#[cfg(test)]
mod bencode_elem_display_tests {
    use super::*;

    #[test]
    fn display_test_string() {
        assert_eq!(bencode_elem!("").to_string(), "\"\"");
    }

    #[test]
    fn display_test_bytes() {
        assert_eq!(
            bencode_elem!((0xff, 0xf8, 0xff, 0xee)).to_string(),
            "[0xff, 0xf8, 0xff, 0xee]"
        );
    }

    #[test]
    fn display_test_integer() {
        assert_eq!(bencode_elem!(0_u64).to_string(), "0");
    }

    #[test]
    fn display_test_list() {
        assert_eq!(bencode_elem!([0_u64, "spam"]).to_string(), "[0, \"spam\"]");
    }

    #[test]
    fn display_test_dictionary() {
        assert_eq!(
            bencode_elem!({ ("spam", "eggs"), ("cow", { ("moo", 4_u64) }) }).to_string(),
            "{ (\"cow\", { (\"moo\", 4) }), (\"spam\", \"eggs\") }",
        )
    }
}
