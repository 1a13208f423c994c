use mktorrent::bencode::BencodeElem;
use rand::Rng;
use serde_bencode::value::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

fn rand_file_name() -> PathBuf {
    std::env::temp_dir().join(format!(
        "mktorrent-bencode-{}",
        rand::thread_rng().gen::<u64>()
    ))
}

fn write_and_decode(elem: &BencodeElem) -> Value {
    let output = rand_file_name();
    elem.write_into_file(&output).unwrap();
    let bytes = fs::read(&output).unwrap();
    assert_eq!(bytes, elem.encode());
    serde_bencode::from_bytes(&bytes).unwrap()
}

#[test]
fn bencode_elem_write_string_to_file_ok() {
    assert_eq!(
        write_and_decode(&BencodeElem::from("spam")),
        Value::Bytes(b"spam".to_vec())
    );
}

#[test]
fn bencode_elem_write_bytes_to_file_ok() {
    assert_eq!(
        write_and_decode(&BencodeElem::Bytes(vec![0xff, 0xfe, 0xfd, 0xfc])),
        Value::Bytes(vec![0xff, 0xfe, 0xfd, 0xfc])
    );
}

#[test]
fn bencode_elem_write_integer_to_file_ok() {
    assert_eq!(
        write_and_decode(&BencodeElem::Integer(42)),
        Value::Int(42)
    );
}

#[test]
fn bencode_elem_write_list_to_file_ok() {
    let original = BencodeElem::List(vec![BencodeElem::Integer(42), BencodeElem::from("spam")]);

    assert_eq!(
        write_and_decode(&original),
        Value::List(vec![Value::Int(42), Value::Bytes(b"spam".to_vec())])
    );
}

#[test]
fn bencode_elem_write_dictionary_to_file_ok() {
    let original = BencodeElem::dictionary(vec![
        ("spam", BencodeElem::Integer(42)),
        ("eggs", BencodeElem::List(vec![BencodeElem::from("ham")])),
    ]);

    let mut expected = HashMap::new();
    expected.insert(b"spam".to_vec(), Value::Int(42));
    expected.insert(
        b"eggs".to_vec(),
        Value::List(vec![Value::Bytes(b"ham".to_vec())]),
    );
    assert_eq!(write_and_decode(&original), Value::Dict(expected));
}

#[test]
fn bencode_elem_dictionary_is_canonical() {
    let original = BencodeElem::dictionary(vec![
        ("zz", BencodeElem::Integer(1)),
        ("a", BencodeElem::Integer(2)),
        ("Z", BencodeElem::Integer(3)),
    ]);

    assert_eq!(original.encode(), b"d1:Zi3e1:ai2e2:zzi1ee".to_vec());
}

#[test]
fn bencode_elem_write_into_missing_dir() {
    let output = rand_file_name().join("missing");

    assert!(BencodeElem::Integer(42).write_into_file(&output).is_err());
    assert!(!output.exists());
}
